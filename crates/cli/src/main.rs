use anyhow::Context;
use clap::{Parser, Subcommand};

use catalogo_kernel::settings::Settings;

/// Book catalog service
#[derive(Debug, Parser)]
#[command(name = "catalogo", version, about)]
struct Cli {
    /// Override the database URL from configuration
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until interrupted
    Serve {
        /// Override the listen port from configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load catalogo settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    catalogo_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            catalogo_app::serve(settings).await
        }
        Command::Migrate => {
            let applied = catalogo_app::migrate(settings).await?;
            println!("{applied} migration(s) applied");
            Ok(())
        }
    }
}
