use anyhow::Context;
use catalogo_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load catalogo settings")?;
    catalogo_telemetry::init(&settings.telemetry)?;

    catalogo_app::serve(settings).await
}
