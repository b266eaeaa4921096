//! Application lifecycle: bootstrap, serve, migrate.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use catalogo_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules;

/// A bootstrapped application: pool open, modules initialized, schema migrated.
pub struct App {
    settings: Settings,
    pool: SqlitePool,
    registry: ModuleRegistry,
}

/// Connect to the database, register and initialize modules, then apply pending migrations.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<App> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "catalogo bootstrap starting"
    );

    let pool = catalogo_db::connect(&settings.database)
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &pool);

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    registry.init_modules(&ctx).await?;

    let applied = catalogo_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to run migrations")?;

    tracing::info!(
        modules = registry.module_count(),
        migrations_applied = applied,
        "catalogo bootstrap complete"
    );

    Ok(App {
        settings,
        pool,
        registry,
    })
}

impl App {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The full HTTP router, middleware included.
    pub fn router(&self) -> Router {
        catalogo_http::build_router(&self.registry, &self.settings)
    }

    /// Start modules, serve HTTP until `shutdown` resolves, then stop modules and close the pool.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = InitCtx {
            settings: &self.settings,
            db: &self.pool,
        };
        self.registry.start_modules(&ctx).await?;

        let served = catalogo_http::start_server(&self.registry, &self.settings, shutdown).await;

        self.registry.stop_modules().await?;
        self.pool.close().await;
        served
    }
}

/// Run the service until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    bootstrap(settings).await?.run(shutdown_signal()).await
}

/// Apply pending migrations and exit. Returns how many were applied.
pub async fn migrate(settings: Settings) -> anyhow::Result<usize> {
    let pool = catalogo_db::connect(&settings.database)
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &pool);

    let applied = catalogo_db::run_migrations(&pool, &registry.collect_migrations()).await?;
    pool.close().await;

    tracing::info!(migrations_applied = applied, "migrations complete");
    Ok(applied)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
