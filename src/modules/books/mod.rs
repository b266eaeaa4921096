pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use catalogo_kernel::{InitCtx, Migration, Module};
use sqlx::SqlitePool;
use utoipa::OpenApi;

use repository::BookRepository;

/// Books module: the `/livros` catalog and the `livros` table it owns
pub struct BooksModule {
    repository: BookRepository,
}

impl BooksModule {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: BookRepository::new(pool),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %ctx.settings.database.url,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(routes::BooksApi::openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_livros",
            up: r#"
                CREATE TABLE IF NOT EXISTS livros (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    isbn           TEXT    NOT NULL UNIQUE,
                    titulo         TEXT    NOT NULL,
                    autor          TEXT    NOT NULL,
                    ano_publicacao INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM livros")
            .fetch_one(ctx.db)
            .await?;
        tracing::info!(module = self.name(), books = count, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(pool: SqlitePool) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(pool))
}

#[cfg(test)]
pub(crate) mod testing {
    use catalogo_kernel::settings::DatabaseSettings;
    use catalogo_kernel::Module;
    use sqlx::SqlitePool;

    /// Fresh in-memory database with the books schema applied.
    pub async fn memory_pool() -> SqlitePool {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let pool = catalogo_db::connect(&settings).await.unwrap();
        let module = super::BooksModule::new(pool.clone());
        let migrations: Vec<_> = module
            .migrations()
            .into_iter()
            .map(|m| (module.name().to_string(), m))
            .collect();
        catalogo_db::run_migrations(&pool, &migrations).await.unwrap();
        pool
    }
}
