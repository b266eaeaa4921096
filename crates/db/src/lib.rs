//! SQLite pool factory and migration runner for the catalog service.

use std::str::FromStr;

use anyhow::Context;
use catalogo_kernel::settings::DatabaseSettings;
use catalogo_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool for the configured database, creating the file if needed.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Each connection to `:memory:` is its own database, so keep exactly one alive.
    let pool_options = if settings.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(
        target: "catalogo-db",
        url = %settings.url,
        max_connections = pool.options().get_max_connections(),
        "database pool ready"
    );

    Ok(pool)
}

/// Apply every migration not yet recorded in `_migrations`, each in its own transaction.
///
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let mut tx = pool.begin().await.context("failed to open transaction")?;

        let already: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                .bind(module.as_str())
                .bind(migration.id)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("failed to look up migration {module}/{}", migration.id))?;

        if already.is_some() {
            tracing::debug!(target: "catalogo-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {module}/{} failed", migration.id))?;

        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to record migration {module}/{}", migration.id))?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {module}/{}", migration.id))?;

        tracing::info!(target: "catalogo-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_settings() -> DatabaseSettings {
        DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        }
    }

    fn migrations() -> Vec<(String, Migration)> {
        vec![(
            "things".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE things (id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
            },
        )]
    }

    #[tokio::test]
    async fn memory_database_uses_single_connection() {
        let pool = connect(&memory_settings()).await.unwrap();
        assert_eq!(pool.options().get_max_connections(), 1);
    }

    #[tokio::test]
    async fn migrations_are_applied_once() {
        let pool = connect(&memory_settings()).await.unwrap();

        assert_eq!(run_migrations(&pool, &migrations()).await.unwrap(), 1);
        assert_eq!(run_migrations(&pool, &migrations()).await.unwrap(), 0);

        sqlx::query("INSERT INTO things (name) VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM things")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = connect(&memory_settings()).await.unwrap();
        let broken = vec![(
            "things".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE nope (",
            },
        )];

        assert!(run_migrations(&pool, &broken).await.is_err());

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }
}
