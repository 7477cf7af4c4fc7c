use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is its own database, so keep exactly one alive
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(connect_options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(30))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(3600))
                .connect_with(connect_options)
                .await?
        };

        Ok(Database { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        let migrations = vec![
            include_str!("../migrations/sqlite/001_initial.sql"),
            include_str!("../migrations/sqlite/002_prototype_tables.sql"),
        ];

        for (idx, migration_sql) in migrations.iter().enumerate() {
            tracing::info!("Running migration {}", idx + 1);

            for statement in migration_sql.split(';') {
                let sql: String = statement
                    .lines()
                    .filter(|line| !line.trim_start().starts_with("--"))
                    .collect::<Vec<_>>()
                    .join("\n");
                let trimmed = sql.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if let Err(e) = sqlx::query(trimmed).execute(&self.pool).await {
                    if e.to_string().contains("already exists") {
                        tracing::debug!("Skipping existing object in migration {}: {}", idx + 1, e);
                    } else {
                        tracing::error!("Migration {} failed on: {} - Error: {}", idx + 1, trimmed, e);
                        return Err(e.into());
                    }
                }
            }
        }

        tracing::info!("All migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// In-memory database with migrations applied.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }
}
