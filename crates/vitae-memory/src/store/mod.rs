//! SQLite-backed profile and transcript store.
//!
//! Split into focused submodules:
//! - `profile` — identity, persona settings, projects, connections (reads and seed writes)
//! - `transcripts` — append-only chat transcript

mod profile;
mod transcripts;

pub use profile::parse_string_list;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use vitae_core::{config::shellexpand, config::MemoryConfig, error::VitaeError};

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, VitaeError> {
        let db_path = shellexpand(&config.db_path);

        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = connect_options(&db_path)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
        let pool = connect(opts, 4).await?;

        Self::run_migrations(&pool).await?;

        info!("store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Open an existing database without creating it or running migrations.
    pub async fn open_existing(config: &MemoryConfig) -> Result<Self, VitaeError> {
        let db_path = shellexpand(&config.db_path);
        let opts = connect_options(&db_path)?.create_if_missing(false);
        let pool = connect(opts, 1).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Liveness check used by the status command.
    pub async fn ping(&self) -> Result<(), VitaeError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| VitaeError::Persistence(format!("ping failed: {e}")))?;
        Ok(())
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), VitaeError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| {
            VitaeError::Persistence(format!("failed to create migrations table: {e}"))
        })?;

        let migrations: &[(&str, &str)] = &[
            ("001_init", include_str!("../../migrations/001_init.sql")),
            (
                "002_profile_details",
                include_str!("../../migrations/002_profile_details.sql"),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        VitaeError::Persistence(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| VitaeError::Persistence(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    VitaeError::Persistence(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}

fn connect_options(db_path: &str) -> Result<SqliteConnectOptions, VitaeError> {
    SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
        .map_err(|e| VitaeError::Persistence(format!("invalid db path: {e}")))
}

async fn connect(opts: SqliteConnectOptions, max: u32) -> Result<SqlitePool, VitaeError> {
    SqlitePoolOptions::new()
        .max_connections(max)
        .connect_with(opts)
        .await
        .map_err(|e| VitaeError::Persistence(format!("failed to connect to sqlite: {e}")))
}

#[cfg(test)]
mod tests;
