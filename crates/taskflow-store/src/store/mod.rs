//! SQLite-backed document and task-record store.
//!
//! Split into focused submodules:
//! - `documents`: last-observed document text
//! - `records`: task-record persistence and the due-date range query
//! - `feed`: the notification feed and its `Notifier` implementation

mod documents;
mod feed;
mod records;


pub use feed::FeedNotifier;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use taskflow_core::config::StoreConfig;
use taskflow_core::error::TaskFlowError;
use taskflow_core::shellexpand;
use tracing::info;

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the store at the configured path, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, TaskFlowError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TaskFlowError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| TaskFlowError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| TaskFlowError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Open an ephemeral in-memory store. Used by tests and one-shot runs.
    pub async fn in_memory() -> Result<Self, TaskFlowError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| TaskFlowError::Store(format!("invalid db options: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| TaskFlowError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), TaskFlowError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| TaskFlowError::Store(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        TaskFlowError::Store(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_none() {
                sqlx::raw_sql(sql)
                    .execute(pool)
                    .await
                    .map_err(|e| {
                        TaskFlowError::Store(format!("failed to apply migration {name}: {e}"))
                    })?;
                sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                    .bind(name)
                    .execute(pool)
                    .await
                    .map_err(|e| {
                        TaskFlowError::Store(format!("failed to record migration {name}: {e}"))
                    })?;
                info!("applied migration {name}");
            }
        }

        Ok(())
    }
}
