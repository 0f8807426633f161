//! # Local Database
//!
//! The SQLite file that holds the `kv_store` table. Opening it applies the
//! embedded migrations, so a fresh install and an upgraded one end up with
//! the same schema before the store hydrates.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::open(path)                                                   │
//! │       │  WAL journal, synchronous=NORMAL, create if missing             │
//! │       ▼                                                                 │
//! │  SqlitePool (2 connections)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MIGRATOR.run ── migrations/sqlite/*.sql, recorded in _sqlx_migrations  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.kv() ──► SqliteKvStore ──► ShopStore                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Migrations are append-only. A schema change is a new numbered file in
//! `migrations/sqlite/`, never an edit to one that has shipped.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::kv::SqliteKvStore;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// One writer (the persist worker) plus one reader (hydration).
const FILE_POOL_SIZE: u32 = 2;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle to the local database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database file at `path`, creating it if needed, and applies
    /// pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening shop database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // Losing the newest write on power loss is acceptable: the next
            // mutation rewrites the whole record.
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(FILE_POOL_SIZE)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        Self::migrated(pool).await
    }

    /// A private database that disappears with its only connection.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Open(e.to_string()))?;

        // A second connection would open a second, empty database, and an
        // idle reap would drop the data.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> StoreResult<Self> {
        debug!(count = MIGRATOR.migrations.len(), "Applying embedded migrations");
        MIGRATOR.run(&pool).await?;
        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The `kv_store` table as a [`crate::KvStore`].
    pub fn kv(&self) -> SqliteKvStore {
        SqliteKvStore::new(self.pool.clone())
    }

    /// Closes the pool. Slot reads and writes fail afterwards.
    pub async fn close(&self) {
        info!("Closing shop database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_has_kv_table() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.health_check().await);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::in_memory().await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_reopening_file_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");

        let db = Database::open(&path).await.unwrap();
        db.close().await;

        // Already-applied migrations are skipped, not rerun.
        let db = Database::open(&path).await.unwrap();
        assert!(db.health_check().await);
        db.close().await;
    }
}
