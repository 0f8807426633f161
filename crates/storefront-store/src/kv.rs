//! # Key-Value Slots
//!
//! The shop record lives under one string key as one JSON document. This
//! module abstracts where that key lives.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KvStore implementations                          │
//! │                                                                         │
//! │  SqliteKvStore                                                         │
//! │    kv_store(key TEXT PK, value TEXT, updated_at TEXT)                  │
//! │    set = INSERT ... ON CONFLICT(key) DO UPDATE   (last write wins)     │
//! │                                                                         │
//! │  MemoryKvStore                                                         │
//! │    HashMap<String, String> behind a mutex                              │
//! │    used by tests and by shells without a data directory                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Asynchronous string key-value storage.
///
/// `get` of a key that was never written yields `Ok(None)`. `set` replaces
/// the previous value in full.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// Slot storage in the local SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKvStore { pool }
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::read(key, e))?;

        debug!(key = %key, found = value.is_some(), "Read slot");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(key, e))?;

        debug!(key = %key, bytes = value.len(), "Wrote slot");
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local slot storage.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `key` already holding `value`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        store
    }

    /// Reads a slot without going through the async trait.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
