//! # Storage Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Where a StoreError ends up                                             │
//! │                                                                         │
//! │  Open / Migrate ─────────── Database::open ──► app startup fails       │
//! │  Read / Decode ──────────── hydrate ─────────► warn!, start empty      │
//! │  Encode / Write ─────────── persist worker ──► warn!, PersistStatus    │
//! │  WorkerStopped ──────────── flush/shutdown ──► caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart and wishlist mutations never see any of these; the in-memory state
//! stays authoritative when the slot misbehaves.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened or created.
    #[error("Cannot open shop database: {0}")]
    Open(String),

    #[error("Schema migration failed: {0}")]
    Migrate(String),

    #[error("Reading slot '{key}' failed: {reason}")]
    Read { key: String, reason: String },

    /// The slot holds something that is not a shop record.
    #[error("Persisted shop state is not valid JSON for this layout: {0}")]
    Decode(String),

    #[error("Shop state could not be serialized: {0}")]
    Encode(String),

    #[error("Writing slot '{key}' failed: {reason}")]
    Write { key: String, reason: String },

    #[error("Persist worker has stopped")]
    WorkerStopped,
}

impl StoreError {
    pub fn read(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Read {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Write {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migrate(err.to_string())
    }
}

/// Only the read side goes through `?`, so JSON errors are decode errors.
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
