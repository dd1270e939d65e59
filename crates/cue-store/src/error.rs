//! Error types for the storage layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No pooled connection became available within the configured timeout.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Schema migration failed; the whole batch was rolled back.
    #[error("migration error: {message}")]
    Migration { message: String },

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
