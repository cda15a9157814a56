//! Error types for the KV crate.

use thiserror::Error;

/// Errors that can occur during key-value operations.
#[derive(Debug, Error)]
pub enum KvError {
    /// Backend could not be opened.
    #[error("failed to open KV backend: {0}")]
    InitializationFailed(String),

    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// SQLite migration error.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Transport error talking to a remote KV service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote KV service rejected the request.
    #[error("KV service returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
