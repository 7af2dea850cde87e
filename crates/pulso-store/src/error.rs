//! Error types for pulso-store.

use std::path::PathBuf;

/// Result type for pulso-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pulso-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create the database directory.
    #[error("failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A session must be closed (end time set) before it is persisted.
    #[error("session is still open; only closed sessions are persisted")]
    SessionNotClosed,

    /// A webhook definition failed validation.
    #[error("invalid webhook: {0}")]
    InvalidWebhook(String),

    /// No webhook with the given id exists.
    #[error("webhook not found: {0}")]
    WebhookNotFound(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
