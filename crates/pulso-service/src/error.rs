//! Error types for pulso-service.

use thiserror::Error;

/// Result type for pulso-service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the monitor runtime.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// BLE error from the core crate.
    #[error(transparent)]
    Core(#[from] pulso_core::Error),

    /// Persistence error.
    #[error(transparent)]
    Store(#[from] pulso_store::Error),

    /// HTTP error on preset import.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A webhook's stored header blob is not valid JSON.
    #[error("webhook '{webhook}' has malformed headers: {source}")]
    MalformedHeaders {
        webhook: String,
        source: serde_json::Error,
    },

    /// A webhook's header blob parsed to something other than an object.
    #[error("webhook '{webhook}' headers must be a JSON object")]
    HeadersNotObject { webhook: String },

    /// The remote preset response was not a JSON array.
    #[error("preset response is not a JSON array")]
    PresetNotArray,

    /// A preset entry could not be read as a webhook definition.
    #[error("malformed preset entry: {0}")]
    MalformedPreset(serde_json::Error),

    /// No enabled webhook to test.
    #[error("no enabled webhook to test")]
    NoEnabledWebhook,

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
