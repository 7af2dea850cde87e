//! Error types for data parsing in pulso-types.

use thiserror::Error;

/// Errors that can occur when parsing heart-rate sensor data.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in pulso-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The payload was shorter than the fields its flags announce.
    #[error("payload requires {expected} bytes, got {actual}")]
    InsufficientBytes { expected: usize, actual: usize },

    /// A field held a value outside its valid range.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using pulso-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
