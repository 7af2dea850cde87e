//! Error types for pulso-core.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when communicating with a heart-rate sensor.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// No Bluetooth adapter is available on this host.
    #[error("no Bluetooth adapter available")]
    NoAdapter,

    /// Device not found during scan or connection.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Operation attempted while not connected to a device.
    #[error("not connected to device")]
    NotConnected,

    /// Required BLE characteristic not found on the device.
    #[error("characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: String,
    },

    /// Failed to parse data received from the device.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Operation timed out.
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a device not found error for a specific identifier.
    pub fn device_not_found(identifier: impl Into<String>) -> Self {
        Self::DeviceNotFound(identifier.into())
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>) -> Self {
        Self::CharacteristicNotFound { uuid: uuid.into() }
    }
}

impl From<pulso_types::ParseError> for Error {
    fn from(err: pulso_types::ParseError) -> Self {
        Error::InvalidData(err.to_string())
    }
}

/// Result type alias using pulso-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::device_not_found("Polar H10");
        assert!(err.to_string().contains("Polar H10"));

        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "not connected to device");

        let err = Error::characteristic_not_found("0x2A37");
        assert!(err.to_string().contains("0x2A37"));

        let err = Error::timeout("connect", Duration::from_secs(10));
        assert!(err.to_string().contains("connect"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse = pulso_types::ParseError::InsufficientBytes {
            expected: 2,
            actual: 0,
        };
        let err: Error = parse.into();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
