//! Platform-agnostic types for heart-rate sensor data.
//!
//! This crate provides the shared vocabulary of the pulso workspace:
//! the GATT Heart Rate Measurement wire format, battery level parsing,
//! and the Bluetooth UUIDs needed to talk to a heart-rate sensor.
//!
//! # Example
//!
//! ```
//! use pulso_types::HeartRateMeasurement;
//!
//! // Narrow encoding: flags byte 0x00, one-byte bpm
//! let m = HeartRateMeasurement::from_bytes(&[0x00, 0x4B]).unwrap();
//! assert_eq!(m.bpm, 75);
//! ```

pub mod error;
pub mod measurement;
pub mod session;
pub mod uuid;

pub use error::{ParseError, ParseResult};
pub use measurement::{HeartRateMeasurement, parse_battery_level};
pub use session::{Sample, Session};
pub use self::uuid as uuids;
