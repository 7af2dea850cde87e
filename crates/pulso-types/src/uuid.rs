//! Bluetooth UUIDs for heart-rate sensors.
//!
//! All of these are Bluetooth SIG assigned numbers; heart-rate straps
//! expose the standard Heart Rate service rather than a vendor service.

use uuid::{Uuid, uuid};

// --- Service UUIDs ---

/// Heart Rate service (0x180D).
pub const HEART_RATE_SERVICE: Uuid = uuid!("0000180d-0000-1000-8000-00805f9b34fb");

/// Battery service (0x180F). Declared as an optional capability;
/// only the battery level characteristic is ever read.
pub const BATTERY_SERVICE: Uuid = uuid!("0000180f-0000-1000-8000-00805f9b34fb");

/// Generic Access Profile (GAP) service (0x1800).
pub const GAP_SERVICE: Uuid = uuid!("00001800-0000-1000-8000-00805f9b34fb");

// --- Characteristic UUIDs ---

/// Heart Rate Measurement characteristic (0x2A37), notification-based.
pub const HEART_RATE_MEASUREMENT: Uuid = uuid!("00002a37-0000-1000-8000-00805f9b34fb");

/// Body Sensor Location characteristic (0x2A38).
pub const BODY_SENSOR_LOCATION: Uuid = uuid!("00002a38-0000-1000-8000-00805f9b34fb");

/// Battery Level characteristic (0x2A19).
pub const BATTERY_LEVEL: Uuid = uuid!("00002a19-0000-1000-8000-00805f9b34fb");

/// Device Name characteristic (0x2A00).
pub const DEVICE_NAME: Uuid = uuid!("00002a00-0000-1000-8000-00805f9b34fb");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_rate_service_uuid() {
        let expected = "0000180d-0000-1000-8000-00805f9b34fb";
        assert_eq!(HEART_RATE_SERVICE.to_string(), expected);
    }

    #[test]
    fn test_heart_rate_measurement_uuid() {
        let expected = "00002a37-0000-1000-8000-00805f9b34fb";
        assert_eq!(HEART_RATE_MEASUREMENT.to_string(), expected);
    }

    #[test]
    fn test_battery_uuids() {
        assert_eq!(
            BATTERY_SERVICE.to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            BATTERY_LEVEL.to_string(),
            "00002a19-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_service_uuids_are_distinct() {
        assert_ne!(HEART_RATE_SERVICE, BATTERY_SERVICE);
        assert_ne!(HEART_RATE_SERVICE, GAP_SERVICE);
        assert_ne!(BATTERY_SERVICE, GAP_SERVICE);
    }

    #[test]
    fn test_standard_characteristic_prefix() {
        // Standard BLE characteristics use 16-bit UUIDs (start with 00002aXX)
        let standard_uuids = [
            HEART_RATE_MEASUREMENT,
            BODY_SENSOR_LOCATION,
            BATTERY_LEVEL,
            DEVICE_NAME,
        ];

        for uuid in standard_uuids {
            assert!(
                uuid.to_string().starts_with("00002a"),
                "UUID {} should start with 00002a",
                uuid
            );
        }
    }
}
