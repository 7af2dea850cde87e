//! Parsing for heart-rate sensor characteristic values.
//!
//! The Heart Rate Measurement characteristic (0x2A37) carries a flags byte
//! followed by fields whose presence and width the flags announce:
//!
//! - bit 0: heart-rate value format (0 = u8, 1 = u16 little-endian)
//! - bit 1: sensor contact detected
//! - bit 2: sensor contact feature supported
//! - bit 3: energy expended field present (u16 LE, kilojoules)
//! - bit 4: one or more RR-interval fields follow (u16 LE, 1/1024 s)

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Heart-rate format flag: value is u16 LE when set, u8 otherwise.
const FLAG_BPM_WIDE: u8 = 0x01;
/// Sensor contact detected.
const FLAG_CONTACT_DETECTED: u8 = 0x02;
/// Sensor contact feature supported.
const FLAG_CONTACT_SUPPORTED: u8 = 0x04;
/// Energy expended field present.
const FLAG_ENERGY_EXPENDED: u8 = 0x08;
/// RR-interval fields present.
const FLAG_RR_INTERVALS: u8 = 0x10;

/// Minimum payload: flags byte plus a one-byte heart-rate value.
const MIN_MEASUREMENT_BYTES: usize = 2;

/// One decoded Heart Rate Measurement notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateMeasurement {
    /// Heart rate in beats per minute.
    pub bpm: u16,
    /// Whether the strap reports skin contact; `None` if the sensor
    /// does not support contact detection.
    pub sensor_contact: Option<bool>,
    /// Accumulated energy expended in kilojoules, if reported.
    pub energy_expended: Option<u16>,
    /// RR intervals in units of 1/1024 seconds, oldest first.
    pub rr_intervals: Vec<u16>,
}

impl HeartRateMeasurement {
    /// Parse a Heart Rate Measurement notification payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulso_types::HeartRateMeasurement;
    ///
    /// // Narrow and wide encodings of the same value
    /// assert_eq!(HeartRateMeasurement::from_bytes(&[0x00, 0x4B]).unwrap().bpm, 75);
    /// assert_eq!(HeartRateMeasurement::from_bytes(&[0x01, 0x4B, 0x00]).unwrap().bpm, 75);
    /// ```
    pub fn from_bytes(data: &[u8]) -> ParseResult<Self> {
        use bytes::Buf;

        if data.len() < MIN_MEASUREMENT_BYTES {
            return Err(ParseError::InsufficientBytes {
                expected: MIN_MEASUREMENT_BYTES,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let flags = buf.get_u8();

        let bpm = if flags & FLAG_BPM_WIDE != 0 {
            if buf.remaining() < 2 {
                return Err(ParseError::InsufficientBytes {
                    expected: 3,
                    actual: data.len(),
                });
            }
            buf.get_u16_le()
        } else {
            u16::from(buf.get_u8())
        };

        let sensor_contact = if flags & FLAG_CONTACT_SUPPORTED != 0 {
            Some(flags & FLAG_CONTACT_DETECTED != 0)
        } else {
            None
        };

        let energy_expended = if flags & FLAG_ENERGY_EXPENDED != 0 {
            if buf.remaining() < 2 {
                return Err(ParseError::InsufficientBytes {
                    expected: data.len() - buf.remaining() + 2,
                    actual: data.len(),
                });
            }
            Some(buf.get_u16_le())
        } else {
            None
        };

        let mut rr_intervals = Vec::new();
        if flags & FLAG_RR_INTERVALS != 0 {
            while buf.remaining() >= 2 {
                rr_intervals.push(buf.get_u16_le());
            }
        }

        Ok(Self {
            bpm,
            sensor_contact,
            energy_expended,
            rr_intervals,
        })
    }
}

/// Parse a Battery Level characteristic value (one byte, 0-100 percent).
pub fn parse_battery_level(data: &[u8]) -> ParseResult<u8> {
    let level = *data.first().ok_or(ParseError::InsufficientBytes {
        expected: 1,
        actual: 0,
    })?;

    if level > 100 {
        return Err(ParseError::InvalidValue(format!(
            "battery level {} exceeds 100%",
            level
        )));
    }

    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_narrow_bpm() {
        let m = HeartRateMeasurement::from_bytes(&[0x00, 0x4B]).unwrap();
        assert_eq!(m.bpm, 75);
        assert_eq!(m.sensor_contact, None);
        assert_eq!(m.energy_expended, None);
        assert!(m.rr_intervals.is_empty());
    }

    #[test]
    fn test_parse_wide_bpm_same_value() {
        let m = HeartRateMeasurement::from_bytes(&[0x01, 0x4B, 0x00]).unwrap();
        assert_eq!(m.bpm, 75);
    }

    #[test]
    fn test_parse_wide_bpm_above_u8_range() {
        // 0x0120 = 288 bpm, only expressible in the wide encoding
        let m = HeartRateMeasurement::from_bytes(&[0x01, 0x20, 0x01]).unwrap();
        assert_eq!(m.bpm, 288);
    }

    #[test]
    fn test_parse_sensor_contact() {
        // Supported + detected
        let m = HeartRateMeasurement::from_bytes(&[0x06, 0x48]).unwrap();
        assert_eq!(m.sensor_contact, Some(true));

        // Supported, not detected
        let m = HeartRateMeasurement::from_bytes(&[0x04, 0x48]).unwrap();
        assert_eq!(m.sensor_contact, Some(false));

        // Detected bit set without the supported bit is meaningless
        let m = HeartRateMeasurement::from_bytes(&[0x02, 0x48]).unwrap();
        assert_eq!(m.sensor_contact, None);
    }

    #[test]
    fn test_parse_energy_expended() {
        // flags 0x08: narrow bpm + energy expended 0x0320 = 800 kJ
        let m = HeartRateMeasurement::from_bytes(&[0x08, 0x48, 0x20, 0x03]).unwrap();
        assert_eq!(m.bpm, 72);
        assert_eq!(m.energy_expended, Some(800));
    }

    #[test]
    fn test_parse_rr_intervals() {
        // flags 0x10: narrow bpm + two RR intervals (1024 = one second)
        let m =
            HeartRateMeasurement::from_bytes(&[0x10, 0x48, 0x00, 0x04, 0x20, 0x03]).unwrap();
        assert_eq!(m.bpm, 72);
        assert_eq!(m.rr_intervals, vec![1024, 800]);
    }

    #[test]
    fn test_parse_all_fields() {
        // Wide bpm, contact supported+detected, energy expended, one RR interval
        let bytes = [0x1F, 0x4B, 0x00, 0x10, 0x00, 0x00, 0x04];
        let m = HeartRateMeasurement::from_bytes(&bytes).unwrap();
        assert_eq!(m.bpm, 75);
        assert_eq!(m.sensor_contact, Some(true));
        assert_eq!(m.energy_expended, Some(16));
        assert_eq!(m.rr_intervals, vec![1024]);
    }

    #[test]
    fn test_parse_empty_payload() {
        let err = HeartRateMeasurement::from_bytes(&[]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientBytes {
                expected: 2,
                actual: 0
            }
        );
    }

    #[test]
    fn test_parse_flags_only() {
        assert!(HeartRateMeasurement::from_bytes(&[0x00]).is_err());
    }

    #[test]
    fn test_parse_wide_flag_with_truncated_value() {
        // Wide flag set but only one value byte present
        let err = HeartRateMeasurement::from_bytes(&[0x01, 0x4B]).unwrap_err();
        assert!(matches!(err, ParseError::InsufficientBytes { .. }));
    }

    #[test]
    fn test_parse_energy_flag_with_truncated_field() {
        let err = HeartRateMeasurement::from_bytes(&[0x08, 0x48, 0x20]).unwrap_err();
        assert!(matches!(err, ParseError::InsufficientBytes { .. }));
    }

    #[test]
    fn test_parse_odd_trailing_rr_byte_ignored() {
        // A dangling half-interval at the end is dropped, not an error
        let m = HeartRateMeasurement::from_bytes(&[0x10, 0x48, 0x00, 0x04, 0x20]).unwrap();
        assert_eq!(m.rr_intervals, vec![1024]);
    }

    #[test]
    fn test_battery_level_valid() {
        assert_eq!(parse_battery_level(&[85]).unwrap(), 85);
        assert_eq!(parse_battery_level(&[0]).unwrap(), 0);
        assert_eq!(parse_battery_level(&[100]).unwrap(), 100);
    }

    #[test]
    fn test_battery_level_out_of_range() {
        let err = parse_battery_level(&[101]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue(_)));
    }

    #[test]
    fn test_battery_level_empty() {
        assert!(parse_battery_level(&[]).is_err());
    }

    #[test]
    fn test_measurement_serialization_roundtrip() {
        let m = HeartRateMeasurement {
            bpm: 75,
            sensor_contact: Some(true),
            energy_expended: None,
            rr_intervals: vec![1024],
        };

        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"bpm\":75"));

        let back: HeartRateMeasurement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
