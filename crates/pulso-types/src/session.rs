//! Recording session types shared between the recorder and the store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One timestamped heart-rate sample inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// When the reading was received.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    /// Heart rate in beats per minute.
    pub bpm: u16,
}

/// One connect-to-disconnect recording interval.
///
/// A session is only ever persisted once it is closed (`ended_at` set)
/// and holds at least one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier of the device the readings came from.
    pub device: String,
    /// When the connection began.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// When the connection ended; `None` while still recording.
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    /// Readings in arrival order.
    pub samples: Vec<Sample>,
}

impl Session {
    /// The most recent sample's bpm, if any reading was recorded.
    pub fn last_bpm(&self) -> Option<u16> {
        self.samples.last().map(|s| s.bpm)
    }

    /// Session duration, once closed.
    pub fn duration(&self) -> Option<time::Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_bpm() {
        let mut session = Session {
            device: "Polar H10".to_string(),
            started_at: OffsetDateTime::UNIX_EPOCH,
            ended_at: None,
            samples: Vec::new(),
        };
        assert_eq!(session.last_bpm(), None);

        session.samples.push(Sample {
            at: OffsetDateTime::UNIX_EPOCH,
            bpm: 72,
        });
        session.samples.push(Sample {
            at: OffsetDateTime::UNIX_EPOCH,
            bpm: 75,
        });
        assert_eq!(session.last_bpm(), Some(75));
    }

    #[test]
    fn test_duration() {
        let start = OffsetDateTime::UNIX_EPOCH;
        let session = Session {
            device: "strap".to_string(),
            started_at: start,
            ended_at: Some(start + time::Duration::seconds(90)),
            samples: Vec::new(),
        };
        assert_eq!(session.duration(), Some(time::Duration::seconds(90)));
    }

    #[test]
    fn test_session_serialization_roundtrip() {
        let session = Session {
            device: "Polar H10".to_string(),
            started_at: OffsetDateTime::UNIX_EPOCH,
            ended_at: Some(OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(60)),
            samples: vec![Sample {
                at: OffsetDateTime::UNIX_EPOCH,
                bpm: 68,
            }],
        };

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
