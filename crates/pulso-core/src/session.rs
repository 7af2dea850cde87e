//! Session recording state machine.
//!
//! A recorder is either `Idle` or `Recording`. Connecting starts a fresh
//! session (abandoning any unfinished one without persisting it);
//! disconnecting closes the session, which is worth keeping only if it
//! holds at least one reading. Persistence is the caller's job; the
//! recorder never touches storage.

use time::OffsetDateTime;
use tracing::debug;

use pulso_types::{Sample, Session};

/// Recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not recording; readings are discarded.
    Idle,
    /// Accumulating readings into the current session.
    Recording,
}

/// Accumulates timestamped readings over one connect-to-disconnect lifetime.
#[derive(Debug)]
pub struct SessionRecorder {
    current: Option<Session>,
}

impl SessionRecorder {
    /// Create an idle recorder.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Current state.
    pub fn state(&self) -> RecorderState {
        if self.current.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    /// Whether a session is being recorded.
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// Start a fresh session for `device`.
    ///
    /// Any unfinished session is abandoned without persisting; only
    /// sessions with data and a clean end are kept.
    pub fn begin(&mut self, device: &str) {
        if let Some(abandoned) = self.current.take() {
            debug!(
                device = %abandoned.device,
                samples = abandoned.samples.len(),
                "Abandoning unfinished session"
            );
        }

        self.current = Some(Session {
            device: device.to_string(),
            started_at: OffsetDateTime::now_utc(),
            ended_at: None,
            samples: Vec::new(),
        });
    }

    /// Append a reading to the current session; no-op while idle.
    pub fn record(&mut self, bpm: u16) {
        if let Some(session) = &mut self.current {
            session.samples.push(Sample {
                at: OffsetDateTime::now_utc(),
                bpm,
            });
        }
    }

    /// The bpm of the most recent recorded reading, if any.
    pub fn last_bpm(&self) -> Option<u16> {
        self.current.as_ref().and_then(|s| s.last_bpm())
    }

    /// Number of readings recorded so far.
    pub fn sample_count(&self) -> usize {
        self.current.as_ref().map_or(0, |s| s.samples.len())
    }

    /// Close the current session and return to idle.
    ///
    /// Returns the session, stamped with an end time, iff at least one
    /// reading was recorded; an empty session is discarded.
    pub fn finish(&mut self) -> Option<Session> {
        let mut session = self.current.take()?;

        if session.samples.is_empty() {
            debug!(device = %session.device, "Discarding empty session");
            return None;
        }

        session.ended_at = Some(OffsetDateTime::now_utc());
        Some(session)
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}
