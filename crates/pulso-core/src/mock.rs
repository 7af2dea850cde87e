//! Simulated heart-rate source for demos and testing.
//!
//! [`MockSource`] produces notification payloads byte-for-byte like a real
//! strap and pushes them through the same parse path, so everything
//! downstream of [`Device::subscribe_heart_rate`](crate::Device) behaves
//! identically with simulated data.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pulso_types::HeartRateMeasurement;

use crate::events::DeviceId;

/// Buffer size for the measurement channel.
const MEASUREMENT_CHANNEL_CAPACITY: usize = 16;

/// A simulated heart-rate source.
#[derive(Debug, Clone)]
pub struct MockSource {
    name: String,
    /// Time between readings.
    tick: Duration,
    /// First emitted bpm; later values random-walk around it.
    start_bpm: u16,
    /// Stop emitting after this many readings, simulating a dropped link.
    drop_link_after: Option<usize>,
}

impl MockSource {
    /// Create a source with one-second ticks around a resting heart rate.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tick: Duration::from_secs(1),
            start_bpm: 72,
            drop_link_after: None,
        }
    }

    /// Set the interval between readings.
    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Set the initial bpm.
    pub fn start_bpm(mut self, bpm: u16) -> Self {
        self.start_bpm = bpm;
        self
    }

    /// Simulate the sensor dropping the link after `count` readings.
    pub fn drop_link_after(mut self, count: usize) -> Self {
        self.drop_link_after = Some(count);
        self
    }

    /// The identity this source reports in events.
    pub fn device_id(&self) -> DeviceId {
        DeviceId::with_name("simulated", &self.name)
    }

    /// Start emitting readings.
    ///
    /// Returns the measurement channel and a token that stops the
    /// generator (the simulated equivalent of a user disconnect). The
    /// channel closes when the token is cancelled or the configured link
    /// drop is reached.
    pub fn start(&self) -> (mpsc::Receiver<HeartRateMeasurement>, CancellationToken) {
        let (tx, rx) = mpsc::channel(MEASUREMENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let task_token = cancel.clone();
        let tick = self.tick;
        let start_bpm = self.start_bpm;
        let drop_link_after = self.drop_link_after;

        tokio::spawn(async move {
            let mut ticker = interval(tick);
            let mut bpm = start_bpm;
            let mut emitted = 0usize;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("Simulated source cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Some(limit) = drop_link_after
                            && emitted >= limit
                        {
                            debug!("Simulated link drop after {} readings", emitted);
                            break;
                        }

                        bpm = next_bpm(bpm);
                        let payload = encode_measurement(bpm);
                        match HeartRateMeasurement::from_bytes(&payload) {
                            Ok(measurement) => {
                                if tx.send(measurement).await.is_err() {
                                    debug!("Measurement receiver dropped, stopping");
                                    break;
                                }
                                emitted += 1;
                            }
                            Err(e) => warn!("Simulated payload failed to parse: {}", e),
                        }
                    }
                }
            }
        });

        (rx, cancel)
    }
}

/// Random-walk the bpm by up to ±3, clamped to a plausible range.
fn next_bpm(current: u16) -> u16 {
    let delta: i16 = rand::random_range(-3..=3);
    current.saturating_add_signed(delta).clamp(45, 190)
}

/// Encode a bpm as a Heart Rate Measurement payload, picking the narrow
/// or wide format the way a real strap would.
fn encode_measurement(bpm: u16) -> Vec<u8> {
    if bpm <= u16::from(u8::MAX) {
        vec![0x00, bpm as u8]
    } else {
        let bytes = bpm.to_le_bytes();
        vec![0x01, bytes[0], bytes[1]]
    }
}
