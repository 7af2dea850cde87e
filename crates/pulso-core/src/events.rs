//! Domain events raised by the monitor.
//!
//! Every event carries the name and payload a webhook can be registered
//! against: `connected`, `disconnected`, and `heart_rate_updated`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// Device identifier for events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    /// Unique identifier (peripheral ID or MAC address).
    pub id: String,
    /// Device name if known.
    pub name: Option<String>,
}

impl DeviceId {
    /// Create a new device ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Create a device ID with name.
    pub fn with_name(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// The name if known, the raw identifier otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Reason for disconnection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DisconnectReason {
    /// Normal disconnection requested by the user.
    UserRequested,
    /// The sensor dropped the link (out of range, powered off, ...).
    LinkLost,
    /// BLE error occurred.
    BleError(String),
}

/// Events raised by the monitor.
///
/// All events are serializable for logging and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum MonitorEvent {
    /// Successfully connected to a heart-rate source.
    Connected { device: DeviceId },
    /// Disconnected from the source, carrying the last known bpm (0 if none).
    Disconnected {
        device: DeviceId,
        last_bpm: u16,
        reason: DisconnectReason,
    },
    /// A new reading arrived.
    HeartRateUpdated { device: DeviceId, bpm: u16 },
}

impl MonitorEvent {
    /// The trigger name webhooks are matched against.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Disconnected { .. } => "disconnected",
            Self::HeartRateUpdated { .. } => "heart_rate_updated",
        }
    }

    /// The substitution payload for webhook templates.
    ///
    /// `connected` carries no keys; the other events carry `bpm`.
    pub fn payload(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            Self::Connected { .. } => {}
            Self::Disconnected { last_bpm, .. } => {
                map.insert("bpm".to_string(), Value::from(*last_bpm));
            }
            Self::HeartRateUpdated { bpm, .. } => {
                map.insert("bpm".to_string(), Value::from(*bpm));
            }
        }
        map
    }
}

/// Sender for monitor events.
pub type EventSender = broadcast::Sender<MonitorEvent>;

/// Receiver for monitor events.
pub type EventReceiver = broadcast::Receiver<MonitorEvent>;

/// Event bus fanning monitor events out to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: EventSender,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: MonitorEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> DeviceId {
        DeviceId::with_name("AA:BB:CC:DD:EE:FF", "Polar H10")
    }

    #[test]
    fn test_event_names() {
        assert_eq!(MonitorEvent::Connected { device: device() }.name(), "connected");
        assert_eq!(
            MonitorEvent::Disconnected {
                device: device(),
                last_bpm: 70,
                reason: DisconnectReason::UserRequested,
            }
            .name(),
            "disconnected"
        );
        assert_eq!(
            MonitorEvent::HeartRateUpdated {
                device: device(),
                bpm: 70
            }
            .name(),
            "heart_rate_updated"
        );
    }

    #[test]
    fn test_connected_payload_is_empty() {
        let payload = MonitorEvent::Connected { device: device() }.payload();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_reading_payload_carries_bpm() {
        let payload = MonitorEvent::HeartRateUpdated {
            device: device(),
            bpm: 142,
        }
        .payload();
        assert_eq!(payload.get("bpm"), Some(&Value::from(142)));
    }

    #[test]
    fn test_disconnected_payload_carries_last_bpm() {
        let payload = MonitorEvent::Disconnected {
            device: device(),
            last_bpm: 0,
            reason: DisconnectReason::LinkLost,
        }
        .payload();
        assert_eq!(payload.get("bpm"), Some(&Value::from(0)));
    }

    #[test]
    fn test_event_serialization_tag() {
        let json = serde_json::to_string(&MonitorEvent::HeartRateUpdated {
            device: device(),
            bpm: 80,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"heart_rate_updated\""));
    }

    #[tokio::test]
    async fn test_event_bus_fanout() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.send(MonitorEvent::Connected { device: device() });

        assert!(matches!(rx1.recv().await, Ok(MonitorEvent::Connected { .. })));
        assert!(matches!(rx2.recv().await, Ok(MonitorEvent::Connected { .. })));
    }

    #[test]
    fn test_send_without_receivers_does_not_panic() {
        let bus = EventBus::new(1);
        bus.send(MonitorEvent::Connected { device: device() });
    }
}
