//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use pulso_types::{Sample, Session};

/// A persisted setting value.
///
/// Settings are either toggles (`record_sessions`, `auto_reconnect`,
/// `auto_connect`) or free-form text; they are stored as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    /// The boolean value, if this setting is a toggle.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    /// The text value, if this setting is free-form.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Bool(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A session stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Database row ID.
    pub id: i64,
    /// Identifier of the device the readings came from.
    pub device: String,
    /// When the connection began.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// When the connection ended.
    #[serde(with = "time::serde::rfc3339")]
    pub ended_at: OffsetDateTime,
    /// Readings in arrival order.
    pub samples: Vec<Sample>,
}

impl StoredSession {
    /// Convert back to a Session.
    pub fn to_session(&self) -> Session {
        Session {
            device: self.device.clone(),
            started_at: self.started_at,
            ended_at: Some(self.ended_at),
            samples: self.samples.clone(),
        }
    }
}

/// A webhook definition.
///
/// `headers` is kept as the raw JSON text the user entered; it is parsed
/// only when a send is attempted, so a bad blob breaks that webhook's
/// sends without blocking saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookDef {
    /// Unique identifier; assigned at save time when empty.
    #[serde(default)]
    pub id: String,
    /// Whether this webhook fires at all.
    #[serde(default)]
    pub enabled: bool,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// URL template; `{key}` placeholders are substituted from the
    /// event payload.
    pub url: String,
    /// Event names this webhook fires on.
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Optional body template.
    #[serde(default)]
    pub body: Option<String>,
    /// Optional header map as raw JSON text.
    #[serde(default)]
    pub headers: Option<String>,
}

impl WebhookDef {
    /// Whether this webhook should fire for the named event.
    pub fn matches(&self, event: &str) -> bool {
        self.enabled && self.triggers.iter().any(|t| t == event)
    }
}
