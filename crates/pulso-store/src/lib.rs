//! Local persistence for the pulso heart-rate monitor.
//!
//! This crate provides SQLite-based storage for monitor settings,
//! recorded sessions, and webhook definitions, plus the in-memory
//! webhook repository the dispatcher reads from.
//!
//! # Example
//!
//! ```no_run
//! use pulso_store::{Store, WebhookRepository};
//!
//! let store = Store::open_default()?;
//! let hooks = WebhookRepository::load(&store)?;
//! for hook in hooks.matching("connected") {
//!     println!("{} -> {}", hook.name, hook.url);
//! }
//! # Ok::<(), pulso_store::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;
mod webhooks;

pub use error::{Error, Result};
pub use models::{SettingValue, StoredSession, WebhookDef};
pub use store::Store;
pub use webhooks::WebhookRepository;

/// Setting key: record sessions while connected.
pub const SETTING_RECORD_SESSIONS: &str = "record_sessions";
/// Setting key: reconnect automatically when the link drops.
pub const SETTING_AUTO_RECONNECT: &str = "auto_reconnect";
/// Setting key: connect to the configured device on startup.
pub const SETTING_AUTO_CONNECT: &str = "auto_connect";

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/pulso/data.db`
/// - macOS: `~/Library/Application Support/pulso/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\pulso\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pulso")
        .join("data.db")
}
