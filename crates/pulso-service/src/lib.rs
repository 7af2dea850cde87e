//! Monitor runtime and webhook dispatch for the pulso heart-rate monitor.
//!
//! This crate glues the BLE core to persistence and outbound HTTP:
//!
//! - [`Monitor`] drives one reading source and applies the fixed
//!   per-reading side-effect order (display, record, notify)
//! - [`Dispatcher`] fires webhooks with `{key}` placeholder substitution,
//!   fire-and-forget
//! - [`PresetImporter`] pulls a webhook collection from a remote JSON
//!   preset
//! - [`Config`] is the TOML configuration the CLI loads at startup

pub mod config;
pub mod dispatch;
pub mod error;
pub mod import;
pub mod monitor;

pub use config::{Config, ConfigError, DEFAULT_PRESET_URL, default_config_path};
pub use dispatch::{DispatchFailure, Dispatcher, ResolvedRequest};
pub use error::{Error, Result};
pub use import::PresetImporter;
pub use monitor::{Monitor, MonitorOptions, MonitorUpdate};
