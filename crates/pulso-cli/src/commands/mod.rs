//! Command implementations for the CLI.

mod history;
mod monitor;
mod scan;
mod settings;
mod webhook;

pub use history::{HistoryAction, cmd_history};
pub use monitor::cmd_monitor;
pub use scan::cmd_scan;
pub use settings::{SettingsAction, cmd_settings};
pub use webhook::{WebhookAction, cmd_webhook};

use anyhow::{Context, Result};
use pulso_service::Config;
use pulso_store::Store;

/// Open the store at the configured path.
///
/// An open failure is fatal to every persistence feature; it is surfaced
/// here once and never retried.
pub(crate) fn open_store(config: &Config) -> Result<Store> {
    Store::open(config.db_path()).context("Failed to open the local database")
}

/// Format a timestamp for table output.
pub(crate) fn format_time(ts: time::OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}
