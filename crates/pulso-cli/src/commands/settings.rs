//! Settings command implementation.

use anyhow::{Context, Result};
use clap::Subcommand;

use pulso_service::Config;
use pulso_store::SettingValue;

use crate::commands::open_store;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Read a setting
    Get {
        /// Setting key (record_sessions, auto_reconnect, auto_connect, ...)
        key: String,
    },

    /// Write a setting; `true`/`false` become toggles, anything else text
    Set { key: String, value: String },
}

pub fn cmd_settings(config: &Config, action: SettingsAction) -> Result<()> {
    let store = open_store(config)?;

    match action {
        SettingsAction::Get { key } => {
            match store.get_setting(&key).context("Failed to read setting")? {
                Some(SettingValue::Bool(b)) => println!("{} = {}", key, b),
                Some(SettingValue::Text(s)) => println!("{} = {}", key, s),
                None => println!("{} is not set", key),
            }
        }

        SettingsAction::Set { key, value } => {
            store
                .set_setting(&key, &parse_value(&value))
                .context("Failed to write setting")?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}

/// `true`/`false` become toggles; anything else is stored as text.
fn parse_value(value: &str) -> SettingValue {
    match value {
        "true" => SettingValue::Bool(true),
        "false" => SettingValue::Bool(false),
        other => SettingValue::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulso_store::{SETTING_RECORD_SESSIONS, Store};

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), SettingValue::Bool(true));
        assert_eq!(parse_value("false"), SettingValue::Bool(false));
        assert_eq!(parse_value("True"), SettingValue::from("True"));
        assert_eq!(parse_value("garage"), SettingValue::from("garage"));
    }

    #[test]
    fn test_set_then_get_through_configured_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("data.db"));

        cmd_settings(
            &config,
            SettingsAction::Set {
                key: SETTING_RECORD_SESSIONS.to_string(),
                value: "true".to_string(),
            },
        )
        .unwrap();

        let store = Store::open(config.db_path()).unwrap();
        assert!(store.get_bool(SETTING_RECORD_SESSIONS).unwrap());
    }
}
