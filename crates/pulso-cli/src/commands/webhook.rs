//! Webhook command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;

use pulso_service::{Config, Dispatcher, PresetImporter};
use pulso_store::{WebhookDef, WebhookRepository};

use crate::commands::open_store;

#[derive(Subcommand)]
pub enum WebhookAction {
    /// List configured webhooks
    List,

    /// Add a webhook
    Add {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// URL template; `{bpm}` is substituted from the event payload
        #[arg(short, long)]
        url: String,

        /// Trigger events (connected, disconnected, heart_rate_updated)
        #[arg(short, long, value_delimiter = ',', default_value = "heart_rate_updated")]
        triggers: Vec<String>,

        /// Optional body template
        #[arg(short, long)]
        body: Option<String>,

        /// Optional headers as a JSON object, e.g. '{"X-Token": "abc"}'
        #[arg(long)]
        headers: Option<String>,

        /// Create the webhook disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a webhook
    Remove {
        /// Webhook id (see `webhook list`)
        id: String,
    },

    /// Enable a webhook
    Enable { id: String },

    /// Disable a webhook
    Disable { id: String },

    /// Send a test payload ({bpm: 88}) through a webhook
    Test {
        /// Webhook id; defaults to the first enabled webhook
        id: Option<String>,
    },

    /// Replace the collection with remote presets
    Import {
        /// Preset URL; defaults to monitor.preset_url from the config
        #[arg(long)]
        url: Option<String>,
    },
}

pub async fn cmd_webhook(config: &Config, action: WebhookAction) -> Result<()> {
    let store = open_store(config)?;
    let mut hooks = WebhookRepository::load(&store).context("Failed to load webhooks")?;

    match action {
        WebhookAction::List => {
            if hooks.is_empty() {
                println!("No webhooks configured.");
                return Ok(());
            }

            for hook in hooks.all() {
                let marker = if hook.enabled { "[x]" } else { "[ ]" };
                println!(
                    "{} {}  {}  [{}]",
                    marker,
                    hook.id,
                    if hook.name.is_empty() {
                        "(unnamed)"
                    } else {
                        &hook.name
                    },
                    hook.triggers.join(",")
                );
                println!("      url: {}", hook.url);
                if let Some(body) = &hook.body {
                    println!("      body: {}", body);
                }
                if let Some(headers) = &hook.headers {
                    println!("      headers: {}", headers);
                }
            }
        }

        WebhookAction::Add {
            name,
            url,
            triggers,
            body,
            headers,
            disabled,
        } => {
            hooks
                .add(
                    &store,
                    WebhookDef {
                        id: String::new(),
                        enabled: !disabled,
                        name: name.clone(),
                        url,
                        triggers,
                        body,
                        headers,
                    },
                )
                .context("Failed to save webhook")?;
            println!("Added webhook '{}'", name);
        }

        WebhookAction::Remove { id } => {
            hooks
                .remove(&store, &id)
                .context("Failed to remove webhook")?;
            println!("Removed webhook {}", id);
        }

        WebhookAction::Enable { id } => {
            hooks
                .set_enabled(&store, &id, true)
                .context("Failed to enable webhook")?;
            println!("Enabled webhook {}", id);
        }

        WebhookAction::Disable { id } => {
            hooks
                .set_enabled(&store, &id, false)
                .context("Failed to disable webhook")?;
            println!("Disabled webhook {}", id);
        }

        WebhookAction::Test { id } => {
            let dispatcher = Dispatcher::new();
            let name = dispatcher
                .send_test(&hooks, id.as_deref())
                .context("Failed to send test payload")?;
            // The POST is fire-and-forget; give it a moment to leave
            // before the process exits
            tokio::time::sleep(Duration::from_secs(1)).await;
            println!(
                "Test payload sent via '{}'; check the receiving endpoint",
                name
            );
        }

        WebhookAction::Import { url } => {
            let url = url.unwrap_or_else(|| config.monitor.preset_url.clone());
            let importer = PresetImporter::new();
            let count = importer
                .import(&store, &mut hooks, &url)
                .await
                .context("Preset import failed; local webhooks unchanged")?;
            println!("Imported {} webhook preset(s) from {}", count, url);
        }
    }

    Ok(())
}
