//! Remote webhook preset import.
//!
//! One-shot GET against a preset URL publishing a JSON array of webhook
//! definitions. Anything other than an array fails the import and leaves
//! the local collection untouched; a successful import replaces the
//! collection wholesale.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::info;

use pulso_store::{Store, WebhookDef, WebhookRepository};

use crate::error::{Error, Result};

/// Imports webhook presets from a remote URL.
pub struct PresetImporter {
    client: Client,
}

impl PresetImporter {
    /// Create an importer with a default HTTP client.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Fetch and parse the preset collection.
    pub async fn fetch(&self, url: &str) -> Result<Vec<WebhookDef>> {
        info!(%url, "Fetching webhook presets");
        let response = self.client.get(url).send().await?;
        let value: Value = response.json().await?;
        parse_presets(value)
    }

    /// Fetch presets and replace the local collection.
    ///
    /// On any failure (network, non-array response, malformed entry)
    /// the existing collection is left unchanged.
    pub async fn import(
        &self,
        store: &Store,
        hooks: &mut WebhookRepository,
        url: &str,
    ) -> Result<usize> {
        let presets = self.fetch(url).await?;
        hooks.replace_all(store, presets)?;
        info!(count = hooks.len(), "Imported webhook presets");
        Ok(hooks.len())
    }
}

impl Default for PresetImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a preset response body into webhook definitions.
///
/// The response must be a JSON array; each entry's `enabled` flag is
/// normalized to a bool by deserialization (missing means disabled).
fn parse_presets(value: Value) -> Result<Vec<WebhookDef>> {
    let Value::Array(items) = value else {
        return Err(Error::PresetNotArray);
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Error::MalformedPreset))
        .collect()
}
