//! Webhook dispatch.
//!
//! `dispatch` walks the enabled definitions whose trigger set contains the
//! event's name and fires one HTTP POST per match. Requests are
//! fire-and-forget: delivery is at-most-once, best-effort, and its outcome
//! is never inspected, retried, or reported, so a failing endpoint can
//! never stall the reading path.
//!
//! Placeholder substitution is a verbatim string replace of `{key}` with
//! the payload value. Values are NOT escaped; a payload value containing
//! template syntax or JSON metacharacters flows into the URL, body, and
//! headers as-is. This is a known, preserved limitation.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use pulso_core::MonitorEvent;
use pulso_store::{WebhookDef, WebhookRepository};

use crate::error::{Error, Result};

/// A send that could not be attempted, surfaced to the user.
///
/// Only local failures (bad header blob) land here; network outcomes of
/// issued requests are unobserved.
#[derive(Debug)]
pub struct DispatchFailure {
    /// Display name of the failing webhook.
    pub webhook: String,
    /// What went wrong.
    pub error: Error,
}

/// A fully resolved outbound request, ready to POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

/// Fires webhooks for monitor events.
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    /// Create a dispatcher with a default HTTP client.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Fire every enabled webhook registered for this event.
    ///
    /// Returns the per-webhook failures that prevented a send from being
    /// attempted; one bad definition never blocks the others.
    pub fn dispatch(&self, hooks: &WebhookRepository, event: &MonitorEvent) -> Vec<DispatchFailure> {
        let payload = event.payload();
        let mut failures = Vec::new();

        for hook in hooks.matching(event.name()) {
            if let Err(error) = self.send(hook, &payload) {
                warn!(webhook = %hook.name, %error, "Webhook send aborted");
                failures.push(DispatchFailure {
                    webhook: hook.name.clone(),
                    error,
                });
            }
        }

        failures
    }

    /// Resolve and issue one webhook POST, fire-and-forget.
    pub fn send(&self, hook: &WebhookDef, payload: &Map<String, Value>) -> Result<()> {
        let resolved = resolve(hook, payload)?;

        let mut request = self.client.post(&resolved.url);
        for (name, value) in &resolved.headers {
            request = request.header(name, value);
        }
        if let Some(body) = resolved.body {
            request = request.body(body);
        }

        let url = resolved.url;
        tokio::spawn(async move {
            // Outcome intentionally unobserved
            if let Err(e) = request.send().await {
                debug!(%url, "Webhook POST failed (not reported): {}", e);
            }
        });

        Ok(())
    }

    /// Send a synthetic `{bpm: 88}` payload through a webhook.
    ///
    /// With an id, tests that webhook regardless of its enabled flag;
    /// without one, tests the first enabled webhook.
    pub fn send_test(&self, hooks: &WebhookRepository, id: Option<&str>) -> Result<String> {
        let hook = match id {
            Some(id) => hooks.get(id).ok_or_else(|| {
                Error::Store(pulso_store::Error::WebhookNotFound(id.to_string()))
            })?,
            None => hooks
                .all()
                .iter()
                .find(|h| h.enabled)
                .ok_or(Error::NoEnabledWebhook)?,
        };

        let mut payload = Map::new();
        payload.insert("bpm".to_string(), Value::from(88));
        self.send(hook, &payload)?;
        Ok(hook.name.clone())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply placeholder substitution to a webhook's URL, body, and headers.
///
/// Headers are parsed from the stored JSON text blob here, at send time;
/// a malformed blob aborts this webhook's send only.
pub fn resolve(hook: &WebhookDef, payload: &Map<String, Value>) -> Result<ResolvedRequest> {
    let url = substitute(&hook.url, payload);
    let body = hook.body.as_ref().map(|b| substitute(b, payload));

    let mut headers = Vec::new();
    if let Some(text) = hook.headers.as_deref()
        && !text.trim().is_empty()
    {
        let parsed: Value = serde_json::from_str(text).map_err(|e| Error::MalformedHeaders {
            webhook: hook.name.clone(),
            source: e,
        })?;
        let object = parsed.as_object().ok_or_else(|| Error::HeadersNotObject {
            webhook: hook.name.clone(),
        })?;

        for (name, value) in object {
            // Substitution applies to string-valued headers only
            let value = match value {
                Value::String(s) => substitute(s, payload),
                other => other.to_string(),
            };
            headers.push((name.clone(), value));
        }
    }

    Ok(ResolvedRequest { url, body, headers })
}

/// Replace every literal `{key}` with the payload value, stringified.
///
/// Keys absent from the payload leave their placeholder untouched.
fn substitute(template: &str, payload: &Map<String, Value>) -> String {
    let mut out = template.to_string();
    for (key, value) in payload {
        let needle = format!("{{{}}}", key);
        out = out.replace(&needle, &stringify(value));
    }
    out
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulso_core::DeviceId;
    use pulso_store::Store;

    fn payload_bpm(bpm: u16) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("bpm".to_string(), Value::from(bpm));
        map
    }

    fn hook(url: &str) -> WebhookDef {
        WebhookDef {
            id: "1".to_string(),
            enabled: true,
            name: "test".to_string(),
            url: url.to_string(),
            triggers: vec!["heart_rate_updated".to_string()],
            body: None,
            headers: None,
        }
    }

    #[test]
    fn test_substitute_url_and_body() {
        let mut h = hook("http://example.com/hr/{bpm}");
        h.body = Some(r#"{"value": {bpm}}"#.to_string());

        let resolved = resolve(&h, &payload_bpm(75)).unwrap();
        assert_eq!(resolved.url, "http://example.com/hr/75");
        assert_eq!(resolved.body.as_deref(), Some(r#"{"value": 75}"#));
    }

    #[test]
    fn test_missing_key_leaves_placeholder_literal() {
        // `connected` carries an empty payload; {bpm} must survive verbatim
        let h = hook("http://x/{bpm}");
        let resolved = resolve(&h, &Map::new()).unwrap();
        assert_eq!(resolved.url, "http://x/{bpm}");
    }

    #[test]
    fn test_substitute_repeated_occurrences() {
        let mut h = hook("http://x/{bpm}/{bpm}");
        h.body = Some("{bpm} and {bpm}".to_string());

        let resolved = resolve(&h, &payload_bpm(60)).unwrap();
        assert_eq!(resolved.url, "http://x/60/60");
        assert_eq!(resolved.body.as_deref(), Some("60 and 60"));
    }

    #[test]
    fn test_headers_substituted_in_string_values_only() {
        let mut h = hook("http://x");
        h.headers = Some(r#"{"X-Bpm": "{bpm}", "X-Retries": 3}"#.to_string());

        let resolved = resolve(&h, &payload_bpm(88)).unwrap();
        assert!(resolved
            .headers
            .contains(&("X-Bpm".to_string(), "88".to_string())));
        assert!(resolved
            .headers
            .contains(&("X-Retries".to_string(), "3".to_string())));
    }

    #[test]
    fn test_malformed_headers_abort_resolution() {
        let mut h = hook("http://x");
        h.headers = Some("{not valid json".to_string());

        let err = resolve(&h, &payload_bpm(70)).unwrap_err();
        assert!(matches!(err, Error::MalformedHeaders { .. }));
    }

    #[test]
    fn test_non_object_headers_rejected() {
        let mut h = hook("http://x");
        h.headers = Some(r#"["a", "b"]"#.to_string());

        let err = resolve(&h, &payload_bpm(70)).unwrap_err();
        assert!(matches!(err, Error::HeadersNotObject { .. }));
    }

    #[test]
    fn test_empty_headers_blob_is_no_headers() {
        let mut h = hook("http://x");
        h.headers = Some("   ".to_string());
        let resolved = resolve(&h, &payload_bpm(70)).unwrap();
        assert!(resolved.headers.is_empty());
    }

    #[test]
    fn test_unescaped_substitution_is_preserved() {
        // Documented limitation: values containing template syntax or JSON
        // metacharacters are substituted verbatim, corrupting the body
        let mut h = hook("http://x");
        h.body = Some(r#"{"note": "{note}"}"#.to_string());

        let mut payload = Map::new();
        payload.insert("note".to_string(), Value::from(r#"a"quote"#));

        let resolved = resolve(&h, &payload).unwrap();
        assert_eq!(resolved.body.as_deref(), Some(r#"{"note": "a"quote"}"#));
    }

    #[tokio::test]
    async fn test_dispatch_skips_disabled_and_non_matching() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();

        let mut enabled = hook("http://127.0.0.1:1/enabled");
        enabled.id = String::new();
        let mut disabled = hook("http://127.0.0.1:1/disabled");
        disabled.id = String::new();
        disabled.enabled = false;
        let mut other_trigger = hook("http://127.0.0.1:1/other");
        other_trigger.id = String::new();
        other_trigger.triggers = vec!["connected".to_string()];

        repo.replace_all(&store, vec![enabled, disabled, other_trigger])
            .unwrap();

        let dispatcher = Dispatcher::new();
        let event = MonitorEvent::HeartRateUpdated {
            device: DeviceId::new("sim"),
            bpm: 70,
        };

        // Only the enabled, matching hook is attempted; none fail locally
        let failures = dispatcher.dispatch(&repo, &event);
        assert!(failures.is_empty());
        assert_eq!(repo.matching(event.name()).count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_bad_headers_without_blocking_others() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();

        let mut bad = hook("http://127.0.0.1:1/bad");
        bad.id = String::new();
        bad.name = "bad".to_string();
        bad.headers = Some("{oops".to_string());
        let mut good = hook("http://127.0.0.1:1/good");
        good.id = String::new();
        good.name = "good".to_string();

        repo.replace_all(&store, vec![bad, good]).unwrap();

        let dispatcher = Dispatcher::new();
        let event = MonitorEvent::HeartRateUpdated {
            device: DeviceId::new("sim"),
            bpm: 70,
        };

        let failures = dispatcher.dispatch(&repo, &event);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].webhook, "bad");
        assert!(matches!(
            failures[0].error,
            Error::MalformedHeaders { .. }
        ));
    }
}
