//! In-memory webhook repository backed by the store.
//!
//! The repository owns the authoritative in-memory copy of the webhook
//! collection. Every mutation goes through a single write path that
//! commits the whole collection (clear-then-rewrite) and then refreshes
//! the cache from storage, so cached definitions always carry their
//! persisted ids. Reads never touch the database.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::WebhookDef;
use crate::store::Store;

/// Repository over the webhook collection.
#[derive(Debug, Default)]
pub struct WebhookRepository {
    cache: Vec<WebhookDef>,
}

impl WebhookRepository {
    /// Load the repository from storage.
    pub fn load(store: &Store) -> Result<Self> {
        Ok(Self {
            cache: store.list_webhooks()?,
        })
    }

    /// All definitions in storage order.
    pub fn all(&self) -> &[WebhookDef] {
        &self.cache
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&WebhookDef> {
        self.cache.iter().find(|h| h.id == id)
    }

    /// Enabled definitions whose trigger set contains `event`.
    pub fn matching(&self, event: &str) -> impl Iterator<Item = &WebhookDef> {
        self.cache.iter().filter(move |h| h.matches(event))
    }

    /// Append a new definition.
    pub fn add(&mut self, store: &Store, hook: WebhookDef) -> Result<()> {
        let mut next = self.cache.clone();
        next.push(hook);
        self.commit(store, next)
    }

    /// Replace the definition with the given id, keeping its id.
    pub fn update(&mut self, store: &Store, id: &str, mut hook: WebhookDef) -> Result<()> {
        let mut next = self.cache.clone();
        let slot = next
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| Error::WebhookNotFound(id.to_string()))?;
        hook.id = slot.id.clone();
        *slot = hook;
        self.commit(store, next)
    }

    /// Remove the definition with the given id.
    pub fn remove(&mut self, store: &Store, id: &str) -> Result<()> {
        let mut next = self.cache.clone();
        let before = next.len();
        next.retain(|h| h.id != id);
        if next.len() == before {
            return Err(Error::WebhookNotFound(id.to_string()));
        }
        self.commit(store, next)
    }

    /// Toggle a definition on or off.
    pub fn set_enabled(&mut self, store: &Store, id: &str, enabled: bool) -> Result<()> {
        let mut next = self.cache.clone();
        let slot = next
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| Error::WebhookNotFound(id.to_string()))?;
        slot.enabled = enabled;
        self.commit(store, next)
    }

    /// Replace the whole collection, e.g. from a remote preset import.
    pub fn replace_all(&mut self, store: &Store, hooks: Vec<WebhookDef>) -> Result<()> {
        self.commit(store, hooks)
    }

    /// The single write path: persist, then refresh the cache from
    /// storage so assigned ids are visible.
    fn commit(&mut self, store: &Store, next: Vec<WebhookDef>) -> Result<()> {
        store.replace_webhooks(&next)?;
        self.cache = store.list_webhooks()?;
        debug!(count = self.cache.len(), "Webhook cache refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(name: &str, enabled: bool, triggers: &[&str]) -> WebhookDef {
        WebhookDef {
            id: String::new(),
            enabled,
            name: name.to_string(),
            url: format!("http://example.com/{}", name),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            body: None,
            headers: None,
        }
    }

    #[test]
    fn test_load_empty() {
        let store = Store::open_in_memory().unwrap();
        let repo = WebhookRepository::load(&store).unwrap();
        assert!(repo.is_empty());
    }

    #[test]
    fn test_add_assigns_id_and_persists() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();

        repo.add(&store, hook("ping", true, &["connected"])).unwrap();

        assert_eq!(repo.len(), 1);
        let id = repo.all()[0].id.clone();
        assert!(!id.is_empty());

        // A fresh load sees the same collection
        let reloaded = WebhookRepository::load(&store).unwrap();
        assert_eq!(reloaded.all(), repo.all());
    }

    #[test]
    fn test_update_keeps_id() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();
        repo.add(&store, hook("ping", true, &["connected"])).unwrap();
        let id = repo.all()[0].id.clone();

        let mut edited = hook("renamed", true, &["disconnected"]);
        edited.id = "ignored".to_string();
        repo.update(&store, &id, edited).unwrap();

        assert_eq!(repo.all()[0].id, id);
        assert_eq!(repo.all()[0].name, "renamed");
        assert_eq!(repo.all()[0].triggers, vec!["disconnected"]);
    }

    #[test]
    fn test_remove_unknown_id_errors() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();
        repo.add(&store, hook("ping", true, &["connected"])).unwrap();

        let err = repo.remove(&store, "nope").unwrap_err();
        assert!(matches!(err, Error::WebhookNotFound(_)));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_set_enabled_round_trips() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();
        repo.add(&store, hook("ping", true, &["connected"])).unwrap();
        let id = repo.all()[0].id.clone();

        repo.set_enabled(&store, &id, false).unwrap();
        assert!(!repo.all()[0].enabled);
        assert_eq!(repo.matching("connected").count(), 0);

        repo.set_enabled(&store, &id, true).unwrap();
        assert_eq!(repo.matching("connected").count(), 1);
    }

    #[test]
    fn test_matching_filters_disabled_and_other_triggers() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();

        repo.add(&store, hook("a", true, &["connected"])).unwrap();
        repo.add(&store, hook("b", false, &["connected"])).unwrap();
        repo.add(&store, hook("c", true, &["heart_rate_updated"]))
            .unwrap();

        let names: Vec<_> = repo.matching("connected").map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_replace_all_swaps_collection() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();
        repo.add(&store, hook("old", true, &["connected"])).unwrap();

        repo.replace_all(
            &store,
            vec![
                hook("new1", true, &["connected"]),
                hook("new2", true, &["disconnected"]),
            ],
        )
        .unwrap();

        assert_eq!(repo.len(), 2);
        assert!(repo.all().iter().all(|h| !h.id.is_empty()));
        assert!(repo.all().iter().any(|h| h.name == "new1"));
        assert!(!repo.all().iter().any(|h| h.name == "old"));
    }

    #[test]
    fn test_failed_commit_leaves_persisted_state() {
        let store = Store::open_in_memory().unwrap();
        let mut repo = WebhookRepository::load(&store).unwrap();
        repo.add(&store, hook("keep", true, &["connected"])).unwrap();

        let mut bad = hook("bad", true, &["connected"]);
        bad.url = String::new();
        assert!(repo.replace_all(&store, vec![bad]).is_err());

        // Persisted collection unchanged
        let reloaded = WebhookRepository::load(&store).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.all()[0].name, "keep");
    }
}
