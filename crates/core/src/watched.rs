//! The user's watched list.
//!
//! The list is an immutable snapshot (`Arc<[WatchedEntry]>`). Every mutation
//! builds a new sequence, swaps it in and saves it before returning, so
//! readers holding an earlier snapshot never observe a partial change and
//! the durable copy matches memory at the end of each mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::WATCHED_MUTATIONS;
use crate::store::PersistentStore;
use crate::summary::{summarize, WatchlistSummary};

/// A rated movie in the watched list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    pub catalog_rating: f32,
    pub runtime_minutes: u32,
    pub user_rating: u8,
    #[serde(default)]
    pub rating_revision_count: u32,
}

/// Persisted watched list.
#[derive(Debug)]
pub struct WatchedList {
    store: PersistentStore,
    key: String,
    entries: Arc<[WatchedEntry]>,
}

impl WatchedList {
    /// Seed the list from the durable slot `key`.
    pub fn load(store: PersistentStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries: Vec<WatchedEntry> = store.load(&key);
        info!("Loaded {} watched entries from '{}'", entries.len(), key);

        Self {
            store,
            key,
            entries: entries.into(),
        }
    }

    /// Current snapshot.
    pub fn entries(&self) -> Arc<[WatchedEntry]> {
        Arc::clone(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Append `entry` and persist.
    ///
    /// Does not check for duplicates; callers that need unique ids check
    /// [`WatchedList::contains`] first.
    pub fn add(&mut self, entry: WatchedEntry) {
        info!("Adding '{}' ({}) to watched list", entry.title, entry.id);

        let entries: Vec<WatchedEntry> = self
            .entries
            .iter()
            .cloned()
            .chain(std::iter::once(entry))
            .collect();
        self.replace(entries);
        WATCHED_MUTATIONS.with_label_values(&["add"]).inc();
    }

    /// Remove every entry with `id` and persist. Returns whether anything was
    /// removed.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }

        info!("Removing {} from watched list", id);

        let entries: Vec<WatchedEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.replace(entries);
        WATCHED_MUTATIONS.with_label_values(&["delete"]).inc();
        true
    }

    /// Aggregate statistics over the current snapshot.
    pub fn summary(&self) -> WatchlistSummary {
        summarize(&self.entries)
    }

    fn replace(&mut self, entries: Vec<WatchedEntry>) {
        self.entries = entries.into();
        self.store.save(&self.key, &*self.entries);
    }
}
