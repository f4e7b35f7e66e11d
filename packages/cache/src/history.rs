//! Append-only log of verified repairs.

use std::sync::Arc;

use pothole_admin_pothole_models::HistoryEntry;

use crate::{HISTORY_NAMESPACE, KeyValueStore, load_json, persist_json};

/// In-memory view of the persisted verified-history log.
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Loads the log from `store`. A missing or malformed blob loads as an
    /// empty log.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = load_json(store.as_ref(), HISTORY_NAMESPACE).unwrap_or_default();
        Self { store, entries }
    }

    /// Entries in append order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Appends an entry and persists the log.
    ///
    /// An id that is already logged is skipped; nothing is written and the
    /// call counts as persisted. Otherwise the entry stays in memory even
    /// when persisting fails. Returns whether the log is in the store.
    pub fn append(&mut self, entry: HistoryEntry) -> bool {
        if self.contains(&entry.id) {
            log::debug!("{} is already in the repair history", entry.id);
            return true;
        }
        self.entries.push(entry);
        persist_json(self.store.as_ref(), HISTORY_NAMESPACE, &self.entries)
    }
}
