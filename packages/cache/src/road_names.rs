//! Road names cached by verbatim `"lat, lon"` location key.
//!
//! Caches both successful lookups and failures (stored as the
//! `"Unknown road"` sentinel) so a coordinate is only ever sent to the
//! resolver once.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{KeyValueStore, ROAD_NAMES_NAMESPACE, load_json, persist_json};

/// In-memory view of the persisted road-name cache.
pub struct RoadNameCache {
    store: Arc<dyn KeyValueStore>,
    names: BTreeMap<String, String>,
}

impl RoadNameCache {
    /// Loads the cache from `store`. A missing or malformed blob loads as
    /// an empty cache.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let names = load_json(store.as_ref(), ROAD_NAMES_NAMESPACE).unwrap_or_default();
        Self { store, names }
    }

    /// Looks up a cached road name by location key.
    #[must_use]
    pub fn get(&self, location_key: &str) -> Option<&str> {
        self.names.get(location_key).map(String::as_str)
    }

    /// Records a resolved name and persists the whole cache.
    ///
    /// The in-memory entry is kept even when persisting fails.
    pub fn insert(&mut self, location_key: impl Into<String>, road_name: impl Into<String>) {
        self.names.insert(location_key.into(), road_name.into());
        persist_json(self.store.as_ref(), ROAD_NAMES_NAMESPACE, &self.names);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
