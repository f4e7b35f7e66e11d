//! [`KeyValueStore`] implementations: one JSON file per namespace on disk,
//! and an in-memory map for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{CacheError, KeyValueStore, paths};

/// Stores each namespace as `<dir>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    /// Opens a store rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    /// Opens the store at the default data directory.
    #[must_use]
    pub fn open_default() -> Self {
        Self::new(paths::store_dir())
    }

    /// Caps the size of any single blob.
    #[must_use]
    pub const fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(self.path_for(namespace)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, namespace: &str, value: &str) -> Result<(), CacheError> {
        check_quota(self.quota, namespace, value)?;
        paths::ensure_dir(&self.dir)?;

        // Write-then-rename so a crash never leaves a half-written blob.
        let path = self.path_for(namespace);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<(), CacheError> {
        match std::fs::remove_file(self.path_for(namespace)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps every namespace in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the size of any single blob.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            blobs: Mutex::default(),
            quota: Some(bytes),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str) -> Result<Option<String>, CacheError> {
        let blobs = self.blobs.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(blobs.get(namespace).cloned())
    }

    fn set(&self, namespace: &str, value: &str) -> Result<(), CacheError> {
        check_quota(self.quota, namespace, value)?;
        let mut blobs = self.blobs.lock().map_err(|_| CacheError::Poisoned)?;
        blobs.insert(namespace.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<(), CacheError> {
        let mut blobs = self.blobs.lock().map_err(|_| CacheError::Poisoned)?;
        blobs.remove(namespace);
        Ok(())
    }
}

fn check_quota(quota: Option<usize>, namespace: &str, value: &str) -> Result<(), CacheError> {
    match quota {
        Some(quota) if value.len() > quota => Err(CacheError::QuotaExceeded {
            namespace: namespace.to_string(),
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}
