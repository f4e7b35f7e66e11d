#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Local key-value persistence for the pothole admin toolchain.
//!
//! The store is deliberately dumb: one opaque string blob per namespace,
//! the way a browser's local storage works. Typed views sit on top:
//!
//! - [`RoadNameCache`]: road names keyed by verbatim `"lat, lon"` strings.
//! - [`HistoryLog`]: append-only log of verified repairs.
//! - [`auth`]: the backend bearer token.
//!
//! Every typed view is swallow-on-failure: a corrupt blob reads as empty
//! and a failed write is logged and skipped. Nothing in here should ever
//! stop the dashboard from rendering.

pub mod auth;
pub mod history;
pub mod paths;
pub mod road_names;
pub mod store;

pub use history::HistoryLog;
pub use road_names::RoadNameCache;
pub use store::{FileStore, MemoryStore};

use thiserror::Error;

/// Namespace holding the road-name-by-coordinate cache.
pub const ROAD_NAMES_NAMESPACE: &str = "road_names";

/// Namespace holding the verified-history log.
pub const HISTORY_NAMESPACE: &str = "verified_history";

/// Namespace holding the backend auth token.
pub const AUTH_TOKEN_NAMESPACE: &str = "admin_token";

/// Errors from key-value store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error reading or writing a blob.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blob could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the blob would exceed the store's capacity.
    #[error("Quota exceeded writing '{namespace}': {size} bytes > {quota} bytes")]
    QuotaExceeded {
        /// Namespace being written.
        namespace: String,
        /// Size of the rejected blob.
        size: usize,
        /// Configured capacity.
        quota: usize,
    },

    /// The store's internal lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// An opaque blob store with one value per namespace.
pub trait KeyValueStore: Send + Sync {
    /// Reads the blob stored under `namespace`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage cannot be read.
    fn get(&self, namespace: &str) -> Result<Option<String>, CacheError>;

    /// Replaces the blob stored under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the blob cannot be written.
    fn set(&self, namespace: &str, value: &str) -> Result<(), CacheError>;

    /// Deletes the blob stored under `namespace`. Missing blobs are not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage cannot be modified.
    fn remove(&self, namespace: &str) -> Result<(), CacheError>;
}

/// Reads and deserializes a namespace, treating any failure as absent.
pub(crate) fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    namespace: &str,
) -> Option<T> {
    let blob = match store.get(namespace) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read '{namespace}', treating as empty: {e}");
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Malformed '{namespace}' blob, treating as empty: {e}");
            None
        }
    }
}

/// Serializes and writes a namespace, logging and skipping on failure.
///
/// Returns whether the write went through.
pub(crate) fn persist_json<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    namespace: &str,
    value: &T,
) -> bool {
    let result = serde_json::to_string(value)
        .map_err(CacheError::from)
        .and_then(|blob| store.set(namespace, &blob));

    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Skipping write of '{namespace}': {e}");
            false
        }
    }
}
