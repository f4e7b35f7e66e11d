//! Persistence of the backend bearer token between CLI invocations.

use crate::{AUTH_TOKEN_NAMESPACE, KeyValueStore};

/// Returns the stored token, if any. Read failures count as logged out.
#[must_use]
pub fn load_token(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(AUTH_TOKEN_NAMESPACE) {
        Ok(token) => token.filter(|t| !t.trim().is_empty()),
        Err(e) => {
            log::warn!("Failed to read stored token: {e}");
            None
        }
    }
}

/// Stores `token`, or clears it when `None`.
pub fn save_token(store: &dyn KeyValueStore, token: Option<&str>) {
    let result = match token {
        Some(token) => store.set(AUTH_TOKEN_NAMESPACE, token),
        None => store.remove(AUTH_TOKEN_NAMESPACE),
    };
    if let Err(e) = result {
        log::warn!("Failed to update stored token: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn save_load_and_clear() {
        let store = MemoryStore::new();
        assert!(load_token(&store).is_none());

        save_token(&store, Some("abc"));
        assert_eq!(load_token(&store).as_deref(), Some("abc"));

        save_token(&store, None);
        assert!(load_token(&store).is_none());
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let store = MemoryStore::new();
        save_token(&store, Some("  "));
        assert!(load_token(&store).is_none());
    }
}
