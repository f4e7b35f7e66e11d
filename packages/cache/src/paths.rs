//! Where the dashboard keeps its local blobs.
//!
//! Defaults live under `data/` at the workspace root; the dashboard's
//! configuration may point the data directory elsewhere.

use std::path::{Path, PathBuf};

/// Subdirectory of the data directory holding key-value blobs.
const STORE_SUBDIR: &str = "store";

/// The workspace root, resolved at compile time. Falls back to this
/// crate's own directory if the layout is unexpectedly shallow.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .ancestors()
        .nth(2)
        .unwrap_or(manifest)
        .to_path_buf()
}

/// The default data directory, `<root>/data`.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// The key-value store directory inside `data_dir`.
#[must_use]
pub fn store_dir_in(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_SUBDIR)
}

/// The default key-value store directory.
#[must_use]
pub fn store_dir() -> PathBuf {
    store_dir_in(&data_dir())
}

/// Creates `path` and its parents if missing.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    log::debug!("Creating {}", path.display());
    std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_lives_under_data() {
        assert_eq!(store_dir(), data_dir().join("store"));
        assert_eq!(
            store_dir_in(Path::new("/tmp/pothole")),
            PathBuf::from("/tmp/pothole/store")
        );
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = std::env::temp_dir()
            .join("pothole_admin_paths_test")
            .join(std::process::id().to_string());
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir).ok();
    }
}
