//! Filesystem path helpers.

use std::path::{Path, PathBuf};

/// Absolute, canonical form of `path` when it exists.
///
/// Watcher events carry canonical paths, so anything compared against them
/// goes through here first. Missing paths are made absolute against the
/// current directory instead.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}
