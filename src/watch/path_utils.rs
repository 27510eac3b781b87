// src/watch/path_utils.rs

//! Display helpers for paths under the watched root.

use std::path::Path;

/// Render `path` relative to `root` with forward slashes, for notifications.
///
/// Tries a plain `strip_prefix` first, then retries with both sides
/// canonicalized (macOS reports `/private/var/...` for `/var/...`). Falls back
/// to the full path when the two cannot be related, so a notification always
/// has something to show.
pub fn display_relative(root: &Path, path: &Path) -> String {
    if let Ok(rel) = path.strip_prefix(root) {
        return rel.to_string_lossy().replace('\\', "/");
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return rel.to_string_lossy().replace('\\', "/");
        }
    }

    path.to_string_lossy().replace('\\', "/")
}
