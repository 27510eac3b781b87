// src/watch/snapshot.rs

//! Initial snapshot of the watched tree.
//!
//! At startup every file under the root is fingerprinted and seeded into the
//! [`KnownStateCache`], so files that already exist are not treated as
//! changed on the first event. The watcher is running while this happens;
//! any path an event already recorded wins over the (older) snapshot value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::types::Fingerprint;
use crate::watch::cache::KnownStateCache;
use crate::watch::hash::fingerprint_file;

/// Flat mapping from absolute file path to its current fingerprint.
pub type DirSnapshot = BTreeMap<PathBuf, Fingerprint>;

/// Walk `root` recursively and fingerprint every regular file.
///
/// Files that vanish or cannot be read mid-walk are skipped; they will be
/// picked up by a later change event if they come back. Failing to list the
/// root itself is an error.
pub fn snapshot_tree(fs: &dyn FileSystem, root: &Path) -> Result<DirSnapshot> {
    let mut snapshot = DirSnapshot::new();
    let mut stack = vec![root.to_path_buf()];
    let mut is_root = true;

    while let Some(dir) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if is_root => {
                return Err(err.context(format!("snapshotting {:?}", root)));
            }
            Err(err) => {
                debug!(?dir, error = %err, "skipping unreadable directory");
                continue;
            }
        };
        is_root = false;

        for path in entries {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                match fingerprint_file(fs, &path) {
                    Ok((_, fingerprint)) => {
                        snapshot.insert(path, fingerprint);
                    }
                    Err(err) => debug!(?path, error = %err, "skipping unreadable file"),
                }
            }
        }
    }

    Ok(snapshot)
}

/// Seed `cache` from `snapshot` without touching paths already present.
///
/// Returns how many entries were inserted.
pub fn seed_known_state(cache: &KnownStateCache, snapshot: DirSnapshot) -> usize {
    let total = snapshot.len();
    let mut inserted = 0;
    for (path, fingerprint) in snapshot {
        if cache.seed_if_absent(path, fingerprint) {
            inserted += 1;
        }
    }
    debug!(total, inserted, "seeded known-state cache from snapshot");
    inserted
}

/// Snapshot `root` off the async executor and seed `cache` with the result.
pub async fn load_initial_snapshot(
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    cache: KnownStateCache,
) -> Result<usize> {
    let walk_root = root.clone();
    let snapshot = tokio::task::spawn_blocking(move || snapshot_tree(fs.as_ref(), &walk_root))
        .await
        .context("snapshot task panicked")??;

    let files = snapshot.len();
    let seeded = seed_known_state(&cache, snapshot);
    info!(root = ?root, files, seeded, "initial snapshot loaded");
    Ok(seeded)
}
