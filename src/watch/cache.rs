// src/watch/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::types::Fingerprint;

/// Per-path record of the content this tool last considered settled.
///
/// A path mapped to `F` means fmtwatch itself wrote or observed content with
/// fingerprint `F` at that path. An event whose fresh fingerprint equals the
/// cached one is therefore either a no-change or an echo of our own write.
///
/// The cache is owned by one watch session; clones share the same map. There
/// is no removal: a missing path just means "never seen".
#[derive(Debug, Clone, Default)]
pub struct KnownStateCache {
    known: Arc<Mutex<HashMap<PathBuf, Fingerprint>>>,
}

impl KnownStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Fingerprint> {
        self.lock().get(path).cloned()
    }

    /// Record `fingerprint` as settled for `path`. Last write wins.
    pub fn set(&self, path: impl Into<PathBuf>, fingerprint: Fingerprint) {
        let path = path.into();
        debug!(?path, fingerprint = %fingerprint, "recording settled fingerprint");
        self.lock().insert(path, fingerprint);
    }

    /// True if `fingerprint` is exactly what was last recorded for `path`.
    pub fn has_settled_fingerprint(&self, path: &Path, fingerprint: &Fingerprint) -> bool {
        self.lock().get(path) == Some(fingerprint)
    }

    /// Insert only if nothing is recorded for `path` yet.
    ///
    /// Returns whether the value was inserted.
    pub fn seed_if_absent(&self, path: impl Into<PathBuf>, fingerprint: Fingerprint) -> bool {
        let mut known = self.lock();
        let path = path.into();
        if known.contains_key(&path) {
            return false;
        }
        known.insert(path, fingerprint);
        true
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Fingerprint>> {
        // Every critical section is a single map operation, so a poisoned
        // lock still guards a consistent map.
        self.known.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
