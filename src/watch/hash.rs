// src/watch/hash.rs

//! Content fingerprints.
//!
//! Every equality decision in the pipeline goes through these helpers, so the
//! snapshot loader and the formatting pipeline always agree on what a given
//! byte sequence hashes to.

use std::path::Path;

use anyhow::Result;
use blake3::Hasher;
use tracing::trace;

use crate::fs::FileSystem;
use crate::types::Fingerprint;

/// Fingerprint an in-memory byte sequence.
pub fn fingerprint_bytes(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    Fingerprint::from_hex(hasher.finalize().to_hex().to_string())
}

/// Read a file through `fs` and fingerprint its current bytes.
///
/// Returns the bytes too, since callers that need the hash of a file usually
/// need its contents next.
pub fn fingerprint_file(fs: &dyn FileSystem, path: &Path) -> Result<(Vec<u8>, Fingerprint)> {
    let bytes = fs.read(path)?;
    let fingerprint = fingerprint_bytes(&bytes);
    trace!(?path, fingerprint = %fingerprint, "fingerprinted file");
    Ok((bytes, fingerprint))
}
