// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Fingerprinting file contents (`hash`).
//! - The per-session known-state cache that recognises our own writes (`cache`).
//! - Seeding that cache from an initial walk of the tree (`snapshot`).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** format anything; it only turns filesystem state into
//! fingerprints and change events.

pub mod cache;
pub mod hash;
pub mod path_utils;
pub mod snapshot;
pub mod watcher;

pub use cache::KnownStateCache;
pub use hash::{fingerprint_bytes, fingerprint_file};
pub use snapshot::{load_initial_snapshot, seed_known_state, snapshot_tree, DirSnapshot};
pub use watcher::{spawn_watcher, WatchMessage, WatcherHandle};
