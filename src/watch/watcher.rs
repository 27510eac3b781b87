// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, trace};

use crate::types::ChangeEvent;

/// What the change source delivers into a watch session.
#[derive(Debug, Clone)]
pub enum WatchMessage {
    /// A path was created or modified.
    Changed(ChangeEvent),
    /// The underlying watcher reported an error.
    Failed(String),
}

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Start watching `root` recursively, forwarding each changed path into `tx`.
///
/// When this returns `Ok`, the OS watch is registered: any change from this
/// point on produces a message. Callers rely on this to start the watcher
/// before taking the initial snapshot.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    tx: mpsc::UnboundedSender<WatchMessage>,
) -> Result<WatcherHandle> {
    let root = root.into();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let messages: Vec<WatchMessage> = match res {
                Ok(event) => {
                    trace!(?event, "received notify event");
                    if !is_content_change(&event.kind) {
                        return;
                    }
                    event
                        .paths
                        .into_iter()
                        .map(|path| WatchMessage::Changed(ChangeEvent::new(path)))
                        .collect()
                }
                Err(err) => vec![WatchMessage::Failed(format!("file watch error: {err}"))],
            };
            for message in messages {
                // A closed receiver means the session is shutting down.
                if tx.send(message).is_err() {
                    return;
                }
            }
        },
        Config::default(),
    )?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", root))?;

    info!("file watcher started on {:?}", root);

    Ok(WatcherHandle { _inner: watcher })
}

/// Only creations and modifications can produce new content worth formatting.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};

    #[test]
    fn only_creates_and_modifies_count() {
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(!is_content_change(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
    }
}
