// src/engine/notification.rs

//! User-facing notifications produced by a watch session.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::warn;

/// Messages emitted to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A formatted file was written back.
    Settled {
        relative_path: String,
        short_fingerprint: String,
    },
    /// Something failed outside the per-event recovery paths.
    Error { message: String },
}

/// Destination for notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Default sink: `settled` lines to stdout, errors to stderr.
#[derive(Debug, Clone, Default)]
pub struct StdioSink;

impl NotificationSink for StdioSink {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Settled {
                relative_path,
                short_fingerprint,
            } => println!("formatted {relative_path} {short_fingerprint}"),
            Notification::Error { message } => eprintln!("fmtwatch error: {message}"),
        }
    }
}

/// Sink that forwards every notification into a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("notification receiver dropped");
        }
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}
