// src/engine/mod.rs

//! Formatting engine for fmtwatch.
//!
//! This module ties together:
//! - the per-event decision pipeline ([`pipeline`]): read, fingerprint, check
//!   the known-state cache, format, settle, re-check, commit
//! - the watch session ([`session`]) that owns the cache, starts the watcher
//!   before the initial snapshot and runs one task per change event
//! - notifications ([`notification`]) for committed writes and errors

use crate::types::Fingerprint;

/// Terminal state reached by one change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file could not be read (deleted, permissions, transient I/O).
    ReadFailed,
    /// No formatter parser is mapped to the file's extension.
    ParserUnknown,
    /// The content matches what was last settled: no change, or our own echo.
    Skipped,
    /// The formatter rejected the input (or the input was not UTF-8).
    FormatFailed,
    /// Formatting produced identical bytes; nothing to write.
    Unchanged,
    /// The file changed on disk while we were formatting; write abandoned.
    Aborted,
    /// Writing the formatted text failed.
    WriteFailed,
    /// The formatted text was written and recorded as settled.
    Committed(Fingerprint),
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }
}

/// Everything computed for one event between formatting and commit.
#[derive(Debug, Clone)]
pub struct FormattingDecision {
    pub original: Fingerprint,
    pub parser: &'static str,
    pub formatted: String,
    pub formatted_fingerprint: Fingerprint,
    /// Set after the settle delay once the file is confirmed untouched.
    pub safe_to_commit: bool,
}

pub mod notification;
pub mod pipeline;
pub mod session;

pub use notification::{ChannelSink, MemorySink, Notification, NotificationSink, StdioSink};
pub use pipeline::Pipeline;
pub use session::WatchSession;
