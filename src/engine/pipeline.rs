// src/engine/pipeline.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::StyleOptions;
use crate::engine::notification::{Notification, NotificationSink};
use crate::engine::{FormattingDecision, Outcome};
use crate::format::Formatter;
use crate::fs::FileSystem;
use crate::types::{parser_for_path, ChangeEvent, Fingerprint};
use crate::watch::cache::KnownStateCache;
use crate::watch::hash::{fingerprint_bytes, fingerprint_file};
use crate::watch::path_utils::display_relative;

/// Decides, for each change event, whether to skip, format, write or discard.
///
/// Per event:
/// 1. read the file and fingerprint it (read failure: drop the event)
/// 2. look up the parser for its extension (none: drop)
/// 3. compare with the known-state cache (equal: our own echo or no change)
/// 4. format; a formatter error leaves the file alone
/// 5. formatted bytes identical to the input: nothing to do
/// 6. wait the settle delay, re-read and re-fingerprint; if the file moved
///    on, someone else is editing it and we back off
/// 7. write, record the formatted fingerprint, notify
///
/// Events for the same path are not serialised; step 6 is what keeps a
/// stale event from clobbering newer content.
pub struct Pipeline {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    cache: KnownStateCache,
    formatter: Arc<dyn Formatter>,
    style: Arc<StyleOptions>,
    sink: Arc<dyn NotificationSink>,
    settle_delay: Duration,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.root)
            .field("settle_delay", &self.settle_delay)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        cache: KnownStateCache,
        formatter: Arc<dyn Formatter>,
        style: Arc<StyleOptions>,
        sink: Arc<dyn NotificationSink>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            root: root.into(),
            fs,
            cache,
            formatter,
            style,
            sink,
            settle_delay,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &KnownStateCache {
        &self.cache
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Run one change event through to a terminal [`Outcome`].
    ///
    /// Never fails: every error is a local discard.
    pub async fn process(&self, event: ChangeEvent) -> Outcome {
        let path = event.path;

        let (bytes, original) = match self.read_fingerprint(&path).await {
            Ok(read) => read,
            Err(err) => {
                debug!(?path, error = %err, "read failed; dropping event");
                return Outcome::ReadFailed;
            }
        };

        let Some(parser) = parser_for_path(&path) else {
            debug!(?path, "no parser for extension; ignoring");
            return Outcome::ParserUnknown;
        };

        if self.cache.has_settled_fingerprint(&path, &original) {
            debug!(?path, fingerprint = %original, "content already settled; skipping");
            return Outcome::Skipped;
        }

        let Some(mut decision) = self.format(&path, bytes, original, parser).await else {
            return Outcome::FormatFailed;
        };

        if decision.formatted_fingerprint == decision.original {
            debug!(?path, "already formatted; nothing to write");
            return Outcome::Unchanged;
        }

        tokio::time::sleep(self.settle_delay).await;

        decision.safe_to_commit = match self.read_fingerprint(&path).await {
            Ok((_, live)) => live == decision.original,
            Err(err) => {
                debug!(?path, error = %err, "re-read after settle delay failed");
                false
            }
        };
        if !decision.safe_to_commit {
            info!(?path, "file changed while formatting; leaving it alone");
            return Outcome::Aborted;
        }

        self.commit(path, decision).await
    }

    async fn format(
        &self,
        path: &Path,
        bytes: Vec<u8>,
        original: Fingerprint,
        parser: &'static str,
    ) -> Option<FormattingDecision> {
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                debug!(?path, "file is not valid UTF-8; not formatting");
                return None;
            }
        };

        let started = tokio::time::Instant::now();
        let formatted = match self.formatter.format(text, parser, &self.style).await {
            Ok(formatted) => formatted,
            Err(err) => {
                debug!(?path, parser, error = %err, "formatter failed; file left untouched");
                return None;
            }
        };
        debug!(?path, parser, elapsed = ?started.elapsed(), "formatted");

        let formatted_fingerprint = fingerprint_bytes(formatted.as_bytes());
        Some(FormattingDecision {
            original,
            parser,
            formatted,
            formatted_fingerprint,
            safe_to_commit: false,
        })
    }

    async fn commit(&self, path: PathBuf, decision: FormattingDecision) -> Outcome {
        let fs = Arc::clone(&self.fs);
        let write_path = path.clone();
        let FormattingDecision {
            formatted,
            formatted_fingerprint,
            ..
        } = decision;

        let written = tokio::task::spawn_blocking(move || fs.write(&write_path, formatted.as_bytes()))
            .await
            .context("write task panicked")
            .and_then(|res| res);
        if let Err(err) = written {
            warn!(?path, error = %err, "writing formatted file failed");
            return Outcome::WriteFailed;
        }

        self.cache.set(path.clone(), formatted_fingerprint.clone());

        let relative_path = display_relative(&self.root, &path);
        info!(path = %relative_path, fingerprint = %formatted_fingerprint, "formatted file written");
        self.sink.notify(Notification::Settled {
            relative_path,
            short_fingerprint: formatted_fingerprint.short().to_string(),
        });

        Outcome::Committed(formatted_fingerprint)
    }

    async fn read_fingerprint(&self, path: &Path) -> Result<(Vec<u8>, Fingerprint)> {
        let fs = Arc::clone(&self.fs);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || fingerprint_file(fs.as_ref(), &path))
            .await
            .context("read task panicked")?
    }
}
