// src/engine/session.rs

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::config::StyleOptions;
use crate::engine::notification::{Notification, NotificationSink};
use crate::engine::pipeline::Pipeline;
use crate::engine::Outcome;
use crate::format::Formatter;
use crate::fs::FileSystem;
use crate::watch::cache::KnownStateCache;
use crate::watch::snapshot::load_initial_snapshot;
use crate::watch::watcher::{spawn_watcher, WatchMessage};

/// One watcher instance over one directory tree.
///
/// The session owns the known-state cache; nothing about it is global, so
/// several sessions can run side by side in one process.
pub struct WatchSession {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    pipeline: Arc<Pipeline>,
    sink: Arc<dyn NotificationSink>,
    snapshot_ready: watch::Sender<bool>,
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("root", &self.root)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl WatchSession {
    /// Build a session with a fresh, empty cache.
    ///
    /// `root` should already be absolute (canonical), since cache keys and
    /// watcher paths are compared verbatim.
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        formatter: Arc<dyn Formatter>,
        style: StyleOptions,
        sink: Arc<dyn NotificationSink>,
        settle_delay: Duration,
    ) -> Self {
        let root = root.into();
        let pipeline = Pipeline::new(
            root.clone(),
            Arc::clone(&fs),
            KnownStateCache::new(),
            formatter,
            Arc::new(style),
            Arc::clone(&sink),
            settle_delay,
        );
        let (snapshot_ready, _) = watch::channel(false);
        Self {
            root,
            fs,
            pipeline: Arc::new(pipeline),
            sink,
            snapshot_ready,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle to the session's known-state cache.
    pub fn cache(&self) -> KnownStateCache {
        self.pipeline.cache().clone()
    }

    /// Flips to `true` once the initial snapshot has been seeded.
    pub fn snapshot_status(&self) -> watch::Receiver<bool> {
        self.snapshot_ready.subscribe()
    }

    /// Watch the root with the OS watcher until `shutdown` resolves.
    ///
    /// The watcher is registered before the snapshot walk starts, so no
    /// change made during the walk is missed.
    pub async fn watch<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let _watcher = spawn_watcher(self.root.clone(), tx)?;
        self.run(rx, shutdown).await
    }

    /// Drive the session from an already-running change source.
    ///
    /// Starts the initial snapshot, then runs every incoming change event as
    /// its own task. When `shutdown` resolves, in-flight tasks are aborted;
    /// when the source closes, they are allowed to finish first.
    pub async fn run<S>(
        self,
        mut events: mpsc::UnboundedReceiver<WatchMessage>,
        shutdown: S,
    ) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let mut snapshot = tokio::spawn(load_initial_snapshot(
            Arc::clone(&self.fs),
            self.root.clone(),
            self.cache(),
        ));
        let mut snapshot_pending = true;
        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        let mut source_closed = false;

        tokio::pin!(shutdown);
        info!(root = ?self.root, "watch session started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                res = &mut snapshot, if snapshot_pending => {
                    snapshot_pending = false;
                    self.snapshot_finished(res);
                }
                msg = events.recv() => match msg {
                    Some(WatchMessage::Changed(event)) => {
                        debug!(path = ?event.path, "change event");
                        let pipeline = Arc::clone(&self.pipeline);
                        tasks.spawn(async move { pipeline.process(event).await });
                    }
                    Some(WatchMessage::Failed(message)) => self.report(message),
                    None => {
                        info!("change source closed; finishing in-flight events");
                        source_closed = true;
                        break;
                    }
                },
                Some(res) = tasks.join_next() => self.task_finished(res),
            }
        }

        if source_closed {
            if snapshot_pending {
                let res = snapshot.await;
                self.snapshot_finished(res);
            }
            while let Some(res) = tasks.join_next().await {
                self.task_finished(res);
            }
        } else {
            snapshot.abort();
            tasks.shutdown().await;
        }

        info!("watch session stopped");
        Ok(())
    }

    fn snapshot_finished(&self, res: Result<Result<usize>, JoinError>) {
        match res {
            Ok(Ok(_)) => {
                self.snapshot_ready.send_replace(true);
            }
            Ok(Err(err)) => self.report(format!("initial snapshot failed: {err:#}")),
            Err(err) => self.report(format!("initial snapshot task failed: {err}")),
        }
    }

    fn task_finished(&self, res: Result<Outcome, JoinError>) {
        match res {
            Ok(outcome) => debug!(?outcome, "change event finished"),
            Err(err) if err.is_panic() => {
                self.report(format!("formatting task panicked: {err}"));
            }
            Err(err) => debug!(error = %err, "formatting task cancelled"),
        }
    }

    fn report(&self, message: String) {
        error!("{message}");
        self.sink.notify(Notification::Error { message });
    }
}
