use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fmtwatch::config::StyleOptions;
use fmtwatch::engine::{MemorySink, Pipeline, WatchSession};
use fmtwatch::fs::mock::MockFileSystem;
use fmtwatch::format::Formatter;
use fmtwatch::watch::KnownStateCache;

/// Builder for an in-memory project tree rooted at an absolute path.
pub struct MockProjectBuilder {
    root: PathBuf,
    fs: MockFileSystem,
}

impl MockProjectBuilder {
    pub fn new(root: &str) -> Self {
        let fs = MockFileSystem::new();
        fs.add_dir(root);
        Self {
            root: PathBuf::from(root),
            fs,
        }
    }

    /// Add a file at `rel` (relative to the root).
    pub fn file(self, rel: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.fs.add_file(self.root.join(rel), contents);
        self
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone()
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

/// Builder for a `Pipeline` or `WatchSession` over a mock filesystem.
pub struct PipelineBuilder {
    root: PathBuf,
    fs: MockFileSystem,
    formatter: Arc<dyn Formatter>,
    cache: KnownStateCache,
    sink: MemorySink,
    settle_delay: Duration,
}

impl PipelineBuilder {
    pub fn new(root: impl Into<PathBuf>, fs: MockFileSystem, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            root: root.into(),
            fs,
            formatter,
            cache: KnownStateCache::new(),
            sink: MemorySink::new(),
            settle_delay: Duration::from_millis(300),
        }
    }

    pub fn cache(mut self, cache: KnownStateCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn sink(&self) -> MemorySink {
        self.sink.clone()
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(
            self.root,
            Arc::new(self.fs),
            self.cache,
            self.formatter,
            Arc::new(StyleOptions::defaults()),
            Arc::new(self.sink),
            self.settle_delay,
        )
    }

    /// Build a session instead; the session creates its own cache.
    pub fn build_session(self) -> WatchSession {
        WatchSession::new(
            self.root,
            Arc::new(self.fs),
            self.formatter,
            StyleOptions::defaults(),
            Arc::new(self.sink),
            self.settle_delay,
        )
    }
}
