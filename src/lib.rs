// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod format;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_style_options;
use crate::engine::{StdioSink, WatchSession};
use crate::format::CommandFormatter;
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - formatter config discovery (from the working directory)
/// - the external formatter
/// - the watch session (watcher, initial snapshot, per-event pipeline)
/// - Ctrl-C handling
///
/// Runs until the process is interrupted.
pub async fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let root = fs
        .canonicalize(&args.directory)
        .with_context(|| format!("resolving watch directory {:?}", args.directory))?;
    if !fs.is_dir(&root) {
        anyhow::bail!("{:?} is not a directory", root);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let style = load_style_options(fs.as_ref(), &cwd);

    let formatter = CommandFormatter::new(args.formatter.clone());
    info!(
        root = ?root,
        formatter = %formatter.program(),
        settle_delay = ?args.settle_delay(),
        "starting fmtwatch"
    );

    let session = WatchSession::new(
        root,
        fs,
        Arc::new(formatter),
        style,
        Arc::new(StdioSink),
        args.settle_delay(),
    );

    session.watch(shutdown_signal()).await
}

/// Resolves on Ctrl-C. If the signal handler can't be installed, never
/// resolves, so the watcher keeps running until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
