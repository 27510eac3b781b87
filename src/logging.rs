// src/logging.rs

//! Logging setup for `fmtwatch` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (applies to every target),
//! 2. `FMTWATCH_LOG`, read as an `EnvFilter` directive string such as
//!    `debug` or `fmtwatch::engine=trace,notify=warn`,
//! 3. [`DEFAULT_DIRECTIVES`].
//!
//! Output goes to stderr; stdout only carries `formatted <path> <hash>` lines.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "FMTWATCH_LOG";

/// Our own events at info, the watcher backend only when it complains.
pub const DEFAULT_DIRECTIVES: &str = "info,notify=warn";

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let (filter, rejected) = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    if let Some(bad) = rejected {
        tracing::warn!(value = %bad, "ignoring invalid {LOG_ENV_VAR}; using defaults");
    }
    Ok(())
}

/// Pick the filter. The second value is an env directive that failed to parse.
fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(level) = cli_level {
        return (EnvFilter::new(level_directive(level)), None);
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(_) => (
                EnvFilter::new(DEFAULT_DIRECTIVES),
                Some(directives.to_string()),
            ),
        },
        None => (EnvFilter::new(DEFAULT_DIRECTIVES), None),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
