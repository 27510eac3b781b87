// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Default pause between formatting a file and committing the write.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 300;

/// Command-line arguments for `fmtwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fmtwatch",
    version,
    about = "Watch a directory and reformat changed source files in place.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to watch (recursively).
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// How long to wait after formatting before re-checking the file and
    /// writing it back.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// Formatter executable to invoke (must accept prettier-style flags).
    #[arg(long, value_name = "PROGRAM", default_value = "prettier")]
    pub formatter: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FMTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
