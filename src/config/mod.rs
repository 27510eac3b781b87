// src/config/mod.rs

//! Formatter style configuration.
//!
//! Responsibilities:
//! - Define the merged options object and the candidate file table (`model.rs`).
//! - Discover the nearest config file and parse it (`loader.rs`).

pub mod loader;
pub mod model;

pub use loader::{discover_config, load_style_options};
pub use model::{ConfigSource, DiscoveredConfig, StyleOptions, CONFIG_CANDIDATES};
