// src/format/mod.rs

//! Pluggable formatter abstraction.
//!
//! The pipeline talks to a `Formatter` instead of spawning processes itself.
//! Production uses [`CommandFormatter`], which pipes the text through an
//! external prettier-compatible executable; tests provide an in-process fake.

use std::future::Future;
use std::pin::Pin;

use crate::config::StyleOptions;
use crate::errors::Result;

pub mod command;

pub use command::CommandFormatter;

/// Pure text -> text transformation for one language.
pub trait Formatter: Send + Sync {
    /// Format `text` with the given parser identifier and style options.
    ///
    /// Malformed input is reported as an error; the caller leaves the file
    /// untouched in that case.
    fn format<'a>(
        &'a self,
        text: String,
        parser: &'a str,
        style: &'a StyleOptions,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
