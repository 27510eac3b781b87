// src/types.rs

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::time::Instant;

/// Hex-encoded content digest used to decide whether two byte sequences are
/// the same without comparing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Offset of the slice shown to users in `settled` notifications.
    const SHORT_OFFSET: usize = 16;
    const SHORT_LEN: usize = 8;

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Fingerprint(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Eight hex characters taken from the middle of the digest.
    ///
    /// Falls back to the leading characters for digests too short to have a
    /// middle slice.
    pub fn short(&self) -> &str {
        let end = Self::SHORT_OFFSET + Self::SHORT_LEN;
        if self.0.len() >= end && self.0.is_char_boundary(Self::SHORT_OFFSET) {
            &self.0[Self::SHORT_OFFSET..end]
        } else {
            let end = self.0.len().min(Self::SHORT_LEN);
            &self.0[..end]
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single "this path changed" notification from the change source.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub received_at: Instant,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            received_at: Instant::now(),
        }
    }
}

/// Static extension -> formatter parser table.
const PARSERS: &[(&str, &str)] = &[
    ("html", "vue"),
    ("css", "css"),
    ("js", "babel"),
    ("ts", "babel-ts"),
    ("json", "json"),
    ("md", "markdown"),
];

/// Look up the formatter parser for a file, based on its extension.
///
/// Returns `None` for extensions the formatter should never see (binary
/// files, unknown languages, no extension at all).
pub fn parser_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    PARSERS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, parser)| *parser)
}
