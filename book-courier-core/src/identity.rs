//! Logical book identity derived from a raw filename.
//!
//! Inbox files follow the naming convention `"<title> - <publisher>.<ext>"`.
//! The title segment is the deduplication key: two editions of the same book
//! from different publishers map to the same identity and are published once.

use serde::Serialize;
use std::fmt;

/// Separator between the title and publisher segments of a filename.
pub const DELIMITER: &str = " - ";

/// Label used when a filename carries no publisher segment.
pub const UNKNOWN_PUBLISHER: &str = "ناشر غير معروف";

/// The deduplication key for one logical book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookIdentity(String);

impl BookIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identity can be stored as a single ledger line.
    pub fn is_single_line(&self) -> bool {
        !self.0.contains(['\n', '\r'])
    }
}

impl fmt::Display for BookIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BookIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the logical identity of `filename`.
///
/// Returns the trimmed text before the first [`DELIMITER`]. Falls back to the
/// whole filename, untouched, when there is no delimiter or the title segment
/// is blank. A blank title never becomes the empty identity, which the ledger
/// could not store as a line.
pub fn identity(filename: &str) -> BookIdentity {
    match filename.split_once(DELIMITER) {
        Some((title, _)) if !title.trim().is_empty() => BookIdentity::new(title.trim()),
        _ => BookIdentity::new(filename),
    }
}

/// Derive the publisher label of `filename`: the second segment, cut at its
/// first `.` (which drops the extension).
pub fn publisher_label(filename: &str) -> String {
    let Some((_, rest)) = filename.split_once(DELIMITER) else {
        return UNKNOWN_PUBLISHER.to_string();
    };
    let segment = rest.split(DELIMITER).next().unwrap_or(rest);
    let label = segment.split('.').next().unwrap_or(segment).trim();
    if label.is_empty() {
        UNKNOWN_PUBLISHER.to_string()
    } else {
        label.to_string()
    }
}
