//! Durable, append-only record of published book identities.
//!
//! The ledger is a UTF-8 text file holding one identity per line. It is only
//! ever appended to: there is no removal, truncation or rewrite. A missing
//! file is an empty ledger.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::identity::BookIdentity;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to ledger {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// In-memory view of every identity published so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedSet {
    identities: HashSet<BookIdentity>,
}

impl PublishedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &BookIdentity) -> bool {
        self.identities.contains(identity)
    }

    /// Track an identity published during the current cycle. Does not touch disk.
    pub fn insert(&mut self, identity: BookIdentity) -> bool {
        self.identities.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl FromIterator<BookIdentity> for PublishedSet {
    fn from_iter<I: IntoIterator<Item = BookIdentity>>(iter: I) -> Self {
        Self {
            identities: iter.into_iter().collect(),
        }
    }
}

/// Handle on the ledger file.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded identity. Blank lines are ignored and surrounding
    /// whitespace is trimmed.
    pub fn load(&self) -> Result<PublishedSet, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(ledger = %self.path.display(), "Ledger file absent, starting empty");
                return Ok(PublishedSet::new());
            }
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let set: PublishedSet = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(BookIdentity::new)
            .collect();
        debug!(ledger = %self.path.display(), count = set.len(), "Ledger loaded");
        Ok(set)
    }

    /// Append `identity` as a new line.
    ///
    /// Only call this once the file has been moved to the archive.
    pub fn record(&self, identity: &BookIdentity) -> Result<(), LedgerError> {
        let append_err = |source| LedgerError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        file.write_all(format!("{identity}\n").as_bytes())
            .map_err(append_err)?;
        debug!(ledger = %self.path.display(), identity = %identity, "Identity recorded");
        Ok(())
    }
}
