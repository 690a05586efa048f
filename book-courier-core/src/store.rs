//! Inbox and archive directories.
//!
//! The inbox holds files waiting to be published; the archive holds files
//! that were sent. The only mutation is a rename from one to the other.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FileStore {
    inbox: PathBuf,
    archive: PathBuf,
}

impl FileStore {
    pub fn new(inbox: impl Into<PathBuf>, archive: impl Into<PathBuf>) -> Self {
        Self {
            inbox: inbox.into(),
            archive: archive.into(),
        }
    }

    pub fn inbox(&self) -> &Path {
        &self.inbox
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive
    }

    /// Create both directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.inbox)?;
        fs::create_dir_all(&self.archive)?;
        Ok(())
    }

    pub fn inbox_path(&self, filename: &str) -> PathBuf {
        self.inbox.join(filename)
    }

    /// Sorted names of the regular, non-hidden files in the inbox.
    pub fn list_pending(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.inbox)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(entry = ?entry.path(), "Skipping inbox entry with non UTF-8 name");
                continue;
            };
            if is_pending_file(&entry.path(), &name) {
                names.push(name);
            }
        }
        names.sort();
        debug!(inbox = %self.inbox.display(), count = names.len(), "Listed pending files");
        Ok(names)
    }

    /// Move `filename` from the inbox to the archive with a single rename.
    /// Returns the archived path.
    pub fn archive(&self, filename: &str) -> io::Result<PathBuf> {
        let from = self.inbox_path(filename);
        let to = self.archive.join(filename);
        fs::rename(&from, &to)?;
        debug!(from = %from.display(), to = %to.display(), "File archived");
        Ok(to)
    }
}

/// A publishable inbox entry: a regular file (symlinks are followed) whose
/// name does not start with a dot.
pub fn is_pending_file(path: &Path, filename: &str) -> bool {
    !filename.starts_with('.') && path.is_file()
}
