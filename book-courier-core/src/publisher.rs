//! Publishes a single inbox file: send, archive, record.
//!
//! The order of the state transition is fixed:
//!   1. send the file through the [`Channel`]
//!   2. move it to the archive
//!   3. append its identity to the ledger
//!
//! Any failure stops the sequence where it is and nothing is rolled back. A
//! failure before step 2 leaves the file in the inbox, so the next cycle
//! retries it. If the process dies between steps 2 and 3 the file is archived
//! but never recorded; it is no longer in the inbox and will not be retried.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{error, info};

use crate::contract::{CaptionGenerator, Channel, ChannelError, MediaKind, OutgoingPost};
use crate::identity::{identity, publisher_label, BookIdentity};
use crate::ledger::{Ledger, LedgerError};
use crate::store::FileStore;

/// Why a single publish attempt failed. In every case the cycle moves on.
#[derive(Debug, Error)]
pub enum PublishFailure {
    #[error("failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("channel send failed for {filename}: {source}")]
    SendFailed {
        filename: String,
        #[source]
        source: ChannelError,
    },

    #[error("failed to archive {filename}: {source}")]
    MoveFailed {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("archived {filename} but failed to record it: {source}")]
    RecordFailed {
        filename: String,
        #[source]
        source: LedgerError,
    },
}

pub struct Publisher<C, G> {
    channel: C,
    captions: G,
    store: FileStore,
    ledger: Ledger,
}

impl<C, G> Publisher<C, G>
where
    C: Channel,
    G: CaptionGenerator,
{
    pub fn new(channel: C, captions: G, store: FileStore, ledger: Ledger) -> Self {
        Self {
            channel,
            captions,
            store,
            ledger,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Publish `filename`, read from `file_path`, dated today.
    pub async fn publish(
        &self,
        file_path: &Path,
        filename: &str,
    ) -> Result<BookIdentity, PublishFailure> {
        self.publish_on(file_path, filename, Local::now().date_naive())
            .await
    }

    /// Publish with an explicit caption date.
    pub async fn publish_on(
        &self,
        file_path: &Path,
        filename: &str,
        date: NaiveDate,
    ) -> Result<BookIdentity, PublishFailure> {
        let result = self.try_publish(file_path, filename, date).await;
        match &result {
            Ok(book) => info!(filename, identity = %book, "Book published"),
            Err(e) => error!(filename, error = %e, "Failed to publish book"),
        }
        result
    }

    async fn try_publish(
        &self,
        file_path: &Path,
        filename: &str,
        date: NaiveDate,
    ) -> Result<BookIdentity, PublishFailure> {
        let book = identity(filename);
        let publisher = publisher_label(filename);
        let caption = self.captions.caption(&book, &publisher, date);

        let bytes = std::fs::read(file_path).map_err(|source| PublishFailure::OpenFailed {
            path: file_path.to_path_buf(),
            source,
        })?;

        let post = OutgoingPost {
            kind: MediaKind::from_filename(filename),
            filename: filename.to_string(),
            bytes,
            caption,
        };
        self.channel
            .send(post)
            .await
            .map_err(|source| PublishFailure::SendFailed {
                filename: filename.to_string(),
                source,
            })?;

        self.store
            .archive(filename)
            .map_err(|source| PublishFailure::MoveFailed {
                filename: filename.to_string(),
                source,
            })?;

        self.ledger
            .record(&book)
            .map_err(|source| PublishFailure::RecordFailed {
                filename: filename.to_string(),
                source,
            })?;

        Ok(book)
    }
}
