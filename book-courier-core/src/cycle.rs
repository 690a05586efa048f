//! One scan-and-publish pass over the inbox.
//!
//! The cycle is the only place that decides what gets sent:
//!   - the ledger is loaded once, at the start of the pass
//!   - inbox files are visited in sorted filename order, one at a time
//!   - a file whose identity is already known (from the ledger, or published
//!     earlier in this same pass) is skipped without sending and without delay
//!   - a file whose identity spans several lines is never sent, since the
//!     ledger could not record it
//!   - every other file is handed to the [`Publisher`]; a success is followed
//!     by the pacing delay, a failure moves straight on to the next file
//!
//! Failures of individual files are absorbed here. Only failures that prevent
//! the pass itself (unreadable ledger, unreadable inbox) escape as [`CycleError`].

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CourierConfig;
use crate::contract::{CaptionGenerator, Channel};
use crate::identity::{identity, BookIdentity};
use crate::ledger::{Ledger, LedgerError};
use crate::publisher::{PublishFailure, Publisher};
use crate::store::{is_pending_file, FileStore};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("failed to list inbox {path}: {source}")]
    Inbox {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a single pass did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CycleReport {
    /// Filenames published in this pass, in order.
    pub published: Vec<String>,
    /// Files skipped because their identity was already published.
    pub skipped: Vec<SkippedFile>,
    /// Files whose publish attempt failed; they stay in the inbox.
    pub failed: Vec<FailedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub identity: BookIdentity,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub filename: String,
    pub reason: String,
}

impl CycleReport {
    /// Number of files newly published in this pass.
    pub fn published_count(&self) -> usize {
        self.published.len()
    }
}

pub struct ScanCycle<C, G> {
    store: FileStore,
    ledger: Ledger,
    publisher: Publisher<C, G>,
    send_delay: Duration,
}

impl<C, G> ScanCycle<C, G>
where
    C: Channel,
    G: CaptionGenerator,
{
    pub fn new(config: &CourierConfig, channel: C, captions: G) -> Self {
        let store = FileStore::new(&config.inbox_dir, &config.archive_dir);
        let ledger = Ledger::new(&config.ledger_path);
        let publisher = Publisher::new(channel, captions, store.clone(), ledger.clone());
        Self {
            store,
            ledger,
            publisher,
            send_delay: config.send_delay,
        }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn publisher(&self) -> &Publisher<C, G> {
        &self.publisher
    }

    /// Run one full pass and report what happened.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        info!(inbox = %self.store.inbox().display(), "[CYCLE] Starting scan");

        let mut published = self.ledger.load()?;
        let pending = self.store.list_pending().map_err(|source| CycleError::Inbox {
            path: self.store.inbox().to_path_buf(),
            source,
        })?;
        debug!(
            pending = pending.len(),
            known = published.len(),
            "[CYCLE] Inbox listed"
        );

        let mut report = CycleReport::default();
        for filename in pending {
            let path = self.store.inbox_path(&filename);
            if !is_pending_file(&path, &filename) {
                debug!(filename = %filename, "[CYCLE] Entry no longer publishable, skipping");
                continue;
            }

            let book = identity(&filename);
            if !book.is_single_line() {
                warn!(filename = ?filename, "[CYCLE] Identity contains a line break, skipping");
                report.failed.push(FailedFile {
                    filename,
                    reason: "identity contains a line break".to_string(),
                });
                continue;
            }
            if published.contains(&book) {
                info!(filename = %filename, identity = %book, "[CYCLE] Book already published");
                report.skipped.push(SkippedFile {
                    filename,
                    identity: book,
                });
                continue;
            }

            match self.publisher.publish(&path, &filename).await {
                Ok(book) => {
                    published.insert(book);
                    report.published.push(filename);
                    if !self.send_delay.is_zero() {
                        tokio::time::sleep(self.send_delay).await;
                    }
                }
                Err(e) => {
                    // The channel already accepted the post.
                    if matches!(e, PublishFailure::RecordFailed { .. }) {
                        published.insert(book);
                    }
                    report.failed.push(FailedFile {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            published = report.published.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "[CYCLE] Scan complete"
        );
        Ok(report)
    }
}
