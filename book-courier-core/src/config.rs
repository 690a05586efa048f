use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

pub const DEFAULT_INBOX_DIR: &str = "/storage/emulated/0/books";
pub const DEFAULT_ARCHIVE_DIR: &str = "/storage/emulated/0/published_books";
pub const DEFAULT_LEDGER_PATH: &str = "/storage/emulated/0/published_books.txt";
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(3600);
pub const DEFAULT_BACKOFF_INTERVAL: Duration = Duration::from_secs(300);

/// Scheduler configuration. Built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierConfig {
    /// Directory holding files waiting to be published.
    pub inbox_dir: PathBuf,
    /// Directory published files are moved into.
    pub archive_dir: PathBuf,
    /// Append-only file of published identities.
    pub ledger_path: PathBuf,
    /// Pause after each successful send.
    pub send_delay: Duration,
    /// Wait between two cycles.
    pub idle_interval: Duration,
    /// Wait after a cycle failed outright.
    pub backoff_interval: Duration,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            inbox_dir: PathBuf::from(DEFAULT_INBOX_DIR),
            archive_dir: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            send_delay: DEFAULT_SEND_DELAY,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            backoff_interval: DEFAULT_BACKOFF_INTERVAL,
        }
    }
}

impl CourierConfig {
    pub fn trace_loaded(&self) {
        info!(
            inbox_dir = %self.inbox_dir.display(),
            archive_dir = %self.archive_dir.display(),
            ledger_path = %self.ledger_path.display(),
            send_delay_secs = self.send_delay.as_secs(),
            "Loaded CourierConfig"
        );
        debug!(?self, "CourierConfig loaded (full debug)");
    }
}
