//! Supervisor loop: runs scan cycles forever, one at a time.
//!
//! ```text
//!   Running ──ok──▶ Idle (idle_interval) ──▶ Running
//!      │
//!      └──err──▶ Backoff (backoff_interval) ──▶ Running
//! ```
//!
//! The first cycle starts immediately. A [`StopHandle`] ends the loop: it is
//! checked between cycles and cuts short an idle or backoff wait, but never
//! interrupts a cycle in progress.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::config::CourierConfig;
use crate::contract::{CaptionGenerator, Channel};
use crate::cycle::ScanCycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Backoff,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Running => "running",
            SupervisorState::Backoff => "backoff",
        };
        f.write_str(name)
    }
}

/// Cooperative stop signal shared between the supervisor and whoever wants it gone.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopSignal>,
}

#[derive(Debug, Default)]
struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        // Stores a permit if nobody is waiting yet, so a stop requested mid-cycle
        // still ends the following wait.
        self.inner.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    async fn stopped(&self) {
        self.inner.notify.notified().await;
    }
}

/// Totals accumulated over the supervisor's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorStats {
    /// Cycles that completed.
    pub cycles: u64,
    /// Cycles that failed and triggered a backoff.
    pub failures: u64,
    /// Files published across all cycles.
    pub published: u64,
}

pub struct Supervisor<C, G> {
    cycle: ScanCycle<C, G>,
    idle_interval: Duration,
    backoff_interval: Duration,
    stop: StopHandle,
}

impl<C, G> Supervisor<C, G>
where
    C: Channel,
    G: CaptionGenerator,
{
    pub fn new(config: &CourierConfig, cycle: ScanCycle<C, G>) -> Self {
        Self {
            cycle,
            idle_interval: config.idle_interval,
            backoff_interval: config.backoff_interval,
            stop: StopHandle::new(),
        }
    }

    /// Handle that stops [`Supervisor::run`].
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn cycle(&self) -> &ScanCycle<C, G> {
        &self.cycle
    }

    /// Loop until stopped. Cycle failures are logged and followed by a backoff;
    /// they never end the loop.
    pub async fn run(&self) -> SupervisorStats {
        info!(
            idle_secs = self.idle_interval.as_secs(),
            backoff_secs = self.backoff_interval.as_secs(),
            "Supervisor started, watching inbox"
        );
        let mut stats = SupervisorStats::default();

        while !self.stop.is_stopped() {
            debug!(state = %SupervisorState::Running, "Supervisor state");
            let (next, wait) = match self.cycle.run_cycle().await {
                Ok(report) => {
                    stats.cycles += 1;
                    let count = report.published_count();
                    stats.published += count as u64;
                    if count > 0 {
                        info!(count, "New books published");
                    }
                    (SupervisorState::Idle, self.idle_interval)
                }
                Err(e) => {
                    stats.failures += 1;
                    error!(error = %e, "Unexpected cycle failure, backing off");
                    (SupervisorState::Backoff, self.backoff_interval)
                }
            };

            if !self.wait(next, wait).await {
                break;
            }
        }

        info!(
            cycles = stats.cycles,
            failures = stats.failures,
            published = stats.published,
            "Supervisor stopped"
        );
        stats
    }

    /// Sleep in `state` for `duration`. Returns false when woken by a stop.
    async fn wait(&self, state: SupervisorState, duration: Duration) -> bool {
        debug!(state = %state, secs = duration.as_secs(), "Supervisor state");
        tokio::select! {
            _ = self.stop.stopped() => false,
            _ = tokio::time::sleep(duration) => !self.stop.is_stopped(),
        }
    }
}
