//! Cooperative interval scheduler for the reconcile pass.
//!
//! # Responsibility
//! - Decide when a cleanup pass is due on the single thread of control.
//! - Expose an explicit start/stop lifecycle with an owning handle.
//!
//! # Invariants
//! - `poll` fires at most once per elapsed interval and never re-enters.
//! - A stopped scheduler never fires until started again.
//! - Starting fires the first pass immediately (the wall cleans on init).

use chrono::{DateTime, Duration, Utc};

/// Wall-clock seconds between cleanup passes.
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 60;

/// Owner-driven interval timer.
///
/// The owner calls `poll` from its event loop; there is no background
/// thread to leak or tear down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileScheduler {
    interval: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl ReconcileScheduler {
    /// Creates a stopped scheduler.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn with_interval_secs(secs: u64) -> Self {
        Self::new(Duration::seconds(secs as i64))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arms the scheduler; the first `poll` at or after `now` fires.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due = Some(now);
    }

    /// Disarms the scheduler. Idempotent.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns true when a pass is due, advancing the deadline.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
