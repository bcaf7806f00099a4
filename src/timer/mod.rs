//! Discard timers.
//!
//! The controller arms one timer per dispatched transaction and cancels it
//! when the transaction acquires its route. Hosts pick the clock:
//! [`ManualScheduler`] for hosts that drive their own event loop (and for
//! tests), `TokioScheduler` for tokio applications.

mod manual;
#[cfg(feature = "tokio")]
mod tokio_scheduler;

pub use manual::ManualScheduler;
#[cfg(feature = "tokio")]
pub use tokio_scheduler::TokioScheduler;

use std::time::Duration;

/// Deferred callback run when a timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle identifying an armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Schedules cancelable, one-shot tasks.
pub trait Scheduler: Send + Sync {
    /// Run `task` once `after` has elapsed.
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerId;

    /// Cancel a timer. Returns `false` if it already fired or was unknown.
    fn cancel(&self, id: TimerId) -> bool;
}
