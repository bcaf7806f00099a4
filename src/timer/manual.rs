//! Scheduler driven by a virtual clock.

use super::{Scheduler, TimerId, TimerTask};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    // Ordered by deadline, ties broken by arm order.
    queue: BTreeMap<(Duration, u64), TimerTask>,
    deadlines: HashMap<u64, Duration>,
}

/// Scheduler whose clock only moves when [`advance`](Self::advance) is
/// called.
///
/// Due tasks run on the thread calling `advance`, one at a time, with the
/// scheduler unlocked, so a task may arm or cancel other timers.
///
/// # Example
///
/// ```rust
/// use navspan::timer::{ManualScheduler, Scheduler};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let scheduler = ManualScheduler::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&fired);
/// scheduler.schedule(Duration::from_millis(10), Box::new(move || flag.store(true, Ordering::SeqCst)));
///
/// scheduler.advance(Duration::from_millis(9));
/// assert!(!fired.load(Ordering::SeqCst));
/// scheduler.advance(Duration::from_millis(1));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of armed timers.
    pub fn pending_timers(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Whether the given timer is still armed.
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.state.lock().deadlines.contains_key(&id.raw())
    }

    /// Move the clock forward, running every task that becomes due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut fired = 0;

        loop {
            let task = {
                let mut state = self.state.lock();
                let due = state
                    .queue
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target);

                match due {
                    Some(entry) => {
                        state.now = entry.0;
                        state.deadlines.remove(&entry.1);
                        state.queue.remove(&entry)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            match task {
                Some(task) => {
                    task();
                    fired += 1;
                }
                None => break,
            }
        }

        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerId {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        let deadline = state.now + after;
        state.queue.insert((deadline, id), task);
        state.deadlines.insert(id, deadline);
        TimerId::new(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.state.lock();
        match state.deadlines.remove(&id.raw()) {
            Some(deadline) => state.queue.remove(&(deadline, id.raw())).is_some(),
            None => false,
        }
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}
