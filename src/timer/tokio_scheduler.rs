//! Scheduler backed by a tokio runtime.

use super::{Scheduler, TimerId, TimerTask};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs each timer as a sleeping task on a tokio runtime.
///
/// Cancelling aborts the task. Tasks run on the runtime's worker threads, so
/// the controller's state is always accessed under its mutex.
pub struct TokioScheduler {
    handle: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl TokioScheduler {
    /// Scheduler spawning onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(0),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Scheduler spawning onto the runtime of the calling context.
    ///
    /// Panics when called outside a tokio runtime, like
    /// [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Hold the map lock across spawn so the task cannot remove its entry
        // before it is inserted.
        let mut guard = self.tasks.lock();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(after).await;
            if tasks.lock().remove(&id).is_some() {
                task();
            }
        });
        guard.insert(id, join);

        TimerId::new(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        match self.tasks.lock().remove(&id.raw()) {
            Some(join) => {
                join.abort();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("pending", &self.pending_timers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn timer_fires_after_delay() {
        let scheduler = TokioScheduler::current();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );
        assert_eq!(scheduler.pending_timers(), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[tokio::test]
    async fn cancelled_timer_does_not_fire() {
        let scheduler = TokioScheduler::current();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let id = scheduler.schedule(
            Duration::from_millis(20),
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
