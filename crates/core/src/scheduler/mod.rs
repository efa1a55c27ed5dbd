//! Background scheduler for periodic refresh tasks.
//!
//! Each task runs on a fixed interval: the first run is immediate, later runs
//! are one period apart. There is no jitter and no backoff after failures;
//! tasks are expected to handle their own errors.

mod refresh_driver;

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};

pub use refresh_driver::{RefreshDriver, RefreshIntervals};

/// Shortest accepted period; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a spawned periodic task. The task is aborted when the handle
/// is dropped.
pub struct TaskHandle {
    name: String,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the task. Idempotent.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!("Cancelling periodic task '{}'", self.name);
        }
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns periodic tasks and can stop all of them at once.
#[derive(Default)]
pub struct Scheduler {
    spawned: Mutex<Vec<AbortHandle>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` now and then every `period` until the returned handle is
    /// cancelled or dropped, or [`Scheduler::shutdown`] is called.
    ///
    /// A run that overruns the period delays the next one instead of
    /// triggering a burst of catch-up runs.
    pub fn spawn_periodic<F, Fut>(&self, name: &str, period: Duration, mut task: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = if period < MIN_PERIOD {
            warn!(
                "Periodic task '{}' requested period {:?}; using {:?}",
                name, period, MIN_PERIOD
            );
            MIN_PERIOD
        } else {
            period
        };

        let task_name = name.to_string();
        let handle = tokio::spawn(async move {
            info!("Periodic task '{}' started ({:?} interval)", task_name, period);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task().await;
            }
        });

        if let Ok(mut spawned) = self.spawned.lock() {
            spawned.retain(|h| !h.is_finished());
            spawned.push(handle.abort_handle());
        }

        TaskHandle {
            name: name.to_string(),
            handle,
        }
    }

    /// Number of tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.spawned
            .lock()
            .map(|spawned| spawned.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Aborts every task spawned by this scheduler.
    pub fn shutdown(&self) {
        if let Ok(mut spawned) = self.spawned.lock() {
            for handle in spawned.drain(..) {
                handle.abort();
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_is_immediate_then_fixed_period() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let _handle =
            scheduler.spawn_periodic("count", Duration::from_secs(5), counting_task(&counter));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_task() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle =
            scheduler.spawn_periodic("count", Duration::from_secs(5), counting_task(&counter));

        sleep(Duration::from_millis(10)).await;
        handle.cancel();
        sleep(Duration::from_secs(30)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
        assert_eq!(handle.name(), "count");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle =
            scheduler.spawn_periodic("count", Duration::from_secs(5), counting_task(&counter));

        sleep(Duration::from_millis(10)).await;
        drop(handle);
        sleep(Duration::from_secs(30)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_all_tasks() {
        let scheduler = Scheduler::new();
        let fast = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));
        let _a = scheduler.spawn_periodic("fast", Duration::from_secs(5), counting_task(&fast));
        let _b = scheduler.spawn_periodic("slow", Duration::from_secs(60), counting_task(&slow));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(scheduler.active_tasks(), 2);

        scheduler.shutdown();
        sleep(Duration::from_secs(120)).await;

        assert_eq!(fast.load(Ordering::SeqCst), 1);
        assert_eq!(slow.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_clamped() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let _handle = scheduler.spawn_periodic("zero", Duration::ZERO, counting_task(&counter));

        sleep(Duration::from_millis(10)).await;
        assert!(counter.load(Ordering::SeqCst) >= 1);
    }
}
