//! Task Scheduling
//!
//! The engine never reaches for a global scheduler: every component that
//! needs timers takes a [`Scheduler`] at construction. Production code
//! injects [`TokioScheduler`]; tests drive the same trait on a paused
//! tokio clock for deterministic timing.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A boxed unit of deferred work.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Factory producing one run of a repeating task per period.
pub type RepeatingTask = Box<dyn FnMut() -> TaskFuture + Send>;

/// Time-deferred task execution.
///
/// Both methods return a [`TaskHandle`]; dropping the handle cancels the
/// task, so owners that keep handles in their state get cancel-on-teardown
/// without extra bookkeeping.
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay`.
    fn run_after(&self, delay: Duration, task: TaskFuture) -> TaskHandle;

    /// Run a fresh future from `task` every `period`, first run one full
    /// period after the call.
    fn run_every(&self, period: Duration, task: RepeatingTask) -> TaskHandle;
}

/// Cancellable handle to a scheduled task.
///
/// Aborts the underlying task when dropped. A task that already ran (or is
/// mid-run at an await point) treats the abort as a no-op.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Cancel the task without consuming the handle.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has run to completion or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// [`Scheduler`] backed by the ambient tokio runtime.
///
/// Must be used from within a runtime; spawning outside one panics, which
/// is the same contract as `tokio::spawn` itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn run_after(&self, delay: Duration, task: TaskFuture) -> TaskHandle {
        TaskHandle::new(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }))
    }

    fn run_every(&self, period: Duration, mut task: RepeatingTask) -> TaskHandle {
        TaskHandle::new(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                task().await;
            }
        }))
    }
}
