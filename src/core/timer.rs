//! Countdown Timer
//!
//! Seconds-granularity countdown with start, per-second, and finish hooks.
//! Phases use this for timed stage advance (lobby countdowns, grace
//! periods).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::scheduler::{Scheduler, TaskHandle};

type TickHook = Box<dyn FnMut(u32) + Send>;
type OnceHook = Box<dyn FnOnce() + Send>;

/// A running countdown.
///
/// Built with [`CountdownTimer::builder`], started against a scheduler.
/// The first tick fires immediately on start, then once per second; after
/// the last tick the finish hook runs and the timer cancels itself.
/// Dropping the timer cancels it.
pub struct CountdownTimer {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    seconds_left: u32,
    task: Option<TaskHandle>,
    on_tick: Option<TickHook>,
    on_finish: Option<OnceHook>,
}

/// Configures hooks before a countdown starts.
pub struct CountdownBuilder {
    seconds: u32,
    on_start: Option<OnceHook>,
    on_tick: Option<TickHook>,
    on_finish: Option<OnceHook>,
}

impl CountdownTimer {
    /// Begin configuring a countdown of `seconds` seconds.
    pub fn builder(seconds: u32) -> CountdownBuilder {
        CountdownBuilder {
            seconds,
            on_start: None,
            on_tick: None,
            on_finish: None,
        }
    }

    /// Seconds remaining, zero once finished.
    pub fn seconds_left(&self) -> u32 {
        self.inner.lock().unwrap().seconds_left
    }

    /// Whether the countdown has run out or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.inner.lock().unwrap().task.is_none()
    }

    /// Stop the countdown; the finish hook does not run.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.seconds_left = 0;
        inner.task = None;
        inner.on_finish = None;
    }

    fn step(inner: &Mutex<Inner>) {
        let mut guard = inner.lock().unwrap();
        if guard.task.is_none() && guard.seconds_left == 0 {
            return;
        }
        if guard.seconds_left == 0 {
            // Drop the repeating task from inside its own closure; the
            // abort lands at the loop's next await point.
            guard.task = None;
            let finish = guard.on_finish.take();
            drop(guard);
            if let Some(finish) = finish {
                finish();
            }
            return;
        }
        let left = guard.seconds_left;
        guard.seconds_left -= 1;
        if let Some(tick) = guard.on_tick.as_mut() {
            tick(left);
        }
    }
}

impl CountdownBuilder {
    /// Hook invoked once, synchronously, when the countdown starts.
    pub fn on_start(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Hook invoked every second with the seconds remaining (counting
    /// `seconds`, `seconds - 1`, .., `1`).
    pub fn on_tick(mut self, hook: impl FnMut(u32) + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(hook));
        self
    }

    /// Hook invoked once when the countdown reaches zero.
    pub fn on_finish(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(hook));
        self
    }

    /// Start the countdown on `scheduler`.
    pub fn start(self, scheduler: &dyn Scheduler) -> CountdownTimer {
        let inner = Arc::new(Mutex::new(Inner {
            seconds_left: self.seconds,
            task: None,
            on_tick: self.on_tick,
            on_finish: self.on_finish,
        }));

        if let Some(start) = self.on_start {
            start();
        }
        if self.seconds == 0 {
            let finish = inner.lock().unwrap().on_finish.take();
            if let Some(finish) = finish {
                finish();
            }
            return CountdownTimer { inner };
        }
        // First tick fires at start, the rest on the scheduler.
        CountdownTimer::step(&inner);

        let tick_state = inner.clone();
        let task = scheduler.run_every(
            Duration::from_secs(1),
            Box::new(move || {
                let state = tick_state.clone();
                Box::pin(async move {
                    CountdownTimer::step(&state);
                })
            }),
        );
        inner.lock().unwrap().task = Some(task);

        CountdownTimer { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::TokioScheduler;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_finishes() {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let finished = Arc::new(AtomicBool::new(false));

        let t = ticks.clone();
        let f = finished.clone();
        let timer = CountdownTimer::builder(3)
            .on_tick(move |left| t.lock().unwrap().push(left))
            .on_finish(move || f.store(true, Ordering::SeqCst))
            .start(&TokioScheduler);

        assert_eq!(*ticks.lock().unwrap(), vec![3]);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(*ticks.lock().unwrap(), vec![3, 2, 1]);
        assert!(finished.load(Ordering::SeqCst));
        assert!(timer.is_finished());
        assert_eq!(timer.seconds_left(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_hook_runs_before_first_tick() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = order.clone();
        let o2 = order.clone();
        let _timer = CountdownTimer::builder(2)
            .on_start(move || o1.lock().unwrap().push("start"))
            .on_tick(move |_| o2.lock().unwrap().push("tick"))
            .start(&TokioScheduler);

        assert_eq!(order.lock().unwrap().as_slice(), ["start", "tick"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_finish() {
        let finished = Arc::new(AtomicBool::new(false));

        let f = finished.clone();
        let timer = CountdownTimer::builder(10)
            .on_finish(move || f.store(true, Ordering::SeqCst))
            .start(&TokioScheduler);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        timer.cancel();
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert!(!finished.load(Ordering::SeqCst));
        assert!(timer.is_finished());
    }
}
