//! Phase State Machine
//!
//! A session's lifecycle is an ordered list of phases. Exactly one phase
//! is current at a time (or none before start / after completion), and
//! transitions only ever move to an adjacent index. Every activation owns
//! a [`PhaseResources`] of timer and subscription handles, released
//! exactly once when the phase exits — handlers can never leak across
//! phases.

use tracing::debug;

use crate::core::scheduler::TaskHandle;
use crate::session::events::SubscriptionHandle;

/// One stage of a session's lifecycle.
///
/// `S` is the session type the phase drives. Hooks run under the
/// session's lock; anything long-running belongs in a scheduled task
/// registered on the activation's resources. The `Send + Sync` bound is
/// what lets a session holding boxed phases live behind a shared lock.
pub trait SessionPhase<S>: Send + Sync + 'static {
    /// Phase name, used in events and logs.
    fn name(&self) -> &'static str;

    /// Called when the phase becomes current. Timers and subscriptions
    /// the phase registers on `resources` are revoked on exit.
    fn on_start(&mut self, session: &mut S, resources: &mut PhaseResources);

    /// Called when the phase completes normally, before teardown.
    fn on_end(&mut self, _session: &mut S) {}

    /// Called when the phase is cancelled, before teardown.
    fn on_cancel(&mut self, _session: &mut S) {}
}

/// Timers and event subscriptions owned by one phase activation.
#[derive(Debug, Default)]
pub struct PhaseResources {
    tasks: Vec<TaskHandle>,
    subscriptions: Vec<SubscriptionHandle>,
}

impl PhaseResources {
    /// Tie a scheduled task to this activation.
    pub fn add_task(&mut self, task: TaskHandle) {
        self.tasks.push(task);
    }

    /// Tie an event subscription to this activation.
    pub fn add_subscription(&mut self, subscription: SubscriptionHandle) {
        self.subscriptions.push(subscription);
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.tasks.len() + self.subscriptions.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.subscriptions.is_empty()
    }

    fn release(&mut self) {
        // Handles abort on drop.
        self.tasks.clear();
        self.subscriptions.clear();
    }
}

/// Result of a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Moved to the next phase.
    Advanced,
    /// Ran past the last phase; every phase is unregistered and the
    /// session is done.
    Completed,
    /// Moved to the previous phase.
    Retreated,
    /// No previous phase existed; the same phase restarted in place.
    Restarted,
}

struct PhaseSlot<S> {
    phase: Box<dyn SessionPhase<S>>,
    resources: PhaseResources,
    active: bool,
}

/// Ordered phase list with adjacent-only transitions.
pub struct PhaseManager<S> {
    slots: Vec<PhaseSlot<S>>,
    current: Option<usize>,
}

impl<S: 'static> Default for PhaseManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> PhaseManager<S> {
    /// Empty phase list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            current: None,
        }
    }

    /// Append a phase to the end of the list.
    pub fn add_phase(&mut self, phase: Box<dyn SessionPhase<S>>) {
        self.slots.push(PhaseSlot {
            phase,
            resources: PhaseResources::default(),
            active: false,
        });
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the phase list is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the current phase, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Name of the current phase, if any.
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.map(|index| self.slots[index].phase.name())
    }

    /// Enter the first phase.
    ///
    /// # Panics
    ///
    /// Panics if the phase list is empty — a programmer error, not a
    /// runtime condition.
    pub fn start(&mut self, session: &mut S) {
        assert!(!self.slots.is_empty(), "cannot start an empty phase list");
        self.enter(0, session);
    }

    /// A phase at `from` signalled completion: tear it down and enter the
    /// next phase, or — past the end of the list — unregister everything.
    pub fn complete(&mut self, from: usize, session: &mut S) -> PhaseOutcome {
        assert!(from < self.slots.len(), "phase index out of range");
        debug!(phase = self.slots[from].phase.name(), "phase completed");
        self.slots[from].phase.on_end(session);
        self.release(from);

        let next = from + 1;
        if next < self.slots.len() && self.current != Some(next) {
            self.enter(next, session);
            PhaseOutcome::Advanced
        } else {
            self.teardown_all();
            PhaseOutcome::Completed
        }
    }

    /// A phase at `from` was cancelled: tear it down and re-enter the
    /// previous phase, or — already at the first — restart it in place.
    pub fn cancel(&mut self, from: usize, session: &mut S) -> PhaseOutcome {
        assert!(from < self.slots.len(), "phase index out of range");
        debug!(phase = self.slots[from].phase.name(), "phase cancelled");
        self.slots[from].phase.on_cancel(session);
        self.release(from);

        match from.checked_sub(1) {
            Some(previous) if self.current != Some(previous) => {
                self.enter(previous, session);
                PhaseOutcome::Retreated
            }
            _ => {
                self.enter(from, session);
                PhaseOutcome::Restarted
            }
        }
    }

    /// Unregister every phase and clear the list; used when a session
    /// unloads outside the normal phase flow.
    pub fn teardown_all(&mut self) {
        for index in 0..self.slots.len() {
            self.release(index);
        }
        self.slots.clear();
        self.current = None;
    }

    fn enter(&mut self, index: usize, session: &mut S) {
        self.current = Some(index);
        let slot = &mut self.slots[index];
        slot.active = true;
        debug!(phase = slot.phase.name(), "phase started");
        slot.phase.on_start(session, &mut slot.resources);
    }

    fn release(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        // Exactly once per activation.
        if slot.active {
            slot.resources.release();
            slot.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace {
        log: Vec<String>,
    }

    struct TracedPhase {
        name: &'static str,
    }

    impl SessionPhase<Trace> for TracedPhase {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_start(&mut self, session: &mut Trace, _resources: &mut PhaseResources) {
            session.log.push(format!("start:{}", self.name));
        }

        fn on_end(&mut self, session: &mut Trace) {
            session.log.push(format!("end:{}", self.name));
        }

        fn on_cancel(&mut self, session: &mut Trace) {
            session.log.push(format!("cancel:{}", self.name));
        }
    }

    fn manager_with(names: &[&'static str]) -> PhaseManager<Trace> {
        let mut manager = PhaseManager::new();
        for name in names {
            manager.add_phase(Box::new(TracedPhase { name }));
        }
        manager
    }

    #[test]
    fn walks_the_full_phase_list() {
        let mut state = Trace::default();
        let mut manager = manager_with(&["lobby", "playing", "end"]);

        manager.start(&mut state);
        assert_eq!(manager.current_name(), Some("lobby"));

        assert_eq!(manager.complete(0, &mut state), PhaseOutcome::Advanced);
        assert_eq!(manager.current_name(), Some("playing"));

        assert_eq!(manager.complete(1, &mut state), PhaseOutcome::Advanced);
        assert_eq!(manager.current_name(), Some("end"));

        assert_eq!(manager.complete(2, &mut state), PhaseOutcome::Completed);
        assert_eq!(manager.current_index(), None);
        assert!(manager.is_empty());

        assert_eq!(
            state.log,
            vec![
                "start:lobby",
                "end:lobby",
                "start:playing",
                "end:playing",
                "start:end",
                "end:end",
            ]
        );
    }

    #[test]
    fn cancel_retreats_to_previous_phase() {
        let mut state = Trace::default();
        let mut manager = manager_with(&["lobby", "playing"]);

        manager.start(&mut state);
        manager.complete(0, &mut state);
        assert_eq!(manager.cancel(1, &mut state), PhaseOutcome::Retreated);
        assert_eq!(manager.current_name(), Some("lobby"));
    }

    #[test]
    fn cancel_at_first_phase_restarts_in_place() {
        let mut state = Trace::default();
        let mut manager = manager_with(&["lobby", "playing"]);

        manager.start(&mut state);
        assert_eq!(manager.cancel(0, &mut state), PhaseOutcome::Restarted);
        assert_eq!(manager.current_name(), Some("lobby"));
        assert_eq!(state.log, vec!["start:lobby", "cancel:lobby", "start:lobby"]);
    }

    #[test]
    fn teardown_clears_current_and_list() {
        let mut state = Trace::default();
        let mut manager = manager_with(&["lobby", "playing"]);

        manager.start(&mut state);
        manager.teardown_all();

        assert_eq!(manager.current_index(), None);
        assert!(manager.is_empty());
    }

    #[test]
    #[should_panic(expected = "empty phase list")]
    fn starting_empty_list_panics() {
        let mut state = Trace::default();
        let mut manager: PhaseManager<Trace> = PhaseManager::new();
        manager.start(&mut state);
    }

    #[tokio::test(start_paused = true)]
    async fn resources_are_released_on_exit() {
        use crate::core::scheduler::{Scheduler, TokioScheduler};
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;
        use std::time::Duration;

        struct TimedPhase {
            fired: Arc<AtomicU32>,
        }

        impl SessionPhase<Trace> for TimedPhase {
            fn name(&self) -> &'static str {
                "timed"
            }

            fn on_start(&mut self, _session: &mut Trace, resources: &mut PhaseResources) {
                let fired = self.fired.clone();
                resources.add_task(TokioScheduler.run_after(
                    Duration::from_secs(60),
                    Box::pin(async move {
                        fired.fetch_add(1, Ordering::SeqCst);
                    }),
                ));
                assert_eq!(resources.len(), 1);
            }
        }

        let fired = Arc::new(AtomicU32::new(0));
        let mut state = Trace::default();
        let mut manager: PhaseManager<Trace> = PhaseManager::new();
        manager.add_phase(Box::new(TimedPhase {
            fired: fired.clone(),
        }));

        manager.start(&mut state);
        manager.complete(0, &mut state);

        // The phase's timer died with its activation.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
