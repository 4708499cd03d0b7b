//! Lifecycle Events
//!
//! Sessions and the registry emit lifecycle signals on a broadcast bus;
//! external dispatchers subscribe without ever being able to block the
//! engine. [`EventBus::subscribe_with`] is the observer form phases use
//! for subscriptions scoped to their own lifetime.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core::scheduler::TaskHandle;
use crate::session::player::ParticipantId;
use crate::session::session::SessionId;

/// Lifecycle signal emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A session was registered.
    SessionCreated {
        /// Logical session name.
        name: String,
        /// Session identity.
        id: SessionId,
    },

    /// A session was unloaded.
    SessionEnded {
        /// Logical session name.
        name: String,
        /// Session identity.
        id: SessionId,
    },

    /// A participant entered a session.
    ParticipantJoined {
        /// Session identity.
        session: SessionId,
        /// The participant.
        participant: ParticipantId,
        /// Whether they joined as a spectator.
        spectator: bool,
    },

    /// A participant left a session.
    ParticipantLeft {
        /// Session identity.
        session: SessionId,
        /// The participant.
        participant: ParticipantId,
    },

    /// A session's current phase changed; `None` means the phase list ran
    /// out and the session completed.
    PhaseChanged {
        /// Session identity.
        session: SessionId,
        /// New current phase name.
        phase: Option<String>,
    },
}

/// Broadcast bus for [`SessionEvent`]s.
///
/// Cloning shares the bus. Emission never blocks; subscribers that fall
/// behind lose the oldest events (broadcast-channel lagging semantics).
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Bus retaining up to `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    /// Raw subscription for callers that drive their own receive loop.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Invoke `handler` for every event until the handle is dropped or
    /// revoked.
    pub fn subscribe_with<F>(&self, handler: F) -> SubscriptionHandle
    where
        F: Fn(SessionEvent) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        SubscriptionHandle {
            task: TaskHandle::new(task),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Revocable handle to a [`EventBus::subscribe_with`] observer.
///
/// Dropping the handle revokes the subscription.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: TaskHandle,
}

impl SubscriptionHandle {
    /// Revoke the subscription.
    pub fn revoke(self) {
        self.task.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn sample_event() -> SessionEvent {
        SessionEvent::SessionCreated {
            name: "skirmish".to_string(),
            id: SessionId::new(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let event = sample_event();
        bus.emit(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_a_noop() {
        let bus = EventBus::new(16);
        bus.emit(sample_event());
    }

    #[tokio::test]
    async fn observer_stops_after_drop() {
        let bus = EventBus::new(16);
        let seen = Arc::new(Mutex::new(0u32));

        let s = seen.clone();
        let handle = bus.subscribe_with(move |_| {
            *s.lock().unwrap() += 1;
        });

        bus.emit(sample_event());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), 1);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(10)).await;
        bus.emit(sample_event());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
