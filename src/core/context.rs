//! Engine Context
//!
//! The dependency bundle handed to every component: the injected
//! scheduler, the identity/messaging collaborator, and the lifecycle
//! event bus. Cloning is cheap; everything inside is shared.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::core::scheduler::Scheduler;
use crate::session::events::EventBus;
use crate::session::player::ParticipantId;

/// Identity and messaging collaborator.
///
/// Resolves stable participant ids to live, addressable endpoints. The
/// host platform implements this; the engine only asks three questions.
/// Message delivery must not block — implementations queue or drop.
pub trait Directory: Send + Sync + 'static {
    /// Whether the participant is currently reachable.
    fn is_online(&self, id: ParticipantId) -> bool;

    /// Human-readable name for messages and logs.
    fn display_name(&self, id: ParticipantId) -> String {
        id.short()
    }

    /// Deliver a text message to the participant, best-effort.
    fn send_message(&self, id: ParticipantId, message: &str);
}

/// Shared dependencies cloned into every engine component.
#[derive(Clone)]
pub struct EngineContext {
    /// Timer scheduler.
    pub scheduler: Arc<dyn Scheduler>,
    /// Identity and messaging collaborator.
    pub directory: Arc<dyn Directory>,
    /// Lifecycle event bus.
    pub events: EventBus,
}

impl EngineContext {
    /// Bundle a scheduler and directory with a fresh event bus.
    pub fn new(scheduler: Arc<dyn Scheduler>, directory: Arc<dyn Directory>) -> Self {
        Self {
            scheduler,
            directory,
            events: EventBus::new(256),
        }
    }
}

/// In-memory [`Directory`] for demos and tests.
///
/// Registered participants are online until marked otherwise; messages
/// are retained per participant for inspection.
#[derive(Default)]
pub struct InMemoryDirectory {
    inner: Mutex<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    names: BTreeMap<ParticipantId, String>,
    offline: Vec<ParticipantId>,
    messages: BTreeMap<ParticipantId, Vec<String>>,
}

impl InMemoryDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant as online under `name`.
    pub fn register(&self, id: ParticipantId, name: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.names.insert(id, name.into());
        inner.offline.retain(|other| *other != id);
    }

    /// Flip a registered participant's online state.
    pub fn set_online(&self, id: ParticipantId, online: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.offline.retain(|other| *other != id);
        if !online {
            inner.offline.push(id);
        }
    }

    /// Messages delivered to `id`, oldest first.
    pub fn messages(&self, id: ParticipantId) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Directory for InMemoryDirectory {
    fn is_online(&self, id: ParticipantId) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.names.contains_key(&id) && !inner.offline.contains(&id)
    }

    fn display_name(&self, id: ParticipantId) -> String {
        self.inner
            .lock()
            .unwrap()
            .names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.short())
    }

    fn send_message(&self, id: ParticipantId, message: &str) {
        tracing::debug!(participant = %id, message, "directory message");
        self.inner
            .lock()
            .unwrap()
            .messages
            .entry(id)
            .or_default()
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_controls_presence() {
        let directory = InMemoryDirectory::new();
        let id = ParticipantId::new();

        assert!(!directory.is_online(id));

        directory.register(id, "alice");
        assert!(directory.is_online(id));
        assert_eq!(directory.display_name(id), "alice");

        directory.set_online(id, false);
        assert!(!directory.is_online(id));

        directory.set_online(id, true);
        assert!(directory.is_online(id));
    }

    #[test]
    fn messages_are_retained_in_order() {
        let directory = InMemoryDirectory::new();
        let id = ParticipantId::new();
        directory.register(id, "bob");

        directory.send_message(id, "first");
        directory.send_message(id, "second");

        assert_eq!(directory.messages(id), vec!["first", "second"]);
    }
}
