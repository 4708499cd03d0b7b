//! Session Hosts
//!
//! A hosted session is owned by one participant who controls access and
//! may delegate to co-hosts. Host metadata is created with the session
//! and destroyed with it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::session::player::ParticipantId;

/// Visibility of a hosted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostState {
    /// Joinable by invitation of the host only.
    Private,
    /// Joinable by anyone.
    Public,
}

/// Host metadata attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHost {
    holder: ParticipantId,
    state: HostState,
    co_hosts: BTreeSet<ParticipantId>,
}

impl SessionHost {
    /// New private host record for `holder`.
    pub fn new(holder: ParticipantId) -> Self {
        Self {
            holder,
            state: HostState::Private,
            co_hosts: BTreeSet::new(),
        }
    }

    /// The hosting participant.
    pub fn holder(&self) -> ParticipantId {
        self.holder
    }

    /// Whether `id` is the hosting participant.
    pub fn is_holder(&self, id: ParticipantId) -> bool {
        self.holder == id
    }

    /// Current visibility.
    pub fn state(&self) -> HostState {
        self.state
    }

    /// Change visibility.
    pub fn set_state(&mut self, state: HostState) {
        self.state = state;
    }

    /// Grant co-host rights; returns false if already granted.
    pub fn add_co_host(&mut self, id: ParticipantId) -> bool {
        self.co_hosts.insert(id)
    }

    /// Revoke co-host rights; returns false if not a co-host.
    pub fn remove_co_host(&mut self, id: ParticipantId) -> bool {
        self.co_hosts.remove(&id)
    }

    /// Whether `id` holds co-host rights.
    pub fn is_co_host(&self, id: ParticipantId) -> bool {
        self.co_hosts.contains(&id)
    }

    /// Co-host ids.
    pub fn co_hosts(&self) -> &BTreeSet<ParticipantId> {
        &self.co_hosts
    }
}
