//! Session Registry
//!
//! Indexes sessions by logical name; one name maps to many concurrent
//! instances of the same activity. Lookups are linear scans over cloned
//! bucket snapshots — fine at tens of sessions, and safe against
//! concurrent removal mid-scan.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::context::EngineContext;
use crate::session::events::SessionEvent;
use crate::session::host::HostState;
use crate::session::player::{ParticipantId, SessionPlayer};
use crate::session::session::{Session, SessionError, SessionHandle, SessionId, SessionState};
use crate::session::settings::{SessionSettings, WorldId};
use crate::session::team::SessionTeam;

/// Name-indexed collection of live sessions.
pub struct SessionRegistry<P, T, S> {
    sessions: RwLock<BTreeMap<String, Vec<SessionHandle<P, T, S>>>>,
    ctx: EngineContext,
}

impl<P, T, S> SessionRegistry<P, T, S>
where
    P: SessionPlayer,
    T: SessionTeam,
    S: SessionSettings,
{
    /// Empty registry.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
            ctx,
        }
    }

    /// The engine context the registry was built with.
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Register a session under `name` and return its handle.
    pub async fn add_session(&self, name: &str, session: Session<P, T, S>) -> SessionHandle<P, T, S> {
        let id = session.id();
        info!(session = %session.full_name(), "session registered");
        let handle = session.into_handle();
        self.sessions
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .push(handle.clone());
        self.ctx.events.emit(SessionEvent::SessionCreated {
            name: name.to_string(),
            id,
        });
        handle
    }

    /// Drop a session from the index. Scans every bucket — a session can
    /// only sit in one bucket by construction, but removal is defensive.
    pub async fn remove_session(&self, session: &SessionHandle<P, T, S>) {
        let mut sessions = self.sessions.write().await;
        for bucket in sessions.values_mut() {
            bucket.retain(|other| !Arc::ptr_eq(other, session));
        }
        sessions.retain(|_, bucket| !bucket.is_empty());
        debug!("session removed from registry");
    }

    /// Force every participant out, tear the session down, and drop it
    /// from the index.
    pub async fn end_session(&self, session: &SessionHandle<P, T, S>) {
        {
            let mut session = session.write().await;
            let ids: Vec<ParticipantId> = session.players().keys().copied().collect();
            for id in ids {
                let _ = session.leave(id);
            }
            session.unload();
        }
        self.remove_session(session).await;
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Sessions registered under `name`.
    pub async fn sessions(&self, name: &str) -> Vec<SessionHandle<P, T, S>> {
        self.sessions
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Every registered session.
    pub async fn all_sessions(&self) -> Vec<SessionHandle<P, T, S>> {
        self.sessions
            .read()
            .await
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    /// Sessions under `name` in the given lifecycle state.
    pub async fn sessions_with_state(
        &self,
        name: &str,
        state: SessionState,
    ) -> Vec<SessionHandle<P, T, S>> {
        let mut found = Vec::new();
        for handle in self.sessions(name).await {
            if handle.read().await.state() == state {
                found.push(handle);
            }
        }
        found
    }

    /// First session under `name` another participant can join.
    ///
    /// Returns `None` when every instance is full — spinning up a new
    /// session is the caller's decision, never the registry's.
    pub async fn find_joinable(&self, name: &str) -> Option<SessionHandle<P, T, S>> {
        for handle in self.sessions(name).await {
            if handle.read().await.can_join() {
                return Some(handle);
            }
        }
        None
    }

    /// The session containing `participant`.
    pub async fn session_of(&self, participant: ParticipantId) -> Option<SessionHandle<P, T, S>> {
        for handle in self.all_sessions().await {
            if handle.read().await.contains(participant) {
                return Some(handle);
            }
        }
        None
    }

    /// The session with the given id.
    pub async fn session_by_id(&self, id: SessionId) -> Option<SessionHandle<P, T, S>> {
        for handle in self.all_sessions().await {
            if handle.read().await.id() == id {
                return Some(handle);
            }
        }
        None
    }

    /// The session playing in `world`.
    pub async fn session_in_world(&self, world: &WorldId) -> Option<SessionHandle<P, T, S>> {
        for handle in self.all_sessions().await {
            if handle.read().await.settings().world() == world {
                return Some(handle);
            }
        }
        None
    }

    /// Every hosted session.
    pub async fn hosted_sessions(&self) -> Vec<SessionHandle<P, T, S>> {
        let mut found = Vec::new();
        for handle in self.all_sessions().await {
            if handle.read().await.is_hosted() {
                found.push(handle);
            }
        }
        found
    }

    /// The session hosted by `holder`.
    pub async fn hosted_by(&self, holder: ParticipantId) -> Option<SessionHandle<P, T, S>> {
        for handle in self.hosted_sessions().await {
            if handle
                .read()
                .await
                .host()
                .is_some_and(|host| host.is_holder(holder))
            {
                return Some(handle);
            }
        }
        None
    }

    /// Hosted sessions under `name` in the given host state.
    pub async fn hosted_with_state(
        &self,
        name: &str,
        state: HostState,
    ) -> Vec<SessionHandle<P, T, S>> {
        let mut found = Vec::new();
        for handle in self.sessions(name).await {
            if handle.read().await.host_state_is(state) {
                found.push(handle);
            }
        }
        found
    }

    /// Sessions with no alive participants, candidates for reaping.
    pub async fn empty_sessions(&self) -> Vec<SessionHandle<P, T, S>> {
        let mut found = Vec::new();
        for handle in self.all_sessions().await {
            if handle.read().await.alive_count() == 0 {
                found.push(handle);
            }
        }
        found
    }

    /// Whether the participant is in any session.
    pub async fn is_in_session(&self, participant: ParticipantId) -> bool {
        self.session_of(participant).await.is_some()
    }

    // ------------------------------------------------------------------
    // Join / leave flows
    // ------------------------------------------------------------------

    /// Join a session, leaving any current session first.
    pub async fn join(
        &self,
        session: &SessionHandle<P, T, S>,
        participant: ParticipantId,
    ) -> Result<(), SessionError> {
        self.leave(participant).await;
        session.write().await.join(participant, false)
    }

    /// Join the session with the given id.
    pub async fn join_by_id(
        &self,
        id: SessionId,
        participant: ParticipantId,
    ) -> Result<(), SessionError> {
        let session = self
            .session_by_id(id)
            .await
            .ok_or(SessionError::SessionNotFound)?;
        self.join(&session, participant).await
    }

    /// Join the session with the given id as a spectator.
    pub async fn spectate(
        &self,
        id: SessionId,
        participant: ParticipantId,
    ) -> Result<(), SessionError> {
        let session = self
            .session_by_id(id)
            .await
            .ok_or(SessionError::SessionNotFound)?;
        self.leave(participant).await;
        let result = session.write().await.join(participant, true);
        result
    }

    /// Remove the participant from whichever session holds them.
    pub async fn leave(&self, participant: ParticipantId) {
        if let Some(session) = self.session_of(participant).await {
            let _ = session.write().await.leave(participant);
        }
    }

    /// Locate a joinable session under `name` and join it, telling the
    /// participant when none is available.
    pub async fn find_and_join(
        &self,
        name: &str,
        participant: ParticipantId,
    ) -> Result<SessionHandle<P, T, S>, SessionError> {
        match self.find_joinable(name).await {
            Some(session) => {
                self.join(&session, participant).await?;
                Ok(session)
            }
            None => {
                self.ctx.directory.send_message(
                    participant,
                    &format!("no {name} session is open right now"),
                );
                debug!(name, participant = %participant, "no joinable session");
                Err(SessionError::SessionNotFound)
            }
        }
    }

    // ------------------------------------------------------------------
    // Counts
    // ------------------------------------------------------------------

    /// Number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.values().map(Vec::len).sum()
    }

    /// Number of sessions under `name`.
    pub async fn session_count_named(&self, name: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Participants across every session, spectators included.
    pub async fn player_count(&self) -> usize {
        let mut count = 0;
        for handle in self.all_sessions().await {
            count += handle.read().await.len();
        }
        count
    }

    /// Participants across sessions under `name`.
    pub async fn player_count_named(&self, name: &str) -> usize {
        let mut count = 0;
        for handle in self.sessions(name).await {
            count += handle.read().await.len();
        }
        count
    }
}
