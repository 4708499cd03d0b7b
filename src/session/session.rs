//! Sessions
//!
//! A session aggregates its player table, team list, phase machine, and
//! optional host metadata. All methods take `&mut self` or `&self` and
//! run under the session's own lock (see [`SessionHandle`]); derived
//! queries are pure recomputations over the player and team tables, which
//! are the single source of truth.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::core::context::EngineContext;
use crate::session::events::SessionEvent;
use crate::session::host::{HostState, SessionHost};
use crate::session::phase::{PhaseManager, PhaseOutcome, SessionPhase};
use crate::session::player::{ParticipantId, SessionPlayer};
use crate::session::settings::SessionSettings;
use crate::session::team::{SessionTeam, TeamColor};

/// Stable session identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form for full names and logs.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..10].to_string()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Gathering participants, phases not started.
    Waiting,
    /// Phase machine running.
    Running,
    /// Phase list exhausted or session unloaded.
    Ended,
}

/// Rejected session operations.
///
/// These surface to callers so a user-visible message can be relayed;
/// none of them is fatal and none aborts the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Session is at its size-policy maximum.
    #[error("session is full")]
    SessionFull,

    /// Participant already in the session.
    #[error("already in session")]
    AlreadyInSession,

    /// Participant not in the session.
    #[error("not in session")]
    NotInSession,

    /// No session matched the lookup.
    #[error("session not found")]
    SessionNotFound,

    /// Target team is at the per-team cap.
    #[error("team is full")]
    TeamFull,

    /// No team of that color was seeded for this session.
    #[error("team not found")]
    TeamNotFound,
}

/// Shared, lock-guarded session reference.
///
/// The per-session lock is what serializes joins, leaves, team moves, and
/// phase transitions against each other.
pub type SessionHandle<P, T, S> = Arc<RwLock<Session<P, T, S>>>;

/// One running instance of a multiplayer activity.
pub struct Session<P, T, S> {
    id: SessionId,
    name: String,
    settings: S,
    state: SessionState,
    players: BTreeMap<ParticipantId, P>,
    teams: Vec<T>,
    phases: PhaseManager<Session<P, T, S>>,
    host: Option<SessionHost>,
    ctx: EngineContext,
}

impl<P, T, S> Session<P, T, S>
where
    P: SessionPlayer,
    T: SessionTeam,
    S: SessionSettings,
{
    /// New session in `Waiting` state, teams seeded from the size policy.
    pub fn new(name: impl Into<String>, settings: S, ctx: EngineContext) -> Self {
        let teams = TeamColor::ALL
            .into_iter()
            .take(settings.size().teams)
            .map(T::create)
            .collect();
        let session = Self {
            id: SessionId::new(),
            name: name.into(),
            settings,
            state: SessionState::Waiting,
            players: BTreeMap::new(),
            teams,
            phases: PhaseManager::new(),
            host: None,
            ctx,
        };
        debug!(session = %session.full_name(), "session loaded");
        session
    }

    /// Wrap the session in its shared lock.
    pub fn into_handle(self) -> SessionHandle<P, T, S> {
        Arc::new(RwLock::new(self))
    }

    /// Session identity.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Logical session name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `name[Host]-sizeName-shortId`, the label used in logs and messages.
    pub fn full_name(&self) -> String {
        format!(
            "{}{}-{}-{}",
            self.name,
            if self.is_hosted() { "Host" } else { "" },
            self.settings.size().name,
            self.id.short()
        )
    }

    /// Session settings.
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Set the lifecycle state directly; the phase machine also moves it.
    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// The engine context this session was built with.
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Add a participant.
    ///
    /// A duplicate join is rejected without side effects; non-spectator
    /// joins are capacity-checked against the size policy.
    pub fn join(&mut self, id: ParticipantId, spectator: bool) -> Result<(), SessionError> {
        if self.players.contains_key(&id) {
            return Err(SessionError::AlreadyInSession);
        }
        if !spectator && !self.can_join() {
            return Err(SessionError::SessionFull);
        }
        self.players.insert(id, P::create(id, spectator));
        self.ctx.events.emit(SessionEvent::ParticipantJoined {
            session: self.id,
            participant: id,
            spectator,
        });
        debug!(
            session = %self.full_name(),
            participant = %id,
            spectator,
            "participant joined"
        );
        Ok(())
    }

    /// Remove a participant along with any team membership.
    pub fn leave(&mut self, id: ParticipantId) -> Result<(), SessionError> {
        if self.players.remove(&id).is_none() {
            return Err(SessionError::NotInSession);
        }
        self.remove_from_team(id);
        self.ctx.events.emit(SessionEvent::ParticipantLeft {
            session: self.id,
            participant: id,
        });
        debug!(session = %self.full_name(), participant = %id, "participant left");
        Ok(())
    }

    /// Whether the participant is in this session.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.players.contains_key(&id)
    }

    /// The participant's player record.
    pub fn player(&self, id: ParticipantId) -> Option<&P> {
        self.players.get(&id)
    }

    /// Mutable access to the participant's player record.
    pub fn player_mut(&mut self, id: ParticipantId) -> Option<&mut P> {
        self.players.get_mut(&id)
    }

    /// The full player table.
    pub fn players(&self) -> &BTreeMap<ParticipantId, P> {
        &self.players
    }

    // ------------------------------------------------------------------
    // Derived queries
    // ------------------------------------------------------------------

    /// Non-spectator participants.
    pub fn alive_players(&self) -> Vec<&P> {
        self.players.values().filter(|p| !p.is_spectator()).collect()
    }

    /// Spectating participants.
    pub fn spectators(&self) -> Vec<&P> {
        self.players.values().filter(|p| p.is_spectator()).collect()
    }

    /// Participants holding a team membership.
    pub fn players_with_team(&self) -> Vec<&P> {
        self.players
            .values()
            .filter(|p| self.team_index_of(p.id()).is_some())
            .collect()
    }

    /// Participants without a team membership.
    pub fn players_without_team(&self) -> Vec<&P> {
        self.players
            .values()
            .filter(|p| self.team_index_of(p.id()).is_none())
            .collect()
    }

    /// Teams with at least one alive member.
    pub fn alive_teams(&self) -> Vec<&T> {
        self.teams
            .iter()
            .filter(|team| {
                team.members()
                    .iter()
                    .any(|id| self.players.get(id).is_some_and(|p| !p.is_spectator()))
            })
            .collect()
    }

    /// Teams below the per-team cap.
    pub fn reachable_teams(&self) -> Vec<&T> {
        let cap = self.settings.size().max_per_team;
        self.teams.iter().filter(|team| team.len() < cap).collect()
    }

    /// All teams.
    pub fn teams(&self) -> &[T] {
        &self.teams
    }

    /// The team `id` belongs to.
    pub fn team_of(&self, id: ParticipantId) -> Option<&T> {
        self.teams.iter().find(|team| team.is_member(id))
    }

    /// Index of the team `id` belongs to.
    pub fn team_index_of(&self, id: ParticipantId) -> Option<usize> {
        self.teams.iter().position(|team| team.is_member(id))
    }

    /// The team seeded for `color`.
    pub fn team_by_color(&self, color: TeamColor) -> Option<&T> {
        self.teams.iter().find(|team| team.color() == color)
    }

    /// Alive participant count.
    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| !p.is_spectator()).count()
    }

    /// Spectator count.
    pub fn spectator_count(&self) -> usize {
        self.players.values().filter(|p| p.is_spectator()).count()
    }

    /// Total participant count, spectators included.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody is in the session.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether enough alive participants are present to start.
    pub fn can_start(&self) -> bool {
        self.alive_count() >= self.settings.size().min_players
    }

    /// Whether the alive count reached the size-policy maximum.
    pub fn is_full(&self) -> bool {
        self.alive_count() >= self.settings.size().max_players
    }

    /// Whether another alive participant fits.
    pub fn can_join(&self) -> bool {
        self.alive_count() < self.settings.size().max_players
    }

    /// Whether exactly one team still has alive members — the usual
    /// end-of-match condition.
    pub fn one_team_alive(&self) -> bool {
        self.alive_teams().len() == 1
    }

    // ------------------------------------------------------------------
    // Team assignment
    // ------------------------------------------------------------------

    /// Put a participant on the team of `color`, leaving any current team
    /// first. Reassignment to the same team is a no-op that succeeds.
    pub fn add_to_team(&mut self, id: ParticipantId, color: TeamColor) -> Result<(), SessionError> {
        if !self.contains(id) {
            return Err(SessionError::NotInSession);
        }
        let cap = self.settings.size().max_per_team;
        let index = self
            .teams
            .iter()
            .position(|team| team.color() == color)
            .ok_or(SessionError::TeamNotFound)?;
        if self.teams[index].is_member(id) {
            return Ok(());
        }
        if self.teams[index].len() >= cap {
            return Err(SessionError::TeamFull);
        }
        self.remove_from_team(id);
        self.teams[index].add_member(id);
        debug!(
            session = %self.full_name(),
            participant = %id,
            team = self.teams[index].name(),
            "team assigned"
        );
        Ok(())
    }

    /// Drop the participant's team membership, if any.
    pub fn remove_from_team(&mut self, id: ParticipantId) {
        if let Some(index) = self.team_index_of(id) {
            self.teams[index].remove_member(id);
        }
    }

    /// Least-loaded team below the per-team cap, lowest index on ties.
    pub fn team_with_fewest_members(&self) -> Option<TeamColor> {
        let cap = self.settings.size().max_per_team;
        self.teams
            .iter()
            .filter(|team| team.len() < cap)
            .min_by_key(|team| team.len())
            .map(|team| team.color())
    }

    /// Uniformly random team below the per-team cap.
    pub fn random_reachable_team(&self) -> Option<TeamColor> {
        let reachable = self.reachable_teams();
        if reachable.is_empty() {
            return None;
        }
        let pick = rand::thread_rng().gen_range(0..reachable.len());
        Some(reachable[pick].color())
    }

    /// Assign every unassigned alive participant to the least-loaded
    /// reachable team. One pass; not a rebalancer, and a second call once
    /// everyone is placed is a no-op.
    pub fn fill_unassigned(&mut self) {
        let unassigned: Vec<ParticipantId> = self
            .players
            .values()
            .filter(|p| !p.is_spectator() && self.team_index_of(p.id()).is_none())
            .map(|p| p.id())
            .collect();
        for id in unassigned {
            match self.team_with_fewest_members() {
                Some(color) => {
                    let _ = self.add_to_team(id, color);
                }
                None => break,
            }
        }
    }

    // ------------------------------------------------------------------
    // Host
    // ------------------------------------------------------------------

    /// Host metadata, if this is a hosted session.
    pub fn host(&self) -> Option<&SessionHost> {
        self.host.as_ref()
    }

    /// Mutable host metadata.
    pub fn host_mut(&mut self) -> Option<&mut SessionHost> {
        self.host.as_mut()
    }

    /// Attach or detach host metadata.
    pub fn set_host(&mut self, host: Option<SessionHost>) {
        self.host = host;
    }

    /// Whether this is a hosted session.
    pub fn is_hosted(&self) -> bool {
        self.host.is_some()
    }

    /// Whether the host record exists and is in `state`.
    pub fn host_state_is(&self, state: HostState) -> bool {
        self.host.as_ref().is_some_and(|host| host.state() == state)
    }

    // ------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------

    /// Append a phase to the session's lifecycle.
    pub fn add_phase(&mut self, phase: Box<dyn SessionPhase<Self>>) {
        self.phases.add_phase(phase);
    }

    /// Enter the first phase and mark the session running.
    ///
    /// # Panics
    ///
    /// Panics if no phases were added.
    pub fn start_phases(&mut self) {
        let mut phases = std::mem::take(&mut self.phases);
        phases.start(self);
        self.phases = phases;
        self.state = SessionState::Running;
        self.emit_phase_changed();
    }

    /// Phase at `from` signalled completion; running past the last phase
    /// ends the session.
    pub fn complete_phase(&mut self, from: usize) -> PhaseOutcome {
        let mut phases = std::mem::take(&mut self.phases);
        let outcome = phases.complete(from, self);
        self.phases = phases;
        if outcome == PhaseOutcome::Completed {
            self.state = SessionState::Ended;
        }
        self.emit_phase_changed();
        outcome
    }

    /// Phase at `from` was cancelled; retreats or restarts.
    pub fn cancel_phase(&mut self, from: usize) -> PhaseOutcome {
        let mut phases = std::mem::take(&mut self.phases);
        let outcome = phases.cancel(from, self);
        self.phases = phases;
        self.emit_phase_changed();
        outcome
    }

    /// Complete the current phase, if one is running.
    pub fn complete_current_phase(&mut self) -> Option<PhaseOutcome> {
        self.phases.current_index().map(|index| self.complete_phase(index))
    }

    /// Cancel the current phase, if one is running.
    pub fn cancel_current_phase(&mut self) -> Option<PhaseOutcome> {
        self.phases.current_index().map(|index| self.cancel_phase(index))
    }

    /// Name of the current phase.
    pub fn current_phase(&self) -> Option<&'static str> {
        self.phases.current_name()
    }

    /// Number of phases remaining in the list.
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Tear down every phase and mark the session ended; used when the
    /// session unloads outside the normal phase flow.
    pub fn unload(&mut self) {
        self.phases.teardown_all();
        self.host = None;
        self.state = SessionState::Ended;
        self.ctx.events.emit(SessionEvent::SessionEnded {
            name: self.name.clone(),
            id: self.id,
        });
        debug!(session = %self.full_name(), "session unloaded");
    }

    fn emit_phase_changed(&self) {
        self.ctx.events.emit(SessionEvent::PhaseChanged {
            session: self.id,
            phase: self.phases.current_name().map(str::to_string),
        });
    }

    // ------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------

    /// Send a message to every participant.
    pub fn broadcast(&self, message: &str) {
        for id in self.players.keys() {
            self.ctx.directory.send_message(*id, message);
        }
    }

    /// Send a message to participants matching `filter`.
    pub fn broadcast_filtered(&self, filter: impl Fn(&P) -> bool, message: &str) {
        for player in self.players.values().filter(|p| filter(p)) {
            self.ctx.directory.send_message(player.id(), message);
        }
    }

    /// Multi-line state dump for operators.
    pub fn debug_summary(&self) -> String {
        let size = self.settings.size();
        let mut lines = vec![
            format!("session: {}", self.full_name()),
            format!(
                "size: type={}, min={}, max={}, teams={}, per-team={}",
                size.name, size.min_players, size.max_players, size.teams, size.max_per_team
            ),
            format!("state: {:?}", self.state),
        ];
        if let Some(phase) = self.current_phase() {
            lines.push(format!("phase: {phase}"));
        }
        if let Some(host) = &self.host {
            lines.push(format!(
                "host: {} ({:?}), co-hosts: {}",
                self.ctx.directory.display_name(host.holder()),
                host.state(),
                host.co_hosts().len()
            ));
        }
        for team in &self.teams {
            let members: Vec<String> = team
                .members()
                .iter()
                .map(|id| self.ctx.directory.display_name(*id))
                .collect();
            lines.push(format!("team {}: {}", team.name(), members.join(", ")));
        }
        lines.push(format!(
            "players: {} ({} alive | {} spectating)",
            self.len(),
            self.alive_count(),
            self.spectator_count()
        ));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::InMemoryDirectory;
    use crate::core::scheduler::TokioScheduler;
    use crate::session::phase::PhaseResources;
    use crate::session::player::BasePlayer;
    use crate::session::settings::{BaseSettings, SizePolicy, WorldId};
    use crate::session::team::BaseTeam;
    use proptest::prelude::*;

    type TestSession = Session<BasePlayer, BaseTeam, BaseSettings>;

    fn test_context() -> EngineContext {
        EngineContext::new(
            Arc::new(TokioScheduler),
            Arc::new(InMemoryDirectory::new()),
        )
    }

    fn session_with_policy(policy: SizePolicy) -> TestSession {
        Session::new(
            "skirmish",
            BaseSettings::new(policy, WorldId::new("arena")),
            test_context(),
        )
    }

    fn four_player_session() -> (TestSession, Vec<ParticipantId>) {
        let mut session = session_with_policy(SizePolicy::new("2v2", 2, 4, 2, 2));
        let ids: Vec<ParticipantId> = (0..4).map(|_| ParticipantId::new()).collect();
        for id in &ids {
            session.join(*id, false).unwrap();
        }
        (session, ids)
    }

    #[tokio::test]
    async fn join_is_rejected_when_duplicate_or_full() {
        let (mut session, ids) = four_player_session();

        assert_eq!(
            session.join(ids[0], false),
            Err(SessionError::AlreadyInSession)
        );
        assert_eq!(
            session.join(ParticipantId::new(), false),
            Err(SessionError::SessionFull)
        );
        // Spectators bypass the alive cap.
        session.join(ParticipantId::new(), true).unwrap();
        assert_eq!(session.len(), 5);
    }

    #[tokio::test]
    async fn capacity_predicates_follow_the_policy() {
        let (session, _) = four_player_session();

        assert!(session.can_start());
        assert!(session.is_full());
        assert!(!session.can_join());
    }

    #[tokio::test]
    async fn leave_clears_team_membership() {
        let (mut session, ids) = four_player_session();
        session.add_to_team(ids[0], TeamColor::Red).unwrap();

        session.leave(ids[0]).unwrap();

        assert!(!session.contains(ids[0]));
        assert!(session.team_by_color(TeamColor::Red).unwrap().is_empty());
        assert_eq!(session.leave(ids[0]), Err(SessionError::NotInSession));
    }

    #[tokio::test]
    async fn reassignment_moves_between_teams() {
        let (mut session, ids) = four_player_session();

        session.add_to_team(ids[0], TeamColor::Red).unwrap();
        session.add_to_team(ids[0], TeamColor::Blue).unwrap();

        assert_eq!(
            session.team_of(ids[0]).unwrap().color(),
            TeamColor::Blue
        );
        assert!(session.team_by_color(TeamColor::Red).unwrap().is_empty());
    }

    #[tokio::test]
    async fn team_cap_is_enforced() {
        let (mut session, ids) = four_player_session();

        session.add_to_team(ids[0], TeamColor::Red).unwrap();
        session.add_to_team(ids[1], TeamColor::Red).unwrap();
        assert_eq!(
            session.add_to_team(ids[2], TeamColor::Red),
            Err(SessionError::TeamFull)
        );
    }

    #[tokio::test]
    async fn fill_unassigned_balances_two_teams_of_two() {
        let (mut session, _) = four_player_session();

        session.fill_unassigned();

        let sizes: Vec<usize> = session.teams().iter().map(|t| t.len()).collect();
        assert_eq!(sizes, vec![2, 2]);
        assert_eq!(session.players_without_team().len(), 0);

        // Idempotent once everyone is placed.
        session.fill_unassigned();
        let sizes: Vec<usize> = session.teams().iter().map(|t| t.len()).collect();
        assert_eq!(sizes, vec![2, 2]);
    }

    #[tokio::test]
    async fn alive_teams_ignore_spectator_only_teams() {
        let (mut session, ids) = four_player_session();
        session.add_to_team(ids[0], TeamColor::Red).unwrap();
        session.add_to_team(ids[1], TeamColor::Blue).unwrap();

        session.player_mut(ids[0]).unwrap().set_spectator(true);

        let alive: Vec<_> = session.alive_teams().iter().map(|t| t.color()).collect();
        assert_eq!(alive, vec![TeamColor::Blue]);
        assert!(session.one_team_alive());
    }

    struct NamedPhase(&'static str);

    impl SessionPhase<TestSession> for NamedPhase {
        fn name(&self) -> &'static str {
            self.0
        }

        fn on_start(&mut self, _session: &mut TestSession, _resources: &mut PhaseResources) {}
    }

    #[tokio::test]
    async fn phase_walk_ends_the_session() {
        let (mut session, _) = four_player_session();
        session.add_phase(Box::new(NamedPhase("lobby")));
        session.add_phase(Box::new(NamedPhase("playing")));
        session.add_phase(Box::new(NamedPhase("end")));

        session.start_phases();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.current_phase(), Some("lobby"));

        assert_eq!(
            session.complete_current_phase(),
            Some(PhaseOutcome::Advanced)
        );
        assert_eq!(session.current_phase(), Some("playing"));

        session.complete_current_phase();
        assert_eq!(session.current_phase(), Some("end"));

        assert_eq!(
            session.complete_current_phase(),
            Some(PhaseOutcome::Completed)
        );
        assert_eq!(session.current_phase(), None);
        assert_eq!(session.phase_count(), 0);
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[tokio::test]
    async fn unload_emits_session_ended() {
        let ctx = test_context();
        let mut rx = ctx.events.subscribe();
        let mut session: TestSession = Session::new(
            "skirmish",
            BaseSettings::new(SizePolicy::default(), WorldId::new("arena")),
            ctx,
        );
        session.add_phase(Box::new(NamedPhase("lobby")));
        session.start_phases();

        session.unload();

        assert_eq!(session.state(), SessionState::Ended);
        assert_eq!(session.current_phase(), None);
        let mut saw_ended = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, SessionEvent::SessionEnded { .. }) {
                saw_ended = true;
            }
        }
        assert!(saw_ended);
    }

    #[tokio::test]
    async fn hosted_sessions_carry_host_in_full_name() {
        let (mut session, ids) = four_player_session();
        assert!(!session.full_name().contains("Host"));

        session.set_host(Some(SessionHost::new(ids[0])));

        assert!(session.is_hosted());
        assert!(session.host_state_is(HostState::Private));
        assert!(session.full_name().contains("Host"));
    }

    fn team_sizes(session: &TestSession) -> Vec<usize> {
        session.teams().iter().map(|t| t.len()).collect()
    }

    proptest! {
        #[test]
        fn fill_unassigned_never_violates_invariants(
            players in 0usize..24,
            teams in 1usize..6,
            max_per_team in 1usize..6,
        ) {
            let policy = SizePolicy::new("prop", 2, 24, teams, max_per_team);
            let mut session = session_with_policy(policy);
            let ids: Vec<ParticipantId> =
                (0..players).map(|_| ParticipantId::new()).collect();
            for id in &ids {
                let _ = session.join(*id, false);
            }

            session.fill_unassigned();

            // No double membership, and the per-team cap holds.
            let assigned: usize = team_sizes(&session).iter().sum();
            prop_assert_eq!(assigned, session.players_with_team().len());
            for size in team_sizes(&session) {
                prop_assert!(size <= max_per_team);
            }

            // A second pass changes nothing.
            let before = team_sizes(&session);
            session.fill_unassigned();
            prop_assert_eq!(before, team_sizes(&session));
        }
    }
}
