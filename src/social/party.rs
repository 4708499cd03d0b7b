//! Parties
//!
//! Persistent participant groups that outlive individual sessions. One
//! leader per party; a departing leader hands off to an arbitrary
//! remaining member, and a party with no members left is destroyed.
//! Invitations reuse the request ledger with a short expiry.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::context::EngineContext;
use crate::session::player::{ParticipantId, SessionPlayer};
use crate::session::registry::SessionRegistry;
use crate::session::session::SessionError;
use crate::session::settings::SessionSettings;
use crate::session::team::SessionTeam;
use crate::social::request::RequestLedger;
use crate::DEFAULT_PARTY_INVITE_EXPIRY;

/// Default member cap for new parties.
pub const DEFAULT_PARTY_CAPACITY: usize = 5;

/// A persistent group of participants with one leader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    leader: ParticipantId,
    name: String,
    max_members: usize,
    open: bool,
    members: BTreeSet<ParticipantId>,
}

impl Party {
    /// New closed party containing only its leader.
    pub fn new(leader: ParticipantId, leader_name: &str) -> Self {
        Self {
            leader,
            name: format!("{leader_name}'s party"),
            max_members: DEFAULT_PARTY_CAPACITY,
            open: false,
            members: BTreeSet::from([leader]),
        }
    }

    /// The current leader.
    pub fn leader(&self) -> ParticipantId {
        self.leader
    }

    /// Whether `id` leads this party.
    pub fn is_leader(&self, id: ParticipantId) -> bool {
        self.leader == id
    }

    /// Party display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member cap.
    pub fn max_members(&self) -> usize {
        self.max_members
    }

    /// Whether anyone may join without an invite.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Member ids, leader included.
    pub fn members(&self) -> &BTreeSet<ParticipantId> {
        &self.members
    }

    /// Whether `id` is a member.
    pub fn is_member(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }

    /// Member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the party has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the member cap is reached.
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_members
    }

    fn add_member(&mut self, id: ParticipantId) {
        self.members.insert(id);
    }

    fn remove_member(&mut self, id: ParticipantId) {
        self.members.remove(&id);
    }

    /// Hand leadership to an arbitrary member other than the current
    /// leader, if one exists.
    fn elect_new_leader(&mut self) -> Option<ParticipantId> {
        let successor = self
            .members
            .iter()
            .find(|member| **member != self.leader)
            .copied()?;
        self.leader = successor;
        Some(successor)
    }

    fn kick_all_but_leader(&mut self) {
        let leader = self.leader;
        self.members.retain(|member| *member == leader);
    }
}

/// Party membership and invitation flow.
pub struct PartyService<P, T, S> {
    registry: Arc<SessionRegistry<P, T, S>>,
    parties: RwLock<Vec<Party>>,
    invites: RequestLedger<()>,
    ctx: EngineContext,
}

impl<P, T, S> PartyService<P, T, S>
where
    P: SessionPlayer,
    T: SessionTeam,
    S: SessionSettings,
{
    /// Party service with the default invite expiry.
    pub fn new(registry: Arc<SessionRegistry<P, T, S>>) -> Self {
        Self::with_expiry(registry, DEFAULT_PARTY_INVITE_EXPIRY)
    }

    /// Party service whose invites expire after `expiry`.
    pub fn with_expiry(registry: Arc<SessionRegistry<P, T, S>>, expiry: Duration) -> Self {
        let ctx = registry.context().clone();
        Self {
            registry,
            parties: RwLock::new(Vec::new()),
            invites: RequestLedger::new("party", expiry, ctx.clone()),
            ctx,
        }
    }

    /// The underlying invite ledger.
    pub fn invites(&self) -> &RequestLedger<()> {
        &self.invites
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Create a party led by `leader`. No-op when they already belong to
    /// one; returns whether a party was created.
    pub async fn create_party(&self, leader: ParticipantId) -> bool {
        let mut parties = self.parties.write().await;
        if parties.iter().any(|party| party.is_member(leader)) {
            return false;
        }
        let party = Party::new(leader, &self.ctx.directory.display_name(leader));
        debug!(leader = %leader, name = %party.name(), "party created");
        parties.push(party);
        true
    }

    /// The party `id` belongs to.
    pub async fn party_of(&self, id: ParticipantId) -> Option<Party> {
        self.parties
            .read()
            .await
            .iter()
            .find(|party| party.is_member(id))
            .cloned()
    }

    /// The party `id` leads.
    pub async fn party_led_by(&self, id: ParticipantId) -> Option<Party> {
        self.parties
            .read()
            .await
            .iter()
            .find(|party| party.is_leader(id))
            .cloned()
    }

    /// Whether `id` leads a party.
    pub async fn is_leader(&self, id: ParticipantId) -> bool {
        self.party_led_by(id).await.is_some()
    }

    /// Whether `id` belongs to any party.
    pub async fn is_in_party(&self, id: ParticipantId) -> bool {
        self.party_of(id).await.is_some()
    }

    /// Parties below their member cap.
    pub async fn reachable_parties(&self) -> Vec<Party> {
        self.parties
            .read()
            .await
            .iter()
            .filter(|party| !party.is_full())
            .cloned()
            .collect()
    }

    /// Join the party led by `leader`.
    ///
    /// Allowed when the party is open or the participant holds an invite
    /// from the leader, and the party is not full. Joining consumes the
    /// invite and leaves any prior party.
    pub async fn join(&self, participant: ParticipantId, leader: ParticipantId) -> bool {
        let invited = self.invites.find(leader, participant).await.is_some();
        {
            let parties = self.parties.read().await;
            let Some(party) = parties.iter().find(|party| party.is_leader(leader)) else {
                return false;
            };
            if !(party.is_open() || invited) || party.is_full() {
                return false;
            }
        }

        self.invites.remove(leader, participant).await;
        self.leave(participant).await;

        let mut parties = self.parties.write().await;
        let Some(party) = parties.iter_mut().find(|party| party.is_leader(leader)) else {
            return false;
        };
        if party.is_full() {
            return false;
        }
        party.add_member(participant);
        debug!(participant = %participant, party = %party.name(), "joined party");
        true
    }

    /// Leave whichever party holds the participant. A departing leader
    /// hands off first; an emptied party is destroyed.
    pub async fn leave(&self, participant: ParticipantId) {
        let mut parties = self.parties.write().await;
        let Some(index) = parties.iter().position(|party| party.is_member(participant)) else {
            return;
        };
        let party = &mut parties[index];
        if party.is_leader(participant) {
            if let Some(successor) = party.elect_new_leader() {
                debug!(
                    party = %party.name(),
                    leader = %successor,
                    "party leadership transferred"
                );
            }
        }
        party.remove_member(participant);
        if party.is_empty() {
            debug!(party = %party.name(), "party destroyed");
            parties.swap_remove(index);
        }
    }

    /// Leave and drop every party invite touching the participant.
    pub async fn disconnect(&self, participant: ParticipantId) {
        self.leave(participant).await;
        self.invites.remove_all_for(participant).await;
    }

    /// Kick every member except the leader.
    pub async fn kick_all(&self, leader: ParticipantId) -> bool {
        let mut parties = self.parties.write().await;
        match parties.iter_mut().find(|party| party.is_leader(leader)) {
            Some(party) => {
                party.kick_all_but_leader();
                true
            }
            None => false,
        }
    }

    /// Open or close the leader's party to uninvited joins.
    pub async fn set_open(&self, leader: ParticipantId, open: bool) -> bool {
        let mut parties = self.parties.write().await;
        match parties.iter_mut().find(|party| party.is_leader(leader)) {
            Some(party) => {
                party.open = open;
                true
            }
            None => false,
        }
    }

    /// Send a message to every member of the participant's party.
    pub async fn broadcast(&self, member: ParticipantId, message: &str) {
        if let Some(party) = self.party_of(member).await {
            for id in party.members() {
                self.ctx.directory.send_message(*id, message);
            }
        }
    }

    // ------------------------------------------------------------------
    // Invitations
    // ------------------------------------------------------------------

    /// Invite `target` to the sender's party.
    pub async fn send_invite(&self, sender: ParticipantId, target: ParticipantId) -> bool {
        self.invites.send_request(sender, target, ()).await
    }

    /// Withdraw an outstanding invite.
    pub async fn cancel_invite(&self, sender: ParticipantId, target: ParticipantId) -> bool {
        self.invites.cancel(sender, target).await
    }

    // ------------------------------------------------------------------
    // Party-aware session join
    // ------------------------------------------------------------------

    /// Bring the whole party into the leader's current session.
    ///
    /// Verifies that every not-yet-joined member fits before joining any
    /// of them; returns how many members were brought in.
    pub async fn join_session_with_party(
        &self,
        leader: ParticipantId,
    ) -> Result<usize, SessionError> {
        let party = self
            .party_led_by(leader)
            .await
            .ok_or(SessionError::NotInSession)?;
        let session = self
            .registry
            .session_of(leader)
            .await
            .ok_or(SessionError::SessionNotFound)?;

        let mut missing = Vec::new();
        for member in party.members() {
            if !self.registry.is_in_session(*member).await {
                missing.push(*member);
            }
        }

        {
            let session = session.read().await;
            if session.alive_count() + missing.len() > session.settings().size().max_players {
                return Err(SessionError::SessionFull);
            }
        }

        for member in &missing {
            let _ = self.registry.join(&session, *member).await;
        }
        Ok(missing.len())
    }
}
