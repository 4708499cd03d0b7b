//! Duels
//!
//! One-on-one challenges brokered through a [`RequestLedger`]. Accepting
//! an invite builds a fresh session via an injected factory, registers it
//! under the duel name, and joins both fighters.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::context::EngineContext;
use crate::session::player::{ParticipantId, SessionPlayer};
use crate::session::registry::SessionRegistry;
use crate::session::session::{Session, SessionHandle};
use crate::session::settings::SessionSettings;
use crate::session::team::SessionTeam;
use crate::social::request::{Request, RequestLedger};
use crate::DEFAULT_DUEL_EXPIRY;

/// Registry name duel sessions are filed under.
pub const DUEL_SESSION_NAME: &str = "duel";

/// What the challenger picked for the duel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelSelection {
    /// Selected map.
    pub map: String,
    /// Selected kit.
    pub kit: String,
    /// Selected knockback profile.
    pub knockback: String,
}

/// Builds the session an accepted duel plays in. Receives the registry's
/// engine context so the session shares the same event bus and scheduler.
pub type DuelSessionFactory<P, T, S> =
    Box<dyn Fn(&EngineContext, &Request<DuelSelection>) -> Session<P, T, S> + Send + Sync>;

/// Duel invitation flow.
pub struct DuelService<P, T, S> {
    registry: Arc<SessionRegistry<P, T, S>>,
    requests: RequestLedger<DuelSelection>,
    factory: DuelSessionFactory<P, T, S>,
}

impl<P, T, S> DuelService<P, T, S>
where
    P: SessionPlayer,
    T: SessionTeam,
    S: SessionSettings,
{
    /// Duel service with the default invite expiry.
    pub fn new(registry: Arc<SessionRegistry<P, T, S>>, factory: DuelSessionFactory<P, T, S>) -> Self {
        Self::with_expiry(registry, factory, DEFAULT_DUEL_EXPIRY)
    }

    /// Duel service whose invites expire after `expiry`.
    pub fn with_expiry(
        registry: Arc<SessionRegistry<P, T, S>>,
        factory: DuelSessionFactory<P, T, S>,
        expiry: Duration,
    ) -> Self {
        let requests = RequestLedger::new("duel", expiry, registry.context().clone());
        Self {
            registry,
            requests,
            factory,
        }
    }

    /// The underlying invite ledger.
    pub fn requests(&self) -> &RequestLedger<DuelSelection> {
        &self.requests
    }

    /// Challenge `target`. Idempotent per pair; returns whether an invite
    /// was created.
    pub async fn send_invite(
        &self,
        sender: ParticipantId,
        target: ParticipantId,
        selection: DuelSelection,
    ) -> bool {
        self.requests.send_request(sender, target, selection).await
    }

    /// Target accepts the challenge from `sender`: the invite is
    /// consumed, a duel session spun up, and both fighters joined.
    pub async fn accept(
        &self,
        sender: ParticipantId,
        target: ParticipantId,
    ) -> Option<SessionHandle<P, T, S>> {
        let request = self.requests.take(sender, target).await?;
        let session = (self.factory)(self.registry.context(), &request);
        info!(
            sender = %request.sender,
            target = %request.target,
            map = %request.payload.map,
            "duel accepted"
        );
        let handle = self.registry.add_session(DUEL_SESSION_NAME, session).await;
        let _ = self.registry.join(&handle, request.sender).await;
        let _ = self.registry.join(&handle, request.target).await;
        Some(handle)
    }

    /// Withdraw an outstanding challenge.
    pub async fn cancel(&self, sender: ParticipantId, target: ParticipantId) -> bool {
        self.requests.cancel(sender, target).await
    }

    /// Drop every invite touching a disconnecting participant.
    pub async fn disconnect(&self, participant: ParticipantId) {
        self.requests.remove_all_for(participant).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{EngineContext, InMemoryDirectory};
    use crate::core::scheduler::TokioScheduler;
    use crate::session::player::BasePlayer;
    use crate::session::settings::{BaseSettings, SizePolicy, WorldId};
    use crate::session::team::BaseTeam;

    type TestService = DuelService<BasePlayer, BaseTeam, BaseSettings>;

    fn service_with_directory() -> (TestService, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let ctx = EngineContext::new(Arc::new(TokioScheduler), directory.clone());
        let registry = Arc::new(SessionRegistry::new(ctx));
        let factory: DuelSessionFactory<BasePlayer, BaseTeam, BaseSettings> =
            Box::new(|ctx, _request| {
                Session::new(
                    DUEL_SESSION_NAME,
                    BaseSettings::new(
                        SizePolicy::new("1v1", 2, 2, 2, 1),
                        WorldId::new("duel_arena"),
                    ),
                    ctx.clone(),
                )
            });
        (DuelService::new(registry, factory), directory)
    }

    fn selection() -> DuelSelection {
        DuelSelection {
            map: "ruins".to_string(),
            kit: "classic".to_string(),
            knockback: "standard".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn accept_creates_session_and_joins_both() {
        let (service, directory) = service_with_directory();
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        directory.register(a, "alice");
        directory.register(b, "bob");

        assert!(service.send_invite(a, b, selection()).await);
        // Duplicate before acceptance: still exactly one request.
        assert!(!service.send_invite(a, b, selection()).await);
        assert_eq!(service.requests().len().await, 1);

        let handle = service.accept(a, b).await.unwrap();

        assert!(service.requests().is_empty().await);
        let session = handle.read().await;
        assert!(session.contains(a));
        assert!(session.contains(b));
        assert!(session.is_full());
    }

    #[tokio::test(start_paused = true)]
    async fn accept_without_invite_is_a_noop() {
        let (service, _) = service_with_directory();
        assert!(service
            .accept(ParticipantId::new(), ParticipantId::new())
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_clears_pending_invites() {
        let (service, directory) = service_with_directory();
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        directory.register(a, "alice");
        directory.register(b, "bob");

        service.send_invite(a, b, selection()).await;
        service.disconnect(b).await;

        assert!(service.requests().is_empty().await);
        assert!(service.accept(a, b).await.is_none());
    }
}
