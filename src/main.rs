//! Arena Engine Demo
//!
//! Drives the engine end to end: a team session walked through its
//! phases, a join queue promoting a waiting participant, and a duel
//! brokered through the invitation ledger.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use arena_engine::{
    BasePlayer, BaseSettings, BaseTeam, DuelSelection, DuelService, EngineContext,
    InMemoryDirectory, JoinQueue, ParticipantId, PhaseResources, Session, SessionPhase,
    SessionRegistry, SizePolicy, TokioScheduler, WorldId, DUEL_SESSION_NAME, VERSION,
};

type DemoSession = Session<BasePlayer, BaseTeam, BaseSettings>;
type DemoRegistry = SessionRegistry<BasePlayer, BaseTeam, BaseSettings>;

struct LoggedPhase(&'static str);

impl SessionPhase<DemoSession> for LoggedPhase {
    fn name(&self) -> &'static str {
        self.0
    }

    fn on_start(&mut self, session: &mut DemoSession, _resources: &mut PhaseResources) {
        session.broadcast(&format!("entering {}", self.0));
    }

    fn on_end(&mut self, session: &mut DemoSession) {
        session.broadcast(&format!("leaving {}", self.0));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Arena Engine v{}", VERSION);

    let directory = Arc::new(InMemoryDirectory::new());
    let ctx = EngineContext::new(Arc::new(TokioScheduler), directory.clone());
    let registry = Arc::new(DemoRegistry::new(ctx.clone()));

    let players: Vec<ParticipantId> = (0..5)
        .map(|i| {
            let id = ParticipantId::new();
            directory.register(id, format!("player{i}"));
            id
        })
        .collect();

    // --- A 2v2 session walked through its phases -----------------------
    let mut session = DemoSession::new(
        "skirmish",
        BaseSettings::new(SizePolicy::new("2v2", 2, 4, 2, 2), WorldId::new("arena_1")),
        ctx.clone(),
    );
    session.add_phase(Box::new(LoggedPhase("lobby")));
    session.add_phase(Box::new(LoggedPhase("playing")));
    session.add_phase(Box::new(LoggedPhase("end")));
    let handle = registry.add_session("skirmish", session).await;

    for id in &players[..4] {
        registry.join(&handle, *id).await?;
    }

    {
        let mut session = handle.write().await;
        session.fill_unassigned();
        info!(
            can_start = session.can_start(),
            full = session.is_full(),
            "session filled"
        );
        info!("\n{}", session.debug_summary());

        session.start_phases();
        while session.complete_current_phase().is_some() {}
        info!(state = ?session.state(), "phase walk finished");
    }

    // --- Queue promotion ----------------------------------------------
    let queue = JoinQueue::new(handle.clone(), &ctx);
    queue.add(players[4]);
    info!(position = ?queue.position(players[4]), "queued fifth player");

    registry.leave(players[0]).await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    info!(
        promoted = handle.read().await.contains(players[4]),
        "queue tick ran"
    );

    registry.end_session(&handle).await;

    // --- A duel from invite to session --------------------------------
    let duels = DuelService::new(
        registry.clone(),
        Box::new(|ctx, request| {
            let mut session = DemoSession::new(
                DUEL_SESSION_NAME,
                BaseSettings::new(
                    SizePolicy::new("1v1", 2, 2, 2, 1),
                    WorldId::new(format!("duel_{}", request.payload.map)),
                ),
                ctx.clone(),
            );
            session.add_phase(Box::new(LoggedPhase("fight")));
            session
        }),
    );

    duels
        .send_invite(
            players[1],
            players[2],
            DuelSelection {
                map: "ruins".to_string(),
                kit: "classic".to_string(),
                knockback: "standard".to_string(),
            },
        )
        .await;
    let duel = duels
        .accept(players[1], players[2])
        .await
        .expect("invite was just sent");
    info!(
        session = %duel.read().await.full_name(),
        "duel session running"
    );
    registry.end_session(&duel).await;

    info!(sessions = registry.session_count().await, "demo finished");
    Ok(())
}
