//! # Arena Engine
//!
//! Session-orchestration engine for running many concurrent, short-lived
//! multiplayer game sessions in a single process.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ARENA ENGINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Runtime primitives                        │
//! │  ├── scheduler.rs- Injected timer scheduler + task handles   │
//! │  ├── timer.rs    - Countdown timer with per-second hooks     │
//! │  └── context.rs  - Engine context, directory collaborator    │
//! │                                                              │
//! │  session/        - Session orchestration                     │
//! │  ├── player.rs   - Participant identity and capability trait │
//! │  ├── team.rs     - Team colors, membership                   │
//! │  ├── settings.rs - Size policy and session settings          │
//! │  ├── phase.rs    - Ordered phase state machine               │
//! │  ├── queue.rs    - FIFO join queue with periodic promotion   │
//! │  ├── host.rs     - Session host metadata                     │
//! │  ├── events.rs   - Lifecycle event bus and subscriptions     │
//! │  ├── session.rs  - Session: players, teams, phases, host     │
//! │  └── registry.rs - Name-indexed session registry             │
//! │                                                              │
//! │  social/         - Invitation-driven grouping                │
//! │  ├── request.rs  - Generic timed-invitation ledger           │
//! │  ├── duel.rs     - Duel invitations -> new sessions          │
//! │  └── party.rs    - Persistent parties with leader election   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! Every `Session` lives behind its own `tokio::sync::RwLock`, so at most
//! one mutating operation is in flight per session at a time. The registry
//! index, request ledgers, and party list are `RwLock`-guarded containers;
//! registry scans snapshot a bucket before touching individual sessions, so
//! a session removed mid-scan never invalidates iteration. Timers (queue
//! promotion, request expiry, phase tasks) run as scheduler tasks whose
//! handles abort on drop — tearing a component down cancels its timers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod session;
pub mod social;

pub use crate::core::context::{Directory, EngineContext, InMemoryDirectory};
pub use crate::core::scheduler::{Scheduler, TaskHandle, TokioScheduler};
pub use crate::core::timer::CountdownTimer;
pub use crate::session::events::{EventBus, SessionEvent, SubscriptionHandle};
pub use crate::session::host::{HostState, SessionHost};
pub use crate::session::phase::{PhaseManager, PhaseOutcome, PhaseResources, SessionPhase};
pub use crate::session::player::{BasePlayer, ParticipantId, PlayerCore, SessionPlayer};
pub use crate::session::queue::JoinQueue;
pub use crate::session::registry::SessionRegistry;
pub use crate::session::session::{Session, SessionError, SessionHandle, SessionId, SessionState};
pub use crate::session::settings::{BaseSettings, SessionSettings, SettingsCore, SizePolicy, WorldId};
pub use crate::session::team::{BaseTeam, SessionTeam, TeamColor, TeamCore};
pub use crate::social::duel::{DuelSelection, DuelService, DuelSessionFactory, DUEL_SESSION_NAME};
pub use crate::social::party::{Party, PartyService};
pub use crate::social::request::{Request, RequestId, RequestLedger};

use std::time::Duration;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Period between join-queue promotion ticks
pub const QUEUE_PROMOTE_PERIOD: Duration = Duration::from_secs(1);

/// Default lifetime of an unanswered duel invitation
pub const DEFAULT_DUEL_EXPIRY: Duration = Duration::from_secs(25);

/// Default lifetime of an unanswered party invitation
pub const DEFAULT_PARTY_INVITE_EXPIRY: Duration = Duration::from_secs(5);
