//! Session orchestration.
//!
//! Sessions aggregate a player table, teams, a phase state machine, and
//! optional host metadata; the registry indexes them by logical name.

pub mod events;
pub mod host;
pub mod phase;
pub mod player;
pub mod queue;
pub mod registry;
pub mod session;
pub mod settings;
pub mod team;

pub use events::{EventBus, SessionEvent, SubscriptionHandle};
pub use host::{HostState, SessionHost};
pub use phase::{PhaseManager, PhaseOutcome, PhaseResources, SessionPhase};
pub use player::{BasePlayer, ParticipantId, PlayerCore, SessionPlayer};
pub use queue::JoinQueue;
pub use registry::SessionRegistry;
pub use session::{Session, SessionError, SessionHandle, SessionId, SessionState};
pub use settings::{BaseSettings, SessionSettings, SettingsCore, SizePolicy, WorldId};
pub use team::{BaseTeam, SessionTeam, TeamColor, TeamCore};
