//! Participants
//!
//! Stable participant identity plus the capability trait a session's
//! player type implements. Games embed [`PlayerCore`] in their own player
//! struct (kills, kits, whatever the game tracks) and get the engine's
//! behavior through the trait's provided methods; [`BasePlayer`] is the
//! ready-made implementation for games that need nothing extra.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable participant identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Fresh random id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing uuid.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying uuid.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Short form for logs and default display names.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Engine-owned participant state embedded in every player type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCore {
    id: ParticipantId,
    spectator: bool,
}

impl PlayerCore {
    /// Core state for a participant.
    pub fn new(id: ParticipantId, spectator: bool) -> Self {
        Self { id, spectator }
    }
}

/// Capability trait for a session's player type.
pub trait SessionPlayer: Send + Sync + 'static {
    /// Construct the game's player for a joining participant.
    fn create(id: ParticipantId, spectator: bool) -> Self
    where
        Self: Sized;

    /// The embedded engine core.
    fn core(&self) -> &PlayerCore;

    /// Mutable access to the embedded engine core.
    fn core_mut(&mut self) -> &mut PlayerCore;

    /// Participant identity.
    fn id(&self) -> ParticipantId {
        self.core().id
    }

    /// Whether the participant is spectating rather than playing.
    fn is_spectator(&self) -> bool {
        self.core().spectator
    }

    /// Flip the spectator flag.
    fn set_spectator(&mut self, spectator: bool) {
        self.core_mut().spectator = spectator;
    }
}

/// Player type with no game-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasePlayer {
    core: PlayerCore,
}

impl SessionPlayer for BasePlayer {
    fn create(id: ParticipantId, spectator: bool) -> Self {
        Self {
            core: PlayerCore::new(id, spectator),
        }
    }

    fn core(&self) -> &PlayerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PlayerCore {
        &mut self.core
    }
}
