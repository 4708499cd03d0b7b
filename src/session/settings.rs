//! Session Settings
//!
//! The size policy fixes a session's shape for its whole lifetime:
//! participant bounds, how many teams are seeded, and the per-team cap.
//! Games embed [`SettingsCore`] in their own settings type for anything
//! beyond that (maps, kits, rule toggles).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed participant and team bounds for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePolicy {
    /// Policy label, used in the session's full name ("solo", "4v4", ..).
    pub name: String,
    /// Minimum alive participants for the session to start.
    pub min_players: usize,
    /// Maximum alive participants.
    pub max_players: usize,
    /// Number of teams seeded at session creation.
    pub teams: usize,
    /// Maximum members per team.
    pub max_per_team: usize,
}

impl SizePolicy {
    /// Policy with explicit bounds.
    pub fn new(
        name: impl Into<String>,
        min_players: usize,
        max_players: usize,
        teams: usize,
        max_per_team: usize,
    ) -> Self {
        Self {
            name: name.into(),
            min_players,
            max_players,
            teams,
            max_per_team,
        }
    }
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self {
            name: "standard".to_string(),
            min_players: 2,
            max_players: 8,
            teams: 2,
            max_per_team: 4,
        }
    }
}

/// Opaque world/location a session plays in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorldId(String);

impl WorldId {
    /// Wrap a world name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The world name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine-owned settings state embedded in every settings type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsCore {
    size: SizePolicy,
    world: WorldId,
}

impl SettingsCore {
    /// Core settings for a session.
    pub fn new(size: SizePolicy, world: WorldId) -> Self {
        Self { size, world }
    }
}

/// Capability trait for a session's settings type.
pub trait SessionSettings: Send + Sync + 'static {
    /// The embedded engine core.
    fn core(&self) -> &SettingsCore;

    /// Mutable access to the embedded engine core.
    fn core_mut(&mut self) -> &mut SettingsCore;

    /// The session's size policy.
    fn size(&self) -> &SizePolicy {
        &self.core().size
    }

    /// The world the session plays in.
    fn world(&self) -> &WorldId {
        &self.core().world
    }

    /// Move the session to another world.
    fn set_world(&mut self, world: WorldId) {
        self.core_mut().world = world;
    }
}

/// Settings type with no game-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseSettings {
    core: SettingsCore,
}

impl BaseSettings {
    /// Settings from a size policy and world.
    pub fn new(size: SizePolicy, world: WorldId) -> Self {
        Self {
            core: SettingsCore::new(size, world),
        }
    }
}

impl SessionSettings for BaseSettings {
    fn core(&self) -> &SettingsCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SettingsCore {
        &mut self.core
    }
}
