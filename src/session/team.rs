//! Teams
//!
//! A team is a color identity plus a member id set. Spectator-aware
//! queries (alive members, alive teams) live on the session, which owns
//! the player table the spectator flags live in.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::player::ParticipantId;

/// Team identity within a session.
///
/// Sessions seed their team list from [`TeamColor::ALL`] in order, taking
/// as many as the size policy asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamColor {
    /// Red team.
    Red,
    /// Blue team.
    Blue,
    /// Green team.
    Green,
    /// Yellow team.
    Yellow,
    /// Aqua team.
    Aqua,
    /// Purple team.
    Purple,
    /// Orange team.
    Orange,
    /// Pink team.
    Pink,
    /// Gray team.
    Gray,
    /// White team.
    White,
}

impl TeamColor {
    /// Every color, in seeding order.
    pub const ALL: [TeamColor; 10] = [
        TeamColor::Red,
        TeamColor::Blue,
        TeamColor::Green,
        TeamColor::Yellow,
        TeamColor::Aqua,
        TeamColor::Purple,
        TeamColor::Orange,
        TeamColor::Pink,
        TeamColor::Gray,
        TeamColor::White,
    ];

    /// Lowercase color name.
    pub fn name(&self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Blue => "blue",
            TeamColor::Green => "green",
            TeamColor::Yellow => "yellow",
            TeamColor::Aqua => "aqua",
            TeamColor::Purple => "purple",
            TeamColor::Orange => "orange",
            TeamColor::Pink => "pink",
            TeamColor::Gray => "gray",
            TeamColor::White => "white",
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine-owned team state embedded in every team type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCore {
    color: TeamColor,
    members: BTreeSet<ParticipantId>,
}

impl TeamCore {
    /// Empty team of the given color.
    pub fn new(color: TeamColor) -> Self {
        Self {
            color,
            members: BTreeSet::new(),
        }
    }
}

/// Capability trait for a session's team type.
pub trait SessionTeam: Send + Sync + 'static {
    /// Construct the game's team for a seeded color.
    fn create(color: TeamColor) -> Self
    where
        Self: Sized;

    /// The embedded engine core.
    fn core(&self) -> &TeamCore;

    /// Mutable access to the embedded engine core.
    fn core_mut(&mut self) -> &mut TeamCore;

    /// Team color.
    fn color(&self) -> TeamColor {
        self.core().color
    }

    /// Team name (the color name).
    fn name(&self) -> &'static str {
        self.core().color.name()
    }

    /// Member ids.
    fn members(&self) -> &BTreeSet<ParticipantId> {
        &self.core().members
    }

    /// Add a member; returns false if already present.
    fn add_member(&mut self, id: ParticipantId) -> bool {
        self.core_mut().members.insert(id)
    }

    /// Remove a member; returns false if absent.
    fn remove_member(&mut self, id: ParticipantId) -> bool {
        self.core_mut().members.remove(&id)
    }

    /// Whether `id` belongs to this team.
    fn is_member(&self, id: ParticipantId) -> bool {
        self.core().members.contains(&id)
    }

    /// Member count.
    fn len(&self) -> usize {
        self.core().members.len()
    }

    /// Whether the team has no members.
    fn is_empty(&self) -> bool {
        self.core().members.is_empty()
    }
}

/// Team type with no game-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseTeam {
    core: TeamCore,
}

impl SessionTeam for BaseTeam {
    fn create(color: TeamColor) -> Self {
        Self {
            core: TeamCore::new(color),
        }
    }

    fn core(&self) -> &TeamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TeamCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_round_trips() {
        let mut team = BaseTeam::create(TeamColor::Red);
        let id = ParticipantId::new();

        assert!(team.add_member(id));
        assert!(!team.add_member(id));
        assert!(team.is_member(id));
        assert_eq!(team.len(), 1);

        assert!(team.remove_member(id));
        assert!(!team.remove_member(id));
        assert!(team.is_empty());
    }

    #[test]
    fn colors_have_distinct_names() {
        let mut names: Vec<_> = TeamColor::ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TeamColor::ALL.len());
    }
}
