//! Invitation-driven grouping.
//!
//! A generic timed-invitation ledger, plus the two flows built on it:
//! duels (accept spawns a fresh session) and parties (persistent groups
//! with leader election).

pub mod duel;
pub mod party;
pub mod request;

pub use duel::{DuelSelection, DuelService, DuelSessionFactory, DUEL_SESSION_NAME};
pub use party::{Party, PartyService};
pub use request::{Request, RequestId, RequestLedger};
