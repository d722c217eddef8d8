//! `sandtable_core`: deterministic tactical simulation on a height grid.
//!
//! No IO, no network. Both peers apply the same action log to the same
//! starting state and arrive at the same units, forces and cards.

mod action;
mod channel;
mod document;
mod error;
mod grid;
mod objective;
mod oracle;
mod replay;
mod ruleset;
mod simulation;
mod types;
mod unit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use action::{ActionRecord, Placement, UnitAction};
pub use channel::{HubEndpoint, LoopbackHub, Replication};
pub use document::{Seat, SharedDocument, SideLedger, UnitSnapshot};
pub use error::{GridError, PlacementError, ReplayError, WireError};
pub use grid::{Grid, MarkerOwner, Tile, FLOOR_HEIGHT};
pub use objective::{capture_step, presence, Presence};
pub use oracle::{ClearSight, Oracle, TerrainSight};
pub use replay::{Replayer, SyncReport, TurnState};
pub use ruleset::{PlacementRule, Ruleset, DEFAULT_POINT_CAP, DEFAULT_STARTING_FORCE};
pub use simulation::{ReconcileReport, Simulation};
pub use types::*;
pub use unit::{
    armor_manoeuvres, footprint_at, step_cost, Armor, Footprint, KindProfile, Manoeuvre, Unit,
    ARMOR_MAX_HEALTH, FRESH_WAITING, GRAPPLE, GRAPPLE_RANGE, REPAIR_AMOUNT,
};

#[cfg(test)]
mod tests;
