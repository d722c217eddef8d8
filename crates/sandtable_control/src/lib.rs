//! `sandtable_control`: the input side of a peer.
//!
//! Turns local clicks into validated intents, intents into action records,
//! and runs one side's session over a replication channel.

mod autopilot;
mod bootstrap;
mod intent;
mod peer;
mod selection;

pub use autopilot::{IntentSource, Skirmisher};
pub use bootstrap::objective_records;
pub use intent::{fresh_unit_id, plan, Intent, IntentError};
pub use peer::{Peer, PeerError, PeerEvent};
pub use selection::{Mode, SelectionContext};
