//! Objective records a peer appends when it first connects to a match.

use sandtable_core::{
    ActionRecord, MarkerOwner, Placement, Seat, SharedDocument, SideId, Simulation, UnitAction,
    UnitId, UnitKind,
};

/// Records that set up the match's objectives for `local`.
///
/// A board without flags gets one `place` per marker tile, numbered from 1.
/// Otherwise the second seat, while it owns no flag, claims every flag still
/// held by the placeholder.
pub fn objective_records(
    sim: &Simulation,
    doc: &SharedDocument,
    local: &SideId,
) -> Vec<ActionRecord> {
    let flags: Vec<_> = sim.units().filter(|u| u.kind == UnitKind::Flag).collect();

    if flags.is_empty() {
        return sim
            .grid()
            .markers()
            .zip(1u64..)
            .map(|((cell, owner), id)| {
                ActionRecord::Place(Placement {
                    unit_id: UnitId(id),
                    kind: UnitKind::Flag,
                    side: owner.side(&doc.user1),
                    cell,
                    heading: None,
                })
            })
            .collect();
    }

    if doc.seat_of(local) != Some(Seat::Second) || flags.iter().any(|f| f.side == *local) {
        return Vec::new();
    }
    let placeholder = MarkerOwner::placeholder();
    flags
        .iter()
        .filter(|f| f.side == placeholder)
        .map(|f| ActionRecord::unit(f.id, UnitAction::Occupy(local.clone())))
        .collect()
}
