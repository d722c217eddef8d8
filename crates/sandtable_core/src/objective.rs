//! Objective marker capture.

use crate::{Oracle, SideId, Simulation, Unit};

/// Who stands around a flag at the end of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Empty,
    Contested,
    Held(SideId),
}

/// Combat units in the flag's view, both sides counted.
pub fn presence<O: Oracle + ?Sized>(sim: &Simulation, flag: &Unit, oracle: &O) -> Presence {
    let mut holder: Option<&SideId> = None;
    for id in sim.units_in_view_of(flag, true, oracle) {
        let Some(unit) = sim.unit(id) else {
            continue;
        };
        if !unit.kind.is_combatant() {
            continue;
        }
        match holder {
            None => holder = Some(&unit.side),
            Some(side) if *side != unit.side => return Presence::Contested,
            Some(_) => {}
        }
    }
    holder.map_or(Presence::Empty, |side| Presence::Held(side.clone()))
}

/// Advance the capture counter; returns the new owner when the flag flips.
///
/// Two consecutive turns of uncontested presence flip a flag: an owned flag
/// goes neutral first, a neutral one goes to the present side.
pub fn capture_step(flag: &mut Unit, presence: &Presence) -> Option<SideId> {
    let present = match presence {
        Presence::Contested => return None,
        Presence::Empty => None,
        Presence::Held(side) => Some(side),
    };
    match present {
        Some(side) if *side != flag.side => flag.waiting += 1,
        _ => flag.waiting = flag.waiting.saturating_sub(1),
    }
    if flag.waiting <= 1 {
        return None;
    }
    flag.waiting = 0;
    flag.side = if flag.side.is_neutral() {
        present.cloned().unwrap_or_default()
    } else {
        SideId::neutral()
    };
    Some(flag.side.clone())
}
