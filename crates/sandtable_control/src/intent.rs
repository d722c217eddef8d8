//! Local intents and their validation into action records.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sandtable_core::{
    ActionRecord, Cell, Heading, Oracle, Placement, PlacementError, SideId, Simulation,
    Unit, UnitAction, UnitId, UnitKind,
};

/// What the local player asked for, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Place {
        kind: UnitKind,
        cell: Cell,
        heading: Heading,
    },
    Move {
        unit: UnitId,
        cell: Cell,
    },
    /// Shoot an enemy, or repair friendly armor when the unit is an engineer.
    Attack {
        unit: UnitId,
        target: UnitId,
    },
    /// Move every listed unit to its free reachable cell nearest `toward`.
    BatchMove {
        units: Vec<UnitId>,
        toward: Cell,
    },
    EndTurn,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("it is not {0}'s turn")]
    NotYourTurn(SideId),

    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),

    #[error("unit {0} belongs to another side")]
    NotOwned(UnitId),

    #[error("{kind} cannot be placed at {cell}")]
    NotSpawnable { kind: UnitKind, cell: Cell },

    #[error("placement rule allows no more {0}")]
    OverBudget(UnitKind),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("unit {unit} cannot reach {cell}")]
    Unreachable { unit: UnitId, cell: Cell },

    #[error("unit {unit} has no line on unit {target}")]
    NotInView { unit: UnitId, target: UnitId },

    #[error("unit {0} has no charge left")]
    NoCharge(UnitId),

    #[error("no unit in the selection can move")]
    EmptySelection,
}

/// Pick a fresh non-zero id that no live unit uses.
pub fn fresh_unit_id<R: Rng + ?Sized>(rng: &mut R, sim: &Simulation) -> UnitId {
    loop {
        let id = UnitId(u64::from(rng.gen_range(1..=u32::MAX)));
        if sim.unit(id).is_none() {
            return id;
        }
    }
}

/// Validate `intent` for `side` and turn it into records. Nothing is
/// recorded when validation fails.
pub fn plan<O: Oracle + ?Sized, R: Rng + ?Sized>(
    intent: &Intent,
    sim: &Simulation,
    side: &SideId,
    oracle: &O,
    rng: &mut R,
) -> Result<Vec<ActionRecord>, IntentError> {
    match intent {
        Intent::Place {
            kind,
            cell,
            heading,
        } => plan_place(sim, side, *kind, *cell, *heading, rng).map(|r| vec![r]),
        Intent::Move { unit, cell } => {
            owned(sim, side, *unit)?;
            if !sim.moveable_tiles(*unit, oracle).contains(cell) {
                return Err(IntentError::Unreachable {
                    unit: *unit,
                    cell: *cell,
                });
            }
            Ok(vec![ActionRecord::unit(*unit, UnitAction::Move(*cell))])
        }
        Intent::Attack { unit, target } => {
            plan_attack(sim, side, *unit, *target, oracle).map(|r| vec![r])
        }
        Intent::BatchMove { units, toward } => plan_batch(sim, side, units, *toward, oracle),
        Intent::EndTurn => Ok(vec![ActionRecord::end_turn(side.clone())]),
    }
}

fn owned<'a>(
    sim: &'a Simulation,
    side: &SideId,
    id: UnitId,
) -> Result<&'a Unit, IntentError> {
    let unit = sim.unit(id).ok_or(IntentError::UnknownUnit(id))?;
    if unit.side != *side {
        return Err(IntentError::NotOwned(id));
    }
    Ok(unit)
}

fn plan_place<R: Rng + ?Sized>(
    sim: &Simulation,
    side: &SideId,
    kind: UnitKind,
    cell: Cell,
    heading: Heading,
    rng: &mut R,
) -> Result<ActionRecord, IntentError> {
    let rule = &sim.ruleset().placement;
    if !rule.allows(kind, sim.committed_points(side), sim.fielded(side, kind)) {
        return Err(IntentError::OverBudget(kind));
    }
    if !sim.spawnable_cells(side, kind.is_armor()).contains(&cell) {
        return Err(IntentError::NotSpawnable { kind, cell });
    }
    sim.footprint_check(kind, cell, None)?;
    Ok(ActionRecord::Place(Placement {
        unit_id: fresh_unit_id(rng, sim),
        kind,
        side: side.clone(),
        cell,
        heading: kind.is_armor().then_some(heading),
    }))
}

fn plan_attack<O: Oracle + ?Sized>(
    sim: &Simulation,
    side: &SideId,
    id: UnitId,
    target_id: UnitId,
    oracle: &O,
) -> Result<ActionRecord, IntentError> {
    let unit = owned(sim, side, id)?;
    let target = sim
        .unit(target_id)
        .ok_or(IntentError::UnknownUnit(target_id))?;
    if unit.bullet == 0 {
        return Err(IntentError::NoCharge(id));
    }
    let in_view = sim.piece_in_view(id, false, oracle).contains(&target_id);
    let not_in_view = IntentError::NotInView {
        unit: id,
        target: target_id,
    };
    if target.side == unit.side {
        if unit.kind == UnitKind::Engineer && target.kind.is_armor() && in_view {
            return Ok(ActionRecord::unit(id, UnitAction::Repair(target.cell)));
        }
        return Err(not_in_view);
    }
    if !in_view {
        return Err(not_in_view);
    }
    Ok(ActionRecord::unit(id, UnitAction::Shot(target.cell)))
}

fn plan_batch<O: Oracle + ?Sized>(
    sim: &Simulation,
    side: &SideId,
    units: &[UnitId],
    toward: Cell,
    oracle: &O,
) -> Result<Vec<ActionRecord>, IntentError> {
    let mut claimed: Vec<Cell> = Vec::new();
    let mut records = Vec::new();
    for &id in units {
        let unit = owned(sim, side, id)?;
        if unit.kind.is_armor() {
            continue;
        }
        let best = sim
            .moveable_tiles(id, oracle)
            .into_iter()
            .filter(|c| !claimed.contains(c))
            .min_by_key(|c| c.manhattan(toward));
        if let Some(cell) = best {
            claimed.push(cell);
            records.push(ActionRecord::unit(id, UnitAction::Move(cell)));
        }
    }
    if records.is_empty() {
        return Err(IntentError::EmptySelection);
    }
    Ok(records)
}
