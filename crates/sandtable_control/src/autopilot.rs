use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use sandtable_core::{
    Cell, Heading, Oracle, SideId, Simulation, UnitId, UnitKind, ARMOR_MAX_HEALTH,
};

use crate::Intent;

pub trait IntentSource {
    /// Intents for one whole turn, in the order they should be handled.
    /// The last one ends the turn.
    fn plan_turn(&mut self, sim: &Simulation, side: &SideId, oracle: &dyn Oracle) -> Vec<Intent>;
}

/// Plays a side without input:
/// 1. Engineers repair damaged friendly armor in view.
/// 2. Charged units shoot visible enemy combatants, one shooter per target.
/// 3. Place up to `placements_per_turn` affordable units in free spawn cells.
/// 4. Infantry that did not shoot batch-move toward the nearest flag the
///    side does not own.
/// 5. Armor takes a random manoeuvre.
/// 6. End the turn.
pub struct Skirmisher<R: Rng> {
    rng: R,
    placements_per_turn: usize,
}

impl<R: Rng> Skirmisher<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            placements_per_turn: 2,
        }
    }

    #[must_use]
    pub fn with_placements(mut self, per_turn: usize) -> Self {
        self.placements_per_turn = per_turn;
        self
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Attack and repair intents; returns the units that used their charge.
fn engagements(
    sim: &Simulation,
    side: &SideId,
    oracle: &dyn Oracle,
    intents: &mut Vec<Intent>,
) -> BTreeSet<UnitId> {
    let mut engaged = BTreeSet::new();
    let mut claimed = BTreeSet::new();
    for unit in sim.units_of(side) {
        if !unit.kind.is_combatant() || unit.bullet == 0 {
            continue;
        }
        let target = sim
            .piece_in_view(unit.id, false, oracle)
            .into_iter()
            .filter_map(|id| sim.unit(id))
            .find(|t| {
                let wanted = if t.side == *side {
                    unit.kind == UnitKind::Engineer
                        && t.health().is_some_and(|h| h < ARMOR_MAX_HEALTH)
                } else {
                    t.kind.is_combatant()
                };
                wanted && !claimed.contains(&t.id)
            });
        if let Some(target) = target {
            if target.side != *side {
                claimed.insert(target.id);
            }
            engaged.insert(unit.id);
            intents.push(Intent::Attack {
                unit: unit.id,
                target: target.id,
            });
        }
    }
    engaged
}

/// Nearest flag not held by `side`, measured from the centre of its units.
fn objective(sim: &Simulation, side: &SideId) -> Option<Cell> {
    let own: Vec<Cell> = sim
        .units_of(side)
        .filter(|u| u.kind.is_combatant())
        .map(|u| u.cell)
        .collect();
    let count = i32::try_from(own.len()).ok().filter(|&n| n > 0)?;
    let centre = Cell::new(
        own.iter().map(|c| c.x).sum::<i32>() / count,
        own.iter().map(|c| c.z).sum::<i32>() / count,
    );
    sim.units()
        .filter(|u| u.kind == UnitKind::Flag && u.side != *side)
        .map(|u| u.cell)
        .min_by_key(|c| c.manhattan(centre))
}

impl<R: Rng> Skirmisher<R> {
    fn placements(&mut self, sim: &Simulation, side: &SideId, intents: &mut Vec<Intent>) {
        let rule = &sim.ruleset().placement;
        let mut points = sim.committed_points(side);
        let mut placed: Vec<UnitKind> = Vec::new();
        let mut taken: BTreeSet<Cell> = BTreeSet::new();
        for _ in 0..self.placements_per_turn {
            let affordable: Vec<UnitKind> = UnitKind::PLACEABLE
                .into_iter()
                .filter(|&k| {
                    let queued = placed.iter().filter(|&&p| p == k).count() as u32;
                    let fielded = sim.fielded(side, k) + queued;
                    rule.allows(k, points, fielded)
                })
                .collect();
            let Some(&kind) = affordable.choose(&mut self.rng) else {
                break;
            };
            let cells: Vec<Cell> = sim
                .spawnable_cells(side, kind.is_armor())
                .into_iter()
                .filter(|c| !taken.contains(c))
                .filter(|&c| sim.footprint_check(kind, c, None).is_ok())
                .collect();
            let Some(&cell) = cells.choose(&mut self.rng) else {
                continue;
            };
            let heading = Heading::ALL[self.rng.gen_range(0..Heading::ALL.len())];
            taken.extend(cell.square(1));
            points += rule.unit_cost(kind);
            placed.push(kind);
            intents.push(Intent::Place {
                kind,
                cell,
                heading,
            });
        }
    }
}

impl<R: Rng> IntentSource for Skirmisher<R> {
    fn plan_turn(&mut self, sim: &Simulation, side: &SideId, oracle: &dyn Oracle) -> Vec<Intent> {
        let mut intents = Vec::new();
        let engaged = engagements(sim, side, oracle, &mut intents);
        self.placements(sim, side, &mut intents);

        let movers: Vec<UnitId> = sim
            .units_of(side)
            .filter(|u| u.kind.is_combatant() && !u.kind.is_armor())
            .filter(|u| !engaged.contains(&u.id))
            .map(|u| u.id)
            .filter(|&id| !sim.moveable_tiles(id, oracle).is_empty())
            .collect();
        if let (false, Some(toward)) = (movers.is_empty(), objective(sim, side)) {
            intents.push(Intent::BatchMove {
                units: movers,
                toward,
            });
        }

        let tanks: Vec<UnitId> = sim
            .units_of(side)
            .filter(|u| u.kind.is_armor() && !engaged.contains(&u.id))
            .map(|u| u.id)
            .collect();
        for id in tanks {
            let options: Vec<Cell> = sim.moveable_tiles(id, oracle).into_iter().collect();
            if let Some(&cell) = options.choose(&mut self.rng) {
                intents.push(Intent::Move { unit: id, cell });
            }
        }

        intents.push(Intent::EndTurn);
        intents
    }
}
