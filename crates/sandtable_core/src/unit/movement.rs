use std::collections::{BTreeSet, VecDeque};

use ahash::AHashMap;

use crate::{Cell, Heading, Oracle, Simulation, Unit, UnitKind, GRAPPLE_RANGE, NEIGHBOURS};

/// Cost of stepping from a tile of height `from` onto one of height `to`.
/// Climbing more than one level costs the excess.
pub fn step_cost(from: u8, to: u8) -> u32 {
    1 + u32::from(to.saturating_sub(from).saturating_sub(1))
}

/// One armor move, in heading-relative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manoeuvre {
    /// Cell the player picks to request this move.
    pub handle: (i32, i32),
    /// Translation of the footprint centre.
    pub shift: (i32, i32),
    /// Quarter turns applied to the heading.
    pub turn: i32,
}

const fn manoeuvre(handle: (i32, i32), shift: (i32, i32), turn: i32) -> Manoeuvre {
    Manoeuvre {
        handle,
        shift,
        turn,
    }
}

const ARMOR_MANOEUVRES: [Manoeuvre; 9] = [
    // forward 1
    manoeuvre((0, 2), (0, 1), 0),
    // forward 2
    manoeuvre((0, 3), (0, 2), 0),
    // turn in place
    manoeuvre((-2, 0), (0, 0), -1),
    manoeuvre((2, 0), (0, 0), 1),
    // turn and side-step
    manoeuvre((-3, 0), (-1, 0), -1),
    manoeuvre((3, 0), (1, 0), 1),
    // reverse heading
    manoeuvre((0, -2), (0, 0), 2),
    // forward and turn
    manoeuvre((-1, 2), (0, 1), -1),
    manoeuvre((1, 2), (0, 1), 1),
];

pub fn armor_manoeuvres() -> &'static [Manoeuvre] {
    &ARMOR_MANOEUVRES
}

/// Cells a unit may move to (or, for armor, pick to manoeuvre) this turn.
pub(crate) fn moveable_cells<O: Oracle + ?Sized>(
    sim: &Simulation,
    unit: &Unit,
    oracle: &O,
) -> BTreeSet<Cell> {
    if unit.waiting > 0 {
        return BTreeSet::new();
    }
    match unit.kind {
        UnitKind::Flag => BTreeSet::new(),
        UnitKind::Tank => manoeuvre_handles(sim, unit),
        UnitKind::Assault | UnitKind::Engineer | UnitKind::Sniper => {
            let mut cells = walk(sim, unit);
            if unit.has_grapple() {
                cells.extend(grapple_landings(sim, unit, oracle));
            }
            cells.retain(|&c| sim.occupant(c).is_none());
            cells
        }
    }
}

/// Cost-limited search over 8 neighbours, keeping the cheapest cost per cell.
fn walk(sim: &Simulation, unit: &Unit) -> BTreeSet<Cell> {
    let grid = sim.grid();
    let budget = unit.profile().strength;
    let mut best: AHashMap<Cell, u32> = AHashMap::new();
    let mut queue = VecDeque::new();
    best.insert(unit.cell, 0);
    queue.push_back((unit.cell, 0u32));

    while let Some((cell, spent)) = queue.pop_front() {
        if best.get(&cell).is_some_and(|&b| b < spent) {
            continue;
        }
        let Some(here) = grid.height(cell) else {
            continue;
        };
        for (dx, dz) in NEIGHBOURS {
            let next = cell.offset(dx, dz);
            let Some(there) = grid.height(next) else {
                continue;
            };
            if grid.is_obstructed(next) {
                continue;
            }
            if dx != 0
                && dz != 0
                && grid.is_obstructed(cell.offset(dx, 0))
                && grid.is_obstructed(cell.offset(0, dz))
            {
                continue;
            }
            let cost = spent + step_cost(here, there);
            if cost > budget {
                continue;
            }
            if best.get(&next).map_or(true, |&b| cost < b) {
                best.insert(next, cost);
                queue.push_back((next, cost));
            }
        }
    }

    best.remove(&unit.cell);
    best.into_keys().collect()
}

/// Cells at the foot of nearby walls, one step back toward the unit.
fn grapple_landings<O: Oracle + ?Sized>(sim: &Simulation, unit: &Unit, oracle: &O) -> Vec<Cell> {
    let grid = sim.grid();
    let mut landings = Vec::new();
    for wall in unit.cell.square(GRAPPLE_RANGE) {
        if !grid.contains(wall) || !grid.is_obstructed(wall) {
            continue;
        }
        let dx = wall.x - unit.cell.x;
        let dz = wall.z - unit.cell.z;
        let mut candidates = Vec::with_capacity(2);
        if dx.abs() >= dz.abs() {
            candidates.push(wall.offset(-dx.signum(), 0));
        }
        if dx.abs() <= dz.abs() {
            candidates.push(wall.offset(0, -dz.signum()));
        }
        for landing in candidates {
            if landing != unit.cell && grid.is_open(landing) && oracle.can_reach(sim, unit, wall) {
                landings.push(landing);
            }
        }
    }
    landings
}

fn manoeuvre_handles(sim: &Simulation, unit: &Unit) -> BTreeSet<Cell> {
    let heading = unit.heading().unwrap_or_default();
    let mut handles = BTreeSet::new();
    for m in armor_manoeuvres() {
        let (sx, sz) = heading.to_world(m.shift.0, m.shift.1);
        let centre = unit.cell.offset(sx, sz);
        if sim.footprint_check(UnitKind::Tank, centre, Some(unit.id)).is_err() {
            continue;
        }
        let (hx, hz) = heading.to_world(m.handle.0, m.handle.1);
        let handle = unit.cell.offset(hx, hz);
        if sim.grid().contains(handle) {
            handles.insert(handle);
        }
    }
    handles
}

/// Destination centre and heading for an armor move picked at `target`.
pub(crate) fn resolve_manoeuvre(unit: &Unit, target: Cell) -> Option<(Cell, Heading)> {
    let heading = unit.heading()?;
    let local = heading.to_local(
        target.x.saturating_sub(unit.cell.x),
        target.z.saturating_sub(unit.cell.z),
    );
    let m = armor_manoeuvres().iter().find(|m| m.handle == local)?;
    let (sx, sz) = heading.to_world(m.shift.0, m.shift.1);
    Some((unit.cell.offset(sx, sz), heading.rotated(m.turn)))
}
