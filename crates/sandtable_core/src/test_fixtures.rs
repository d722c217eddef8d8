//! Shared test fixtures for sandtable_core and downstream crates.
//!
//! Two seated sides `A` and `B`, flat grids, and helpers that place units
//! already past their placement cooldown.

use crate::{
    Cell, Grid, Heading, Ruleset, SharedDocument, SideId, Simulation, Unit, UnitId, UnitKind,
};

pub fn side_a() -> SideId {
    SideId::from("A")
}

pub fn side_b() -> SideId {
    SideId::from("B")
}

pub fn flat_grid(width: i32, depth: i32) -> Grid {
    Grid::flat(width, depth).unwrap()
}

/// Flat grid with walls (height 3) on the given cells.
pub fn walled_grid(width: i32, depth: i32, walls: &[(i32, i32)]) -> Grid {
    walls.iter().fold(flat_grid(width, depth), |grid, &(x, z)| {
        grid.with_height(Cell::new(x, z), 3)
    })
}

/// Document for a running match between `A` (host, to move) and `B`.
pub fn match_document() -> SharedDocument {
    let mut doc = SharedDocument::open(side_a(), "fixture", Ruleset::default().starting_force);
    doc.user2 = side_b();
    doc
}

pub fn two_side_sim(grid: Grid) -> Simulation {
    Simulation::new(grid, Ruleset::default(), [side_a(), side_b()])
}

/// A unit with its cooldown finished and a full charge.
pub fn ready_unit(id: u64, kind: UnitKind, side: SideId, x: i32, z: i32) -> Unit {
    let mut unit = Unit::new(UnitId(id), kind, side, Cell::new(x, z), Heading::PlusZ);
    unit.waiting = 0;
    unit.bullet = kind.profile().charge;
    unit
}

pub fn ready_tank(id: u64, side: SideId, x: i32, z: i32, heading: Heading) -> Unit {
    let mut unit = ready_unit(id, UnitKind::Tank, side, x, z);
    if let Some(armor) = unit.armor.as_mut() {
        armor.heading = heading;
    }
    unit
}

pub fn flag(id: u64, side: SideId, x: i32, z: i32) -> Unit {
    Unit::new(UnitId(id), UnitKind::Flag, side, Cell::new(x, z), Heading::PlusZ)
}

/// Insert `unit`, panicking on an invalid placement.
pub fn put(sim: &mut Simulation, unit: Unit) -> UnitId {
    let id = unit.id;
    sim.insert(unit).unwrap();
    id
}
