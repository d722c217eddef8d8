//! Visibility and reachability oracle consulted by unit behaviour.

use crate::{Cell, Simulation, Unit};

pub trait Oracle {
    /// Nothing blocks the line between the two units' eye points.
    fn can_see(&self, sim: &Simulation, viewer: &Unit, target: &Unit) -> bool;
    /// Nothing blocks the segment from the unit to `cell`.
    fn can_reach(&self, sim: &Simulation, unit: &Unit, cell: Cell) -> bool;
}

/// Everything is visible and reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearSight;

impl Oracle for ClearSight {
    fn can_see(&self, _sim: &Simulation, _viewer: &Unit, _target: &Unit) -> bool {
        true
    }

    fn can_reach(&self, _sim: &Simulation, _unit: &Unit, _cell: Cell) -> bool {
        true
    }
}

/// Sampled line-of-sight over the height grid and the occupancy index.
///
/// A tile is a solid column spanning `[0, height]`, and a unit standing on it
/// sits at `height / 2`. Eyes are 0.8 above that; unit bodies reach 1.6 above
/// it.
#[derive(Debug, Clone, Copy)]
pub struct TerrainSight {
    /// Samples per cell of segment length.
    pub density: u32,
}

impl Default for TerrainSight {
    fn default() -> Self {
        Self { density: 4 }
    }
}

const EYE_HEIGHT: f64 = 0.8;
const BODY_HEIGHT: f64 = 1.6;
const ENDPOINT_CLEARANCE: f64 = 0.4;

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: f64,
    z: f64,
}

fn column_top(sim: &Simulation, cell: Cell) -> f64 {
    f64::from(sim.grid().height(cell).unwrap_or(0))
}

fn stand(sim: &Simulation, cell: Cell) -> f64 {
    column_top(sim, cell) / 2.0
}

fn eye(sim: &Simulation, cell: Cell) -> Point {
    Point {
        x: f64::from(cell.x),
        y: stand(sim, cell) + EYE_HEIGHT,
        z: f64::from(cell.z),
    }
}

impl TerrainSight {
    /// Interior sample points of `from -> to`, with the cell each falls in.
    fn samples(&self, from: Point, to: Point) -> Vec<(Point, Cell)> {
        let (dx, dy, dz) = (to.x - from.x, to.y - from.y, to.z - from.z);
        let length = (dx * dx + dz * dz).sqrt();
        let steps = (length * f64::from(self.density.max(1))).ceil().max(1.0) as u32;
        (1..steps)
            .filter_map(|i| {
                let t = f64::from(i) / f64::from(steps);
                let travelled = t * length;
                if travelled < ENDPOINT_CLEARANCE || length - travelled < ENDPOINT_CLEARANCE {
                    return None;
                }
                let p = Point {
                    x: from.x + dx * t,
                    y: from.y + dy * t,
                    z: from.z + dz * t,
                };
                let cell = Cell::new(p.x.round() as i32, p.z.round() as i32);
                Some((p, cell))
            })
            .collect()
    }
}

impl Oracle for TerrainSight {
    fn can_see(&self, sim: &Simulation, viewer: &Unit, target: &Unit) -> bool {
        let from = eye(sim, viewer.cell);
        let to = eye(sim, target.cell);
        self.samples(from, to).into_iter().all(|(p, cell)| {
            if column_top(sim, cell) > p.y {
                return false;
            }
            match sim.unit_at(cell) {
                Some(other) if other.id != viewer.id && other.id != target.id => {
                    p.y > stand(sim, cell) + BODY_HEIGHT
                }
                _ => true,
            }
        })
    }

    fn can_reach(&self, sim: &Simulation, unit: &Unit, cell: Cell) -> bool {
        let from = eye(sim, unit.cell);
        let to = Point {
            x: f64::from(cell.x),
            y: column_top(sim, cell),
            z: f64::from(cell.z),
        };
        self.samples(from, to)
            .into_iter()
            .all(|(p, sampled)| sampled == cell || column_top(sim, sampled) <= p.y)
    }
}
