use super::*;
use crate::test_fixtures::{
    flag, flat_grid, match_document, put, ready_tank, ready_unit, side_a, side_b, two_side_sim,
    walled_grid,
};

mod combat;
mod sight;

// --- Shared test helpers ------------------------------------------------

fn open_field() -> Simulation {
    two_side_sim(flat_grid(12, 12))
}

fn cells(list: &[(i32, i32)]) -> Vec<Cell> {
    list.iter().map(|&(x, z)| Cell::new(x, z)).collect()
}
