//! Selection and highlight state for one local player.
//!
//! Clicks on cells and units are turned into [`Intent`]s here; validation
//! happens later in [`crate::plan`].

use std::collections::BTreeSet;

use sandtable_core::{Cell, Heading, Oracle, SideId, Simulation, UnitId, UnitKind};

use crate::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Opponent to move.
    Waiting,
    /// Our turn, nothing selected.
    Idle,
    /// Choosing a cell for a new unit.
    Place(UnitKind),
    /// One unit selected.
    Unit,
    /// Several units selected for a batch move.
    Batch,
}

#[derive(Debug, Clone)]
pub struct SelectionContext {
    side: SideId,
    mode: Mode,
    heading: Heading,
    selected: Vec<UnitId>,
    cells: BTreeSet<Cell>,
    targets: Vec<UnitId>,
}

impl SelectionContext {
    pub fn new(side: SideId) -> Self {
        Self {
            side,
            mode: Mode::Waiting,
            heading: Heading::default(),
            selected: Vec::new(),
            cells: BTreeSet::new(),
            targets: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> &[UnitId] {
        &self.selected
    }

    pub fn highlighted_cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn highlighted_units(&self) -> &[UnitId] {
        &self.targets
    }

    /// Heading given to armor placed from this context.
    pub fn placement_heading(&self) -> Heading {
        self.heading
    }

    pub fn rotate_placement(&mut self) {
        self.heading = self.heading.rotated(1);
    }

    fn clear_highlights(&mut self) {
        self.selected.clear();
        self.cells.clear();
        self.targets.clear();
    }

    /// Drop everything and go back to the turn's resting mode.
    pub fn reset(&mut self, my_turn: bool) {
        self.clear_highlights();
        self.mode = if my_turn { Mode::Idle } else { Mode::Waiting };
    }

    /// Recompute highlights after the board changed. Selected units that
    /// died are dropped.
    pub fn refresh<O: Oracle + ?Sized>(&mut self, sim: &Simulation, my_turn: bool, oracle: &O) {
        if !my_turn {
            self.reset(false);
            return;
        }
        match self.mode {
            Mode::Waiting => self.reset(true),
            Mode::Idle => {}
            Mode::Place(kind) => self.choose_kind(kind, sim),
            Mode::Unit | Mode::Batch => {
                let alive: Vec<UnitId> = self
                    .selected
                    .iter()
                    .copied()
                    .filter(|&id| sim.unit(id).is_some())
                    .collect();
                let batch = self.mode == Mode::Batch;
                self.reset(true);
                for id in alive {
                    if batch {
                        self.add_to_batch(id, sim);
                    } else {
                        self.select(id, sim, oracle);
                    }
                }
            }
        }
    }

    /// Enter placement mode for `kind`: highlight the cells our side can
    /// spawn into (flag zones only, for armor).
    pub fn choose_kind(&mut self, kind: UnitKind, sim: &Simulation) {
        self.clear_highlights();
        self.mode = Mode::Place(kind);
        self.cells = sim.spawnable_cells(&self.side, kind.is_armor());
    }

    /// Select one of our units; highlight its moves and targets.
    pub fn select<O: Oracle + ?Sized>(&mut self, id: UnitId, sim: &Simulation, oracle: &O) -> bool {
        let Some(unit) = sim.unit(id) else {
            return false;
        };
        if unit.side != self.side || !unit.kind.is_combatant() {
            return false;
        }
        self.clear_highlights();
        self.mode = Mode::Unit;
        self.selected.push(id);
        self.cells = sim.moveable_tiles(id, oracle);
        if unit.bullet > 0 {
            self.targets = sim.piece_in_view(id, false, oracle);
        }
        true
    }

    /// Add one of our infantry units to the batch selection.
    pub fn add_to_batch(&mut self, id: UnitId, sim: &Simulation) -> bool {
        let Some(unit) = sim.unit(id) else {
            return false;
        };
        if unit.side != self.side || !unit.kind.is_combatant() || unit.kind.is_armor() {
            return false;
        }
        if self.mode != Mode::Batch {
            self.clear_highlights();
            self.mode = Mode::Batch;
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
        true
    }

    pub fn click_cell(&mut self, cell: Cell) -> Option<Intent> {
        let intent = match self.mode {
            Mode::Place(kind) if self.cells.contains(&cell) => Intent::Place {
                kind,
                cell,
                heading: self.heading,
            },
            Mode::Unit if self.cells.contains(&cell) => Intent::Move {
                unit: *self.selected.first()?,
                cell,
            },
            Mode::Batch if !self.selected.is_empty() => Intent::BatchMove {
                units: self.selected.clone(),
                toward: cell,
            },
            _ => return None,
        };
        self.reset(true);
        Some(intent)
    }

    /// A highlighted target becomes an attack; one of our own units becomes
    /// the new selection.
    pub fn click_unit<O: Oracle + ?Sized>(
        &mut self,
        id: UnitId,
        sim: &Simulation,
        oracle: &O,
    ) -> Option<Intent> {
        if matches!(self.mode, Mode::Waiting) {
            return None;
        }
        if self.mode == Mode::Unit && self.targets.contains(&id) {
            let unit = *self.selected.first()?;
            self.reset(true);
            return Some(Intent::Attack { unit, target: id });
        }
        self.select(id, sim, oracle);
        None
    }

    pub fn end_turn(&mut self) -> Option<Intent> {
        if self.mode == Mode::Waiting {
            return None;
        }
        self.reset(false);
        Some(Intent::EndTurn)
    }
}
