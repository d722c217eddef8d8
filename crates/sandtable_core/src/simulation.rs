//! Unit registry, occupancy index, combat and attrition.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::objective::{capture_step, presence};
use crate::unit::{footprint_at, moveable_cells, resolve_manoeuvre, units_in_view};
use crate::{
    Cell, Grid, Heading, Oracle, PlacementError, ReplayError, Ruleset, SharedDocument,
    SideId, SideLedger, Unit, UnitAction, UnitId, UnitKind, UnitSnapshot, ARMOR_MAX_HEALTH,
    REPAIR_AMOUNT,
};

/// Changes made by [`Simulation::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<UnitId>,
    pub updated: Vec<UnitId>,
    pub removed: Vec<UnitId>,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    ruleset: Ruleset,
    units: BTreeMap<UnitId, Unit>,
    /// Every covered cell; armor indexes its whole footprint.
    occupancy: AHashMap<Cell, UnitId>,
    ledgers: [SideLedger; 2],
}

impl Simulation {
    pub fn new(grid: Grid, ruleset: Ruleset, seats: [SideId; 2]) -> Self {
        let ledgers = seats.map(|side| SideLedger {
            side,
            force: ruleset.starting_force,
            cards: Vec::new(),
        });
        Self {
            grid,
            ruleset,
            units: BTreeMap::new(),
            occupancy: AHashMap::new(),
            ledgers,
        }
    }

    /// Build the state a document describes: its units, forces and cards.
    pub fn from_document(grid: Grid, ruleset: Ruleset, doc: &SharedDocument) -> Self {
        let mut sim = Self::new(grid, ruleset, [doc.user1.clone(), doc.user2.clone()]);
        sim.reconcile(&doc.pieces);
        sim.adopt_ledgers(doc);
        sim
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Live units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn occupant(&self, cell: Cell) -> Option<UnitId> {
        self.occupancy.get(&cell).copied()
    }

    /// The unit covering `cell`, armor footprints included.
    pub fn unit_at(&self, cell: Cell) -> Option<&Unit> {
        self.occupant(cell).and_then(|id| self.units.get(&id))
    }

    pub fn units_of<'a>(&'a self, side: &'a SideId) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units.values().filter(move |u| u.side == *side)
    }

    pub fn flags_owned_by(&self, side: &SideId) -> u32 {
        self.units
            .values()
            .filter(|u| u.kind == UnitKind::Flag && u.side == *side)
            .count() as u32
    }

    /// Non-neutral flags held by anyone but `side`.
    pub fn flags_held_against(&self, side: &SideId) -> u32 {
        self.units
            .values()
            .filter(|u| u.kind == UnitKind::Flag && !u.side.is_neutral() && u.side != *side)
            .count() as u32
    }

    /// Placement points tied up in a side's live units.
    pub fn committed_points(&self, side: &SideId) -> u32 {
        self.units_of(side).map(|u| u.profile().points).sum()
    }

    pub fn fielded(&self, side: &SideId, kind: UnitKind) -> u32 {
        self.units_of(side).filter(|u| u.kind == kind).count() as u32
    }

    // -----------------------------------------------------------------------
    // Ledgers
    // -----------------------------------------------------------------------

    pub fn ledgers(&self) -> &[SideLedger; 2] {
        &self.ledgers
    }

    pub fn ledger(&self, side: &SideId) -> Option<&SideLedger> {
        self.ledgers
            .iter()
            .find(|l| !side.is_neutral() && l.side == *side)
    }

    pub fn force(&self, side: &SideId) -> Option<u32> {
        self.ledger(side).map(|l| l.force)
    }

    /// Take seats, forces and cards from the document. Forces above the
    /// starting budget are clamped.
    pub fn adopt_ledgers(&mut self, doc: &SharedDocument) {
        let cap = self.ruleset.starting_force;
        self.ledgers = doc.ledgers().map(|mut ledger| {
            ledger.force = ledger.force.min(cap);
            ledger
        });
    }

    /// Fill seats that were still empty when the simulation was built.
    pub fn take_seats(&mut self, doc: &SharedDocument) {
        for (ledger, side) in self.ledgers.iter_mut().zip([&doc.user1, &doc.user2]) {
            if ledger.side.is_neutral() && !side.is_neutral() {
                ledger.side = side.clone();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Placement and removal
    // -----------------------------------------------------------------------

    /// Can a `kind` stand centred on `cell`? `ignore` lets a unit test a
    /// destination that overlaps its current footprint.
    pub fn footprint_check(
        &self,
        kind: UnitKind,
        cell: Cell,
        ignore: Option<UnitId>,
    ) -> Result<(), PlacementError> {
        for c in footprint_at(kind, cell) {
            if !self.grid.contains(c) {
                return Err(PlacementError::OutOfRange(c));
            }
            if self.grid.is_obstructed(c) {
                return Err(PlacementError::Obstructed(c));
            }
            match self.occupant(c) {
                Some(occupant) if Some(occupant) != ignore => {
                    return Err(PlacementError::Occupied { cell: c, occupant });
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn can_place(&self, id: UnitId, kind: UnitKind, cell: Cell) -> Result<(), PlacementError> {
        if id.is_none() {
            return Err(PlacementError::ReservedId);
        }
        if self.units.contains_key(&id) {
            return Err(PlacementError::DuplicateId(id));
        }
        self.footprint_check(kind, cell, None)
    }

    pub fn insert(&mut self, unit: Unit) -> Result<(), PlacementError> {
        self.can_place(unit.id, unit.kind, unit.cell)?;
        self.index(&unit);
        self.units.insert(unit.id, unit);
        Ok(())
    }

    /// Place a fresh unit.
    pub fn spawn(
        &mut self,
        id: UnitId,
        kind: UnitKind,
        side: SideId,
        cell: Cell,
        heading: Option<Heading>,
    ) -> Result<(), PlacementError> {
        self.insert(Unit::new(id, kind, side, cell, heading.unwrap_or_default()))
    }

    fn index(&mut self, unit: &Unit) {
        for cell in unit.footprint() {
            self.occupancy.insert(cell, unit.id);
        }
    }

    fn unindex(&mut self, unit: &Unit) {
        for cell in unit.footprint() {
            if self.occupancy.get(&cell) == Some(&unit.id) {
                self.occupancy.remove(&cell);
            }
        }
    }

    /// Remove without attrition.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        self.unindex(&unit);
        Some(unit)
    }

    /// Remove a destroyed unit and charge its side's force.
    pub fn kill(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.remove(id)?;
        if unit.kind.is_combatant() {
            let loss = self.attrition_loss(&unit.side, unit.profile().loss);
            if let Some(ledger) = self.ledgers.iter_mut().find(|l| l.side == unit.side) {
                ledger.force = ledger.force.saturating_sub(loss);
            }
            tracing::debug!(unit = %unit.id, side = %unit.side, loss, "unit destroyed");
        }
        Some(unit)
    }

    /// Force lost when a unit of `side` with loss base `base` dies.
    /// Losses grow with the square of the objective deficit.
    pub fn attrition_loss(&self, side: &SideId, base: u32) -> u32 {
        let own = self.flags_owned_by(side);
        let against = self.flags_held_against(side);
        if own < against {
            let diff = against - own;
            base * (1 + diff * diff)
        } else {
            base
        }
    }

    fn relocate(&mut self, id: UnitId, cell: Cell, heading: Option<Heading>) -> bool {
        let Some(kind) = self.units.get(&id).map(|u| u.kind) else {
            return false;
        };
        if let Err(err) = self.footprint_check(kind, cell, Some(id)) {
            tracing::warn!(unit = %id, %cell, %err, "move ignored");
            return false;
        }
        let Some(mut unit) = self.units.remove(&id) else {
            return false;
        };
        self.unindex(&unit);
        unit.cell = cell;
        if let (Some(armor), Some(heading)) = (unit.armor.as_mut(), heading) {
            armor.heading = heading;
        }
        self.index(&unit);
        self.units.insert(id, unit);
        true
    }

    // -----------------------------------------------------------------------
    // Combat
    // -----------------------------------------------------------------------

    /// One hit on whatever covers `cell`. Standard units die, armor loses
    /// `pierce` health, flags shrug it off.
    pub fn strike(&mut self, cell: Cell, pierce: u32) {
        let Some(target) = self.unit_at(cell) else {
            return;
        };
        let id = target.id;
        match target.kind {
            UnitKind::Flag => {}
            UnitKind::Tank => {
                let destroyed = match self.units.get_mut(&id).and_then(|u| u.armor.as_mut()) {
                    Some(armor) => {
                        armor.health = armor.health.saturating_sub(pierce);
                        armor.health == 0
                    }
                    None => false,
                };
                if destroyed {
                    self.kill(id);
                }
            }
            UnitKind::Assault | UnitKind::Engineer | UnitKind::Sniper => {
                self.kill(id);
            }
        }
    }

    /// Hit every cell of the 3×3 block around `centre`.
    pub fn explode(&mut self, centre: Cell) {
        for cell in centre.square(1) {
            self.strike(cell, 1);
        }
    }

    /// Apply one unit-addressed record.
    pub fn apply(&mut self, id: UnitId, action: &UnitAction) -> Result<(), ReplayError> {
        let Some(unit) = self.units.get(&id) else {
            return Err(ReplayError::UnknownUnit { index: 0, id });
        };
        let (kind, side) = (unit.kind, unit.side.clone());
        if !kind.handles(action.kind()) {
            return Err(ReplayError::UnsupportedAction {
                index: 0,
                kind,
                action: action.kind(),
            });
        }
        tracing::debug!(unit = %id, %kind, action = %action.kind(), "apply");

        match action {
            UnitAction::Move(target) => self.apply_move(id, *target),
            UnitAction::Shot(target) => {
                if matches!(kind, UnitKind::Engineer | UnitKind::Tank) {
                    self.explode(*target);
                } else {
                    self.strike(*target, 0);
                }
                if let Some(shooter) = self.units.get_mut(&id) {
                    shooter.spend_charge();
                }
            }
            UnitAction::Repair(target) => {
                let patient = self.occupant(*target);
                if let Some(armor) = patient
                    .and_then(|pid| self.units.get_mut(&pid))
                    .filter(|p| p.side == side)
                    .and_then(|p| p.armor.as_mut())
                {
                    armor.health = (armor.health + REPAIR_AMOUNT).min(ARMOR_MAX_HEALTH);
                }
                if let Some(engineer) = self.units.get_mut(&id) {
                    engineer.spend_charge();
                }
            }
            UnitAction::Occupy(claimant) => {
                if let Some(flag) = self.units.get_mut(&id) {
                    flag.side = claimant.clone();
                }
            }
        }
        Ok(())
    }

    fn apply_move(&mut self, id: UnitId, target: Cell) {
        let Some(unit) = self.units.get(&id) else {
            return;
        };
        let destination = if unit.kind.is_armor() {
            match resolve_manoeuvre(unit, target) {
                Some((centre, heading)) => (centre, Some(heading)),
                None => {
                    tracing::debug!(unit = %id, %target, "unknown manoeuvre ignored");
                    return;
                }
            }
        } else {
            (target, None)
        };
        if self.relocate(id, destination.0, destination.1) {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.waiting = 1;
                unit.bullet = 0;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Turn boundary
    // -----------------------------------------------------------------------

    /// Tick every unit once: cooldowns, then objective capture.
    pub fn tick<O: Oracle + ?Sized>(&mut self, oracle: &O) {
        let standings: Vec<_> = self
            .units
            .values()
            .filter(|u| u.kind == UnitKind::Flag)
            .map(|flag| (flag.id, presence(self, flag, oracle)))
            .collect();

        for unit in self.units.values_mut() {
            unit.tick_cooldown();
        }

        for (id, standing) in standings {
            if let Some(flag) = self.units.get_mut(&id) {
                if let Some(owner) = capture_step(flag, &standing) {
                    tracing::info!(flag = %id, owner = %owner, "objective changed hands");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Geometric queries
    // -----------------------------------------------------------------------

    pub fn moveable_tiles<O: Oracle + ?Sized>(&self, id: UnitId, oracle: &O) -> BTreeSet<Cell> {
        self.units
            .get(&id)
            .map(|unit| moveable_cells(self, unit, oracle))
            .unwrap_or_default()
    }

    /// Units visible to `id`; see [`Simulation::units_in_view_of`].
    pub fn piece_in_view<O: Oracle + ?Sized>(
        &self,
        id: UnitId,
        include_own: bool,
        oracle: &O,
    ) -> Vec<UnitId> {
        self.units
            .get(&id)
            .map(|unit| self.units_in_view_of(unit, include_own, oracle))
            .unwrap_or_default()
    }

    pub fn units_in_view_of<O: Oracle + ?Sized>(
        &self,
        viewer: &Unit,
        include_own: bool,
        oracle: &O,
    ) -> Vec<UnitId> {
        units_in_view(self, viewer, include_own, oracle)
    }

    /// Free cells within a unit's spawn radius. Units placed this turn
    /// offer none.
    pub fn spawnable_tiles(&self, id: UnitId) -> BTreeSet<Cell> {
        let Some(unit) = self.units.get(&id) else {
            return BTreeSet::new();
        };
        if unit.is_fresh() {
            return BTreeSet::new();
        }
        unit.cell
            .square(unit.profile().spawn_range)
            .filter(|&c| self.grid.is_open(c) && self.occupant(c).is_none())
            .collect()
    }

    /// Cells `side` may place into: its units' spawnable cells (flags only
    /// when `flags_only`) minus every cell a unit of any other side, neutral
    /// flags included, could spawn into.
    pub fn spawnable_cells(&self, side: &SideId, flags_only: bool) -> BTreeSet<Cell> {
        let mut own = BTreeSet::new();
        let mut contested = BTreeSet::new();
        for unit in self.units.values() {
            if unit.side == *side {
                if !flags_only || unit.kind == UnitKind::Flag {
                    own.extend(self.spawnable_tiles(unit.id));
                }
            } else {
                contested.extend(self.spawnable_tiles(unit.id));
            }
        }
        own.retain(|c| !contested.contains(c));
        own
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> Vec<UnitSnapshot> {
        self.units.values().map(Unit::snapshot).collect()
    }

    /// Make the registry match an authoritative unit list. Snapshots win
    /// over local state; the occupancy index is rebuilt afterwards.
    pub fn reconcile(&mut self, snapshots: &[UnitSnapshot]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let wanted: BTreeSet<UnitId> = snapshots.iter().map(|s| s.id).collect();

        let stale: Vec<UnitId> = self
            .units
            .keys()
            .filter(|id| !wanted.contains(id))
            .copied()
            .collect();
        for id in stale {
            self.units.remove(&id);
            report.removed.push(id);
        }

        for snapshot in snapshots {
            if snapshot.id.is_none() {
                tracing::warn!(kind = %snapshot.kind, "snapshot without id skipped");
                continue;
            }
            let fresh = Unit::from_snapshot(snapshot);
            match self.units.get_mut(&snapshot.id) {
                Some(existing) if *existing == fresh => {}
                Some(existing) => {
                    *existing = fresh;
                    report.updated.push(snapshot.id);
                }
                None => {
                    self.units.insert(snapshot.id, fresh);
                    report.created.push(snapshot.id);
                }
            }
        }

        let mut occupancy = AHashMap::new();
        for unit in self.units.values() {
            for cell in unit.footprint() {
                occupancy.insert(cell, unit.id);
            }
        }
        self.occupancy = occupancy;
        report
    }
}
