//! Unit record shared by every kind. Kind-specific behaviour lives in the
//! profile table and the `movement` / `sight` submodules.

mod movement;
mod profile;
mod sight;

use smallvec::SmallVec;

use crate::{Cell, Heading, SideId, UnitId, UnitKind, UnitSnapshot};

pub use movement::{armor_manoeuvres, step_cost, Manoeuvre};
pub use profile::{
    KindProfile, ARMOR_MAX_HEALTH, FRESH_WAITING, GRAPPLE, GRAPPLE_RANGE, REPAIR_AMOUNT,
};
pub(crate) use movement::{moveable_cells, resolve_manoeuvre};
pub(crate) use sight::units_in_view;

/// Cells covered by a unit; armor covers 9.
pub type Footprint = SmallVec<[Cell; 9]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armor {
    pub health: u32,
    pub heading: Heading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub side: SideId,
    pub cell: Cell,
    pub kind: UnitKind,
    pub waiting: u32,
    pub bullet: u32,
    pub equip: Option<String>,
    pub armor: Option<Armor>,
}

impl Unit {
    /// A freshly placed unit. Combat units start waiting at max with no charge.
    pub fn new(id: UnitId, kind: UnitKind, side: SideId, cell: Cell, heading: Heading) -> Self {
        let waiting = if kind.is_combatant() { FRESH_WAITING } else { 0 };
        let armor = kind.is_armor().then_some(Armor {
            health: ARMOR_MAX_HEALTH,
            heading,
        });
        Self {
            id,
            side,
            cell,
            kind,
            waiting,
            bullet: 0,
            equip: None,
            armor,
        }
    }

    #[must_use]
    pub fn with_equip(mut self, equip: &str) -> Self {
        self.equip = Some(equip.to_string());
        self
    }

    pub fn profile(&self) -> &'static KindProfile {
        self.kind.profile()
    }

    pub fn heading(&self) -> Option<Heading> {
        self.armor.map(|a| a.heading)
    }

    pub fn health(&self) -> Option<u32> {
        self.armor.map(|a| a.health)
    }

    /// Placed this turn and not yet ticked.
    pub fn is_fresh(&self) -> bool {
        self.kind.is_combatant() && self.waiting == FRESH_WAITING
    }

    pub fn has_grapple(&self) -> bool {
        self.kind == UnitKind::Assault && self.equip.as_deref() == Some(GRAPPLE)
    }

    pub fn footprint(&self) -> Footprint {
        footprint_at(self.kind, self.cell)
    }

    /// End-of-turn cooldown for combat units. Flags are ticked by the
    /// simulation because capture needs the board.
    pub fn tick_cooldown(&mut self) {
        if !self.kind.is_combatant() {
            return;
        }
        if self.waiting == FRESH_WAITING {
            self.waiting = 0;
        }
        if self.waiting > 0 {
            self.waiting -= 1;
        }
        if self.waiting == 0 {
            self.bullet = self.profile().charge;
        }
    }

    pub(crate) fn spend_charge(&mut self) {
        self.bullet = self.bullet.saturating_sub(1);
        self.waiting = 1;
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        let combatant = self.kind.is_combatant();
        UnitSnapshot {
            id: self.id,
            x: self.cell.x,
            z: self.cell.z,
            kind: self.kind,
            side: self.side.clone(),
            waiting: self.waiting,
            equip: self.equip.clone(),
            bullet: combatant.then_some(self.bullet),
            health: self.health(),
            direction: self.heading(),
        }
    }

    pub fn from_snapshot(snapshot: &UnitSnapshot) -> Self {
        let armor = snapshot.kind.is_armor().then(|| Armor {
            health: snapshot
                .health
                .unwrap_or(ARMOR_MAX_HEALTH)
                .min(ARMOR_MAX_HEALTH),
            heading: snapshot.direction.unwrap_or_default(),
        });
        Self {
            id: snapshot.id,
            side: snapshot.side.clone(),
            cell: Cell::new(snapshot.x, snapshot.z),
            kind: snapshot.kind,
            waiting: snapshot.waiting,
            bullet: snapshot.bullet.unwrap_or(0),
            equip: snapshot.equip.clone(),
            armor,
        }
    }
}

/// Cells a unit of `kind` would cover if centred on `cell`.
pub fn footprint_at(kind: UnitKind, cell: Cell) -> Footprint {
    if kind.is_armor() {
        cell.square(1).collect()
    } else {
        SmallVec::from_elem(cell, 1)
    }
}
