use crate::{ActionKind, UnitKind};

/// Static per-kind rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// Movement budget for the cost-limited walk. Armor ignores it.
    pub strength: u32,
    pub view_range: u32,
    /// Half-width of the square a unit can spawn allies into.
    pub spawn_range: i32,
    /// Charges restored on cooldown.
    pub charge: u32,
    /// Placement cost under the point budget.
    pub points: u32,
    /// Force lost when a unit of this kind dies, before amplification.
    pub loss: u32,
    pub actions: &'static [ActionKind],
}

pub const ARMOR_MAX_HEALTH: u32 = 27;
pub const REPAIR_AMOUNT: u32 = 9;
/// `waiting` of a freshly placed combat unit.
pub const FRESH_WAITING: u32 = 10;
pub const GRAPPLE: &str = "Grapple";
pub const GRAPPLE_RANGE: i32 = 8;

const ASSAULT: KindProfile = KindProfile {
    strength: 4,
    view_range: 5,
    spawn_range: 2,
    charge: 3,
    points: 1,
    loss: 1,
    actions: &[ActionKind::Move, ActionKind::Shot],
};

const ENGINEER: KindProfile = KindProfile {
    strength: 2,
    view_range: 5,
    spawn_range: 2,
    charge: 1,
    points: 2,
    loss: 1,
    actions: &[ActionKind::Move, ActionKind::Shot, ActionKind::Repair],
};

const SNIPER: KindProfile = KindProfile {
    strength: 1,
    view_range: 7,
    spawn_range: 2,
    charge: 1,
    points: 4,
    loss: 1,
    actions: &[ActionKind::Move, ActionKind::Shot],
};

const TANK: KindProfile = KindProfile {
    strength: 0,
    view_range: 8,
    spawn_range: 2,
    charge: 1,
    points: 8,
    loss: 8,
    actions: &[ActionKind::Move, ActionKind::Shot],
};

const FLAG: KindProfile = KindProfile {
    strength: 0,
    view_range: 2,
    spawn_range: 4,
    charge: 0,
    points: 0,
    loss: 0,
    actions: &[ActionKind::Occupy],
};

impl UnitKind {
    pub const fn profile(self) -> &'static KindProfile {
        match self {
            UnitKind::Assault => &ASSAULT,
            UnitKind::Engineer => &ENGINEER,
            UnitKind::Sniper => &SNIPER,
            UnitKind::Tank => &TANK,
            UnitKind::Flag => &FLAG,
        }
    }

    pub fn handles(self, action: ActionKind) -> bool {
        self.profile().actions.contains(&action)
    }
}
