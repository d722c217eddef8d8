//! Match configuration: starting force and the placement rule.

use serde::{Deserialize, Serialize};

use crate::UnitKind;

pub const DEFAULT_STARTING_FORCE: u32 = 128;
pub const DEFAULT_POINT_CAP: u32 = 56;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub starting_force: u32,
    pub placement: PlacementRule,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            starting_force: DEFAULT_STARTING_FORCE,
            placement: PlacementRule::default(),
        }
    }
}

/// Exactly one of these governs a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PlacementRule {
    /// Each kind costs points; a side's committed points stay under the cap.
    PointBudget { cap: u32 },
    /// Per-kind headcount caps. Armor cannot be placed.
    Headcount {
        assault: u32,
        engineer: u32,
        sniper: u32,
    },
}

impl Default for PlacementRule {
    fn default() -> Self {
        PlacementRule::PointBudget {
            cap: DEFAULT_POINT_CAP,
        }
    }
}

impl PlacementRule {
    pub const fn classic_headcount() -> Self {
        PlacementRule::Headcount {
            assault: 16,
            engineer: 8,
            sniper: 4,
        }
    }

    /// Can a side add one more `kind`, given what it already fields?
    ///
    /// `committed_points` and `fielded` describe the side's live units.
    pub fn allows(&self, kind: UnitKind, committed_points: u32, fielded: u32) -> bool {
        self.remaining(kind, committed_points, fielded) >= self.unit_cost(kind)
            && self.unit_cost(kind) > 0
    }

    /// Points left under a budget, heads left under a cap.
    pub fn remaining(&self, kind: UnitKind, committed_points: u32, fielded: u32) -> u32 {
        match *self {
            PlacementRule::PointBudget { cap } => cap.saturating_sub(committed_points),
            PlacementRule::Headcount {
                assault,
                engineer,
                sniper,
            } => {
                let limit = match kind {
                    UnitKind::Assault => assault,
                    UnitKind::Engineer => engineer,
                    UnitKind::Sniper => sniper,
                    UnitKind::Tank | UnitKind::Flag => 0,
                };
                limit.saturating_sub(fielded)
            }
        }
    }

    /// What one `kind` consumes; zero means it cannot be placed at all.
    pub fn unit_cost(&self, kind: UnitKind) -> u32 {
        match self {
            PlacementRule::PointBudget { .. } => kind.profile().points,
            PlacementRule::Headcount { .. } => match kind {
                UnitKind::Assault | UnitKind::Engineer | UnitKind::Sniper => 1,
                UnitKind::Tank | UnitKind::Flag => 0,
            },
        }
    }
}
