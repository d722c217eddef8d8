//! Type definitions for `sandtable_core`.
//!
//! IDs, grid coordinates, headings and unit kinds shared by every module.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(SideId);

impl SideId {
    /// The empty side owns nothing; only objective markers may be neutral.
    pub fn neutral() -> Self {
        Self(String::new())
    }

    pub fn is_neutral(&self) -> bool {
        self.0.is_empty()
    }
}

/// Unit identifier. Zero never names a unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl UnitId {
    pub const NONE: UnitId = UnitId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque card identifier; the core only stores hands.
pub type CardId = u32;

// ---------------------------------------------------------------------------
// Grid coordinates
// ---------------------------------------------------------------------------

/// The 8 neighbour offsets, orthogonal first.
pub const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    pub fn distance_squared(self, other: Cell) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dz = u64::from(self.z.abs_diff(other.z));
        dx * dx + dz * dz
    }

    /// Cells of the square block of the given radius centred here, row by row.
    pub fn square(self, radius: i32) -> impl Iterator<Item = Cell> {
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dz| self.offset(dx, dz)))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// Armor heading, in quarter turns. Travels on the wire as `0..=3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Heading {
    /// Forward is `+z`.
    #[default]
    PlusZ,
    /// Forward is `+x`.
    PlusX,
    /// Forward is `-z`.
    MinusZ,
    /// Forward is `-x`.
    MinusX,
}

impl Heading {
    pub const ALL: [Heading; 4] = [
        Heading::PlusZ,
        Heading::PlusX,
        Heading::MinusZ,
        Heading::MinusX,
    ];

    pub const fn index(self) -> u8 {
        match self {
            Heading::PlusZ => 0,
            Heading::PlusX => 1,
            Heading::MinusZ => 2,
            Heading::MinusX => 3,
        }
    }

    /// Rotate by `quarter_turns` (negative turns the other way).
    #[must_use]
    pub fn rotated(self, quarter_turns: i32) -> Self {
        let index = (i32::from(self.index()) + quarter_turns).rem_euclid(4);
        Heading::ALL[index as usize]
    }

    /// Map a heading-relative offset to a world offset.
    pub const fn to_world(self, dx: i32, dz: i32) -> (i32, i32) {
        match self {
            Heading::PlusZ => (dx, dz),
            Heading::PlusX => (dz, -dx),
            Heading::MinusZ => (-dx, -dz),
            Heading::MinusX => (-dz, dx),
        }
    }

    /// Inverse of [`Heading::to_world`].
    pub const fn to_local(self, dx: i32, dz: i32) -> (i32, i32) {
        match self {
            Heading::PlusZ => (dx, dz),
            Heading::PlusX => (dz.saturating_neg(), dx),
            Heading::MinusZ => (dx.saturating_neg(), dz.saturating_neg()),
            Heading::MinusX => (dz, dx.saturating_neg()),
        }
    }
}

impl TryFrom<u8> for Heading {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Heading::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| format!("heading {value} is not in 0..=3"))
    }
}

impl From<Heading> for u8 {
    fn from(value: Heading) -> Self {
        value.index()
    }
}

// ---------------------------------------------------------------------------
// Unit kinds and actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Rifle unit. Can carry the `Grapple` loadout.
    Assault,
    /// Explosive charges and armor repair.
    Engineer,
    /// Marksman: long sight, short legs.
    Sniper,
    /// Armor with a 3×3 footprint and a heading.
    Tank,
    /// Capturable objective marker.
    Flag,
}

impl UnitKind {
    pub const PLACEABLE: [UnitKind; 4] = [
        UnitKind::Assault,
        UnitKind::Engineer,
        UnitKind::Sniper,
        UnitKind::Tank,
    ];

    pub const fn is_combatant(self) -> bool {
        !matches!(self, UnitKind::Flag)
    }

    pub const fn is_armor(self) -> bool {
        matches!(self, UnitKind::Tank)
    }

    pub const fn label(self) -> &'static str {
        match self {
            UnitKind::Assault => "Assault",
            UnitKind::Engineer => "Engineer",
            UnitKind::Sniper => "Sniper",
            UnitKind::Tank => "Tank",
            UnitKind::Flag => "Flag",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Action record types a unit may handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Shot,
    Repair,
    Occupy,
}

impl ActionKind {
    pub const fn wire_name(self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Shot => "shot",
            ActionKind::Repair => "repair",
            ActionKind::Occupy => "occupy",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
