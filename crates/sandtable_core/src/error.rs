use thiserror::Error;

use crate::{ActionKind, Cell, UnitId, UnitKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{depth}")]
    EmptyGrid { width: i32, depth: i32 },

    #[error("expected {expected} tiles for the grid, got {actual}")]
    TileCount { expected: usize, actual: usize },

    #[error("tile height must be at least 1 (cell {0})")]
    ZeroHeight(Cell),
}

/// Why a unit could not be put on the board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("unit id 0 is reserved")]
    ReservedId,

    #[error("unit {0} already exists")]
    DuplicateId(UnitId),

    #[error("cell {0} is outside the grid")]
    OutOfRange(Cell),

    #[error("cell {0} is obstructed")]
    Obstructed(Cell),

    #[error("cell {cell} is held by unit {occupant}")]
    Occupied { cell: Cell, occupant: UnitId },
}

/// Fatal replay failures. The replayer stops at the offending record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("record {index}: unknown unit {id}")]
    UnknownUnit { index: usize, id: UnitId },

    #[error("record {index}: {kind} units cannot handle `{action}`")]
    UnsupportedAction {
        index: usize,
        kind: UnitKind,
        action: ActionKind,
    },
}

/// Malformed action record on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unknown action type `{0}`")]
    UnknownType(String),

    #[error("`{kind}` record is missing field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("`{0}` record must carry a unit id")]
    MissingUnitId(&'static str),
}
