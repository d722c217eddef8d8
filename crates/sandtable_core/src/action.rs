//! Action log records and their flat wire form.
//!
//! On the wire every record is `{id, type, x?, z?, side?, soldier?,
//! soldier_id?, direction?}` with `id == 0` for turn-level records. In Rust the
//! sentinel becomes the enum tag.

use serde::{Deserialize, Serialize};

use crate::{ActionKind, Cell, Heading, SideId, UnitId, UnitKind, WireError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireAction", into = "WireAction")]
pub enum ActionRecord {
    Place(Placement),
    EndTurn { side: SideId },
    Unit { id: UnitId, action: UnitAction },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub unit_id: UnitId,
    pub kind: UnitKind,
    pub side: SideId,
    pub cell: Cell,
    /// Armor only.
    pub heading: Option<Heading>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitAction {
    Move(Cell),
    Shot(Cell),
    Repair(Cell),
    Occupy(SideId),
}

impl UnitAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            UnitAction::Move(_) => ActionKind::Move,
            UnitAction::Shot(_) => ActionKind::Shot,
            UnitAction::Repair(_) => ActionKind::Repair,
            UnitAction::Occupy(_) => ActionKind::Occupy,
        }
    }
}

impl ActionRecord {
    pub fn unit(id: UnitId, action: UnitAction) -> Self {
        ActionRecord::Unit { id, action }
    }

    pub fn end_turn(side: SideId) -> Self {
        ActionRecord::EndTurn { side }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireAction {
    #[serde(default)]
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    z: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    side: Option<SideId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    soldier: Option<UnitKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    soldier_id: Option<UnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direction: Option<Heading>,
}

impl WireAction {
    fn cell(&self, kind: &'static str) -> Result<Cell, WireError> {
        match (self.x, self.z) {
            (Some(x), Some(z)) => Ok(Cell::new(x, z)),
            (None, _) => Err(WireError::MissingField { kind, field: "x" }),
            (_, None) => Err(WireError::MissingField { kind, field: "z" }),
        }
    }

    fn side(&self, kind: &'static str) -> Result<SideId, WireError> {
        self.side
            .clone()
            .ok_or(WireError::MissingField { kind, field: "side" })
    }

    fn unit_id(&self, kind: &'static str) -> Result<UnitId, WireError> {
        if self.id == 0 {
            return Err(WireError::MissingUnitId(kind));
        }
        Ok(UnitId(self.id))
    }
}

impl TryFrom<WireAction> for ActionRecord {
    type Error = WireError;

    fn try_from(wire: WireAction) -> Result<Self, Self::Error> {
        let record = match wire.kind.as_str() {
            "place" => ActionRecord::Place(Placement {
                unit_id: wire.soldier_id.ok_or(WireError::MissingField {
                    kind: "place",
                    field: "soldier_id",
                })?,
                kind: wire.soldier.ok_or(WireError::MissingField {
                    kind: "place",
                    field: "soldier",
                })?,
                side: wire.side("place")?,
                cell: wire.cell("place")?,
                heading: wire.direction,
            }),
            "end_turn" => ActionRecord::EndTurn {
                side: wire.side("end_turn")?,
            },
            "move" => ActionRecord::unit(wire.unit_id("move")?, UnitAction::Move(wire.cell("move")?)),
            "shot" => ActionRecord::unit(wire.unit_id("shot")?, UnitAction::Shot(wire.cell("shot")?)),
            "repair" => ActionRecord::unit(
                wire.unit_id("repair")?,
                UnitAction::Repair(wire.cell("repair")?),
            ),
            "occupy" => ActionRecord::unit(
                wire.unit_id("occupy")?,
                UnitAction::Occupy(wire.side("occupy")?),
            ),
            other => return Err(WireError::UnknownType(other.to_string())),
        };
        Ok(record)
    }
}

impl From<ActionRecord> for WireAction {
    fn from(record: ActionRecord) -> Self {
        match record {
            ActionRecord::Place(p) => WireAction {
                kind: "place".to_string(),
                x: Some(p.cell.x),
                z: Some(p.cell.z),
                side: Some(p.side),
                soldier: Some(p.kind),
                soldier_id: Some(p.unit_id),
                direction: p.heading,
                ..WireAction::default()
            },
            ActionRecord::EndTurn { side } => WireAction {
                kind: "end_turn".to_string(),
                side: Some(side),
                ..WireAction::default()
            },
            ActionRecord::Unit { id, action } => {
                let mut wire = WireAction {
                    id: id.0,
                    kind: action.kind().wire_name().to_string(),
                    ..WireAction::default()
                };
                match action {
                    UnitAction::Move(cell) | UnitAction::Shot(cell) | UnitAction::Repair(cell) => {
                        wire.x = Some(cell.x);
                        wire.z = Some(cell.z);
                    }
                    UnitAction::Occupy(side) => wire.side = Some(side),
                }
                wire
            }
        }
    }
}
