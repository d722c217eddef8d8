//! The replicated match document and unit snapshots.

use serde::{Deserialize, Serialize};

use crate::{ActionRecord, CardId, Heading, SideId, UnitId, UnitKind};

/// Full state of one unit as stored in the shared document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub x: i32,
    pub z: i32,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub side: SideId,
    #[serde(default)]
    pub waiting: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Heading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

/// Force pool and card hand of one seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideLedger {
    pub side: SideId,
    pub force: u32,
    pub cards: Vec<CardId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDocument {
    pub turn: SideId,
    pub user1: SideId,
    #[serde(default)]
    pub user2: SideId,
    pub map: String,
    #[serde(default)]
    pub pieces: Vec<UnitSnapshot>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    #[serde(default)]
    pub user1force: u32,
    #[serde(default)]
    pub user2force: u32,
    #[serde(default)]
    pub user1card: Vec<CardId>,
    #[serde(default)]
    pub user2card: Vec<CardId>,
}

impl SharedDocument {
    /// A fresh match opened by `host`, who moves first.
    pub fn open(host: SideId, map: &str, starting_force: u32) -> Self {
        Self {
            turn: host.clone(),
            user1: host,
            user2: SideId::neutral(),
            map: map.to_string(),
            pieces: Vec::new(),
            actions: Vec::new(),
            user1force: starting_force,
            user2force: starting_force,
            user1card: Vec::new(),
            user2card: Vec::new(),
        }
    }

    pub fn seat_of(&self, side: &SideId) -> Option<Seat> {
        if side.is_neutral() {
            None
        } else if *side == self.user1 {
            Some(Seat::First)
        } else if *side == self.user2 {
            Some(Seat::Second)
        } else {
            None
        }
    }

    /// The other seated side, if someone holds it.
    pub fn opponent_of(&self, side: &SideId) -> Option<&SideId> {
        let other = match self.seat_of(side)? {
            Seat::First => &self.user2,
            Seat::Second => &self.user1,
        };
        (!other.is_neutral()).then_some(other)
    }

    /// Seat a second player. Returns false when both seats are taken.
    pub fn join(&mut self, side: SideId) -> bool {
        if self.seat_of(&side).is_some() {
            return true;
        }
        if !self.user2.is_neutral() || side.is_neutral() {
            return false;
        }
        self.user2 = side;
        true
    }

    pub fn ledgers(&self) -> [SideLedger; 2] {
        [
            SideLedger {
                side: self.user1.clone(),
                force: self.user1force,
                cards: self.user1card.clone(),
            },
            SideLedger {
                side: self.user2.clone(),
                force: self.user2force,
                cards: self.user2card.clone(),
            },
        ]
    }

    /// Write force and cards back by seat.
    pub fn store_ledgers(&mut self, ledgers: &[SideLedger; 2]) {
        for ledger in ledgers {
            match self.seat_of(&ledger.side) {
                Some(Seat::First) => {
                    self.user1force = ledger.force;
                    self.user1card.clone_from(&ledger.cards);
                }
                Some(Seat::Second) => {
                    self.user2force = ledger.force;
                    self.user2card.clone_from(&ledger.cards);
                }
                None => {}
            }
        }
    }

    /// The side has already ended its turn in the current log.
    pub fn has_ended_turn(&self, side: &SideId) -> bool {
        self.actions
            .iter()
            .any(|record| matches!(record, ActionRecord::EndTurn { side: s } if s == side))
    }
}
