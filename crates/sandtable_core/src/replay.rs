//! Action log replayer: consumes the shared log in order and hands the turn
//! over when the opponent's `end_turn` arrives.

use crate::{ActionRecord, Oracle, Placement, ReplayError, SharedDocument, SideId, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    MyTurn,
    OpponentTurn,
    /// Set by [`Replayer::resync`] while the log is replayed from zero. The
    /// closing [`Replayer::sync`] pass always settles it back to one of the
    /// turn states.
    Resyncing,
}

/// Outcome of one [`Replayer::sync`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records consumed this pass, echoes included.
    pub applied: usize,
    pub resynced: bool,
    /// The turn came to us; the document must be pushed.
    pub push: bool,
}

#[derive(Debug, Clone)]
pub struct Replayer {
    local: SideId,
    cursor: usize,
    state: TurnState,
}

impl Replayer {
    pub fn new(local: SideId, doc: &SharedDocument) -> Self {
        let mut replayer = Self {
            local,
            cursor: 0,
            state: TurnState::OpponentTurn,
        };
        replayer.refresh_state(doc);
        replayer
    }

    pub fn local_side(&self) -> &SideId {
        &self.local
    }

    /// Records consumed from the current log.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// It is our turn and we have not ended it yet.
    pub fn can_act(&self) -> bool {
        self.state == TurnState::MyTurn
    }

    fn refresh_state(&mut self, doc: &SharedDocument) {
        self.state = if doc.turn == self.local && !doc.has_ended_turn(&self.local) {
            TurnState::MyTurn
        } else {
            TurnState::OpponentTurn
        };
    }

    /// Consume every record past the cursor. A log that was cleared under us
    /// triggers a full resync first.
    pub fn sync<O: Oracle + ?Sized>(
        &mut self,
        sim: &mut Simulation,
        doc: &mut SharedDocument,
        oracle: &O,
    ) -> Result<SyncReport, ReplayError> {
        let mut report = SyncReport::default();
        sim.take_seats(doc);
        if doc.actions.is_empty() && self.cursor != 0 {
            self.resync(sim, doc);
            report.resynced = true;
        }

        while self.cursor < doc.actions.len() {
            let index = self.cursor;
            let record = doc.actions[index].clone();
            tracing::debug!(index, side = %self.local, ?record, "replay");
            match record {
                ActionRecord::EndTurn { side } => {
                    self.cursor += 1;
                    report.applied += 1;
                    if side != self.local {
                        self.hand_over(sim, doc, oracle);
                        report.push = true;
                    }
                    continue;
                }
                ActionRecord::Place(placement) => self.place(sim, &placement),
                ActionRecord::Unit { id, action } => {
                    sim.apply(id, &action).map_err(|err| err.at(index))?;
                }
            }
            self.cursor += 1;
            report.applied += 1;
        }

        self.refresh_state(doc);
        Ok(report)
    }

    /// Adopt the document's units, forces and cards, then replay its log
    /// from the start on the next [`Replayer::sync`]. The state reads
    /// [`TurnState::Resyncing`] until then.
    pub fn resync(&mut self, sim: &mut Simulation, doc: &SharedDocument) {
        self.state = TurnState::Resyncing;
        let changes = sim.reconcile(&doc.pieces);
        sim.adopt_ledgers(doc);
        self.cursor = 0;
        tracing::info!(
            side = %self.local,
            created = changes.created.len(),
            updated = changes.updated.len(),
            removed = changes.removed.len(),
            "resynced from snapshot"
        );
    }

    fn place(&self, sim: &mut Simulation, placement: &Placement) {
        let heading = if placement.kind.is_armor() {
            placement.heading
        } else {
            None
        };
        if let Err(err) = sim.spawn(
            placement.unit_id,
            placement.kind,
            placement.side.clone(),
            placement.cell,
            heading,
        ) {
            tracing::warn!(side = %self.local, unit = %placement.unit_id, %err, "placement ignored");
        }
    }

    fn hand_over<O: Oracle + ?Sized>(
        &mut self,
        sim: &mut Simulation,
        doc: &mut SharedDocument,
        oracle: &O,
    ) {
        doc.actions.clear();
        doc.turn = self.local.clone();
        sim.tick(oracle);
        doc.pieces = sim.snapshot();
        doc.store_ledgers(sim.ledgers());
        self.cursor = 0;
        tracing::info!(side = %self.local, units = doc.pieces.len(), "turn received");
    }
}

impl ReplayError {
    /// Attach the log index of the failing record.
    #[must_use]
    pub fn at(self, index: usize) -> Self {
        match self {
            ReplayError::UnknownUnit { id, .. } => ReplayError::UnknownUnit { index, id },
            ReplayError::UnsupportedAction { kind, action, .. } => {
                ReplayError::UnsupportedAction {
                    index,
                    kind,
                    action,
                }
            }
        }
    }
}
