//! One side's session: local simulation, replayer and channel, driven by a
//! single event queue.

use std::collections::VecDeque;

use rand::Rng;
use thiserror::Error;

use sandtable_core::{
    ActionRecord, Grid, Oracle, ReplayError, Replayer, Replication, Ruleset, SharedDocument, SideId,
    Simulation, SyncReport, TurnState,
};

use crate::{objective_records, plan, Intent, IntentError};

/// Everything a peer reacts to, handled one at a time in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Intent(Intent),
    Remote(SharedDocument),
}

#[derive(Error, Debug)]
pub enum PeerError {
    #[error("no match document on the channel")]
    NoDocument,

    #[error("both seats are taken; {0} cannot join")]
    SeatTaken(SideId),

    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}

pub struct Peer<C: Replication, R: Rng> {
    side: SideId,
    sim: Simulation,
    replayer: Replayer,
    doc: SharedDocument,
    channel: C,
    oracle: Box<dyn Oracle>,
    rng: R,
    queue: VecDeque<PeerEvent>,
    /// Documents we pushed whose echo has not come back yet.
    sent: VecDeque<SharedDocument>,
}

impl<C: Replication, R: Rng> Peer<C, R> {
    /// Join the match on `channel` as `side`, catch up with its log and
    /// append any objective records this side owes.
    pub fn connect(
        side: SideId,
        grid: Grid,
        ruleset: Ruleset,
        channel: C,
        oracle: Box<dyn Oracle>,
        rng: R,
    ) -> Result<Self, PeerError> {
        let mut doc = channel.read().ok_or(PeerError::NoDocument)?;
        let seated = doc.seat_of(&side).is_some();
        if !doc.join(side.clone()) {
            return Err(PeerError::SeatTaken(side));
        }
        let sim = Simulation::from_document(grid, ruleset, &doc);
        let replayer = Replayer::new(side.clone(), &doc);
        let mut peer = Self {
            side,
            sim,
            replayer,
            doc,
            channel,
            oracle,
            rng,
            queue: VecDeque::new(),
            sent: VecDeque::new(),
        };

        let report = peer.sync()?;
        let records = objective_records(&peer.sim, &peer.doc, &peer.side);
        tracing::info!(
            side = %peer.side,
            units = peer.sim.unit_count(),
            objectives = records.len(),
            "connected"
        );
        if records.is_empty() {
            if !seated || report.push {
                peer.push();
            }
        } else {
            for record in records {
                peer.append(record);
            }
            peer.sync()?;
        }
        Ok(peer)
    }

    pub fn side(&self) -> &SideId {
        &self.side
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn replayer(&self) -> &Replayer {
        &self.replayer
    }

    pub fn state(&self) -> TurnState {
        self.replayer.state()
    }

    pub fn can_act(&self) -> bool {
        self.replayer.can_act()
    }

    pub fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn enqueue(&mut self, intent: Intent) {
        self.queue.push_back(PeerEvent::Intent(intent));
    }

    /// Move every notification waiting on the channel into the queue.
    pub fn receive(&mut self) {
        let incoming = self.channel.poll();
        self.queue.extend(incoming.into_iter().map(PeerEvent::Remote));
    }

    /// Handle one event to completion.
    pub fn handle(&mut self, event: PeerEvent) -> Result<(), PeerError> {
        match event {
            PeerEvent::Intent(intent) => self.handle_intent(&intent),
            PeerEvent::Remote(incoming) => self.handle_remote(incoming),
        }
    }

    /// Drain the queue. Rejected intents are logged and dropped; a replay
    /// failure stops the peer.
    pub fn run(&mut self) -> Result<usize, PeerError> {
        let mut handled = 0;
        while let Some(event) = self.queue.pop_front() {
            match self.handle(event) {
                Ok(()) => handled += 1,
                Err(PeerError::Intent(err)) => {
                    tracing::warn!(side = %self.side, %err, "intent rejected");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(handled)
    }

    /// Receive, then run.
    pub fn pump(&mut self) -> Result<usize, PeerError> {
        self.receive();
        self.run()
    }

    fn handle_intent(&mut self, intent: &Intent) -> Result<(), PeerError> {
        if !self.replayer.can_act() {
            return Err(IntentError::NotYourTurn(self.side.clone()).into());
        }
        let records = plan(
            intent,
            &self.sim,
            &self.side,
            self.oracle.as_ref(),
            &mut self.rng,
        )?;
        for record in records {
            self.append(record);
        }
        let report = self.sync()?;
        if report.push {
            self.push();
        }
        Ok(())
    }

    fn handle_remote(&mut self, incoming: SharedDocument) -> Result<(), PeerError> {
        if let Some(pos) = self.sent.iter().position(|d| *d == incoming) {
            self.sent.drain(..=pos);
            return Ok(());
        }
        if incoming == self.doc {
            return Ok(());
        }
        self.doc = incoming;
        let report = self.sync()?;
        if report.push {
            self.push();
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<SyncReport, ReplayError> {
        self.replayer
            .sync(&mut self.sim, &mut self.doc, self.oracle.as_ref())
    }

    fn append(&mut self, record: ActionRecord) {
        self.channel.append(&mut self.doc, record);
        self.sent.push_back(self.doc.clone());
    }

    fn push(&mut self) {
        self.channel.push(&self.doc);
        self.sent.push_back(self.doc.clone());
    }
}
