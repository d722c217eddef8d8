//! Two peers sharing one document through the loopback hub.

use proptest::prelude::*;

use sandtable_core::test_fixtures::{flat_grid, match_document, side_a, side_b};
use sandtable_core::{
    ActionRecord, Cell, ClearSight, HubEndpoint, LoopbackHub, Placement, Replayer, Replication,
    Ruleset, SharedDocument, SideId, Simulation, TurnState, UnitAction, UnitId, UnitKind,
};

struct Peer {
    sim: Simulation,
    replayer: Replayer,
    doc: SharedDocument,
    link: HubEndpoint,
}

impl Peer {
    fn join(hub: &LoopbackHub, side: SideId) -> Self {
        let link = hub.endpoint();
        let doc = link.read().unwrap();
        let sim = Simulation::from_document(flat_grid(16, 16), Ruleset::default(), &doc);
        let replayer = Replayer::new(side, &doc);
        Self {
            sim,
            replayer,
            doc,
            link,
        }
    }

    /// Publish a record and apply it locally, as the acting side does.
    fn act(&mut self, record: ActionRecord) {
        self.link.append(&mut self.doc, record);
        self.replayer
            .sync(&mut self.sim, &mut self.doc, &ClearSight)
            .unwrap();
    }

    /// Drain notifications, skipping ones identical to the local copy.
    fn pump(&mut self) {
        for incoming in self.link.poll() {
            if incoming == self.doc {
                continue;
            }
            self.doc = incoming;
            let report = self
                .replayer
                .sync(&mut self.sim, &mut self.doc, &ClearSight)
                .unwrap();
            if report.push {
                self.link.push(&self.doc);
            }
        }
    }
}

fn place(id: u64, kind: UnitKind, side: SideId, x: i32, z: i32) -> ActionRecord {
    ActionRecord::Place(Placement {
        unit_id: UnitId(id),
        kind,
        side,
        cell: Cell::new(x, z),
        heading: None,
    })
}

fn settle(a: &mut Peer, b: &mut Peer) {
    for _ in 0..4 {
        a.pump();
        b.pump();
    }
}

#[test]
fn peers_converge_over_two_turns() {
    let hub = LoopbackHub::new(match_document());
    let mut a = Peer::join(&hub, side_a());
    let mut b = Peer::join(&hub, side_b());
    assert_eq!(a.replayer.state(), TurnState::MyTurn);
    assert_eq!(b.replayer.state(), TurnState::OpponentTurn);

    // A's first turn: place two units and hand over
    a.act(place(11, UnitKind::Assault, side_a(), 2, 2));
    a.act(place(12, UnitKind::Engineer, side_a(), 3, 2));
    a.act(ActionRecord::end_turn(side_a()));
    settle(&mut a, &mut b);

    assert_eq!(b.replayer.state(), TurnState::MyTurn);
    assert_eq!(a.replayer.state(), TurnState::OpponentTurn);
    assert_eq!(a.sim.snapshot(), b.sim.snapshot());
    assert_eq!(a.replayer.cursor(), 0);

    // B's turn: place, then end
    b.act(place(21, UnitKind::Sniper, side_b(), 12, 12));
    b.act(ActionRecord::end_turn(side_b()));
    settle(&mut a, &mut b);

    // A's second turn: its units have cooled down
    assert_eq!(a.replayer.state(), TurnState::MyTurn);
    assert_eq!(a.sim.unit(UnitId(11)).unwrap().bullet, 3);
    a.act(ActionRecord::unit(UnitId(11), UnitAction::Move(Cell::new(4, 4))));
    a.act(ActionRecord::unit(UnitId(12), UnitAction::Move(Cell::new(3, 3))));
    a.act(ActionRecord::end_turn(side_a()));
    settle(&mut a, &mut b);

    assert_eq!(a.sim.snapshot(), b.sim.snapshot());
    assert_eq!(a.sim.ledgers(), b.sim.ledgers());
    assert_eq!(b.sim.unit(UnitId(11)).unwrap().cell, Cell::new(4, 4));
    assert_eq!(hub.document().unwrap().turn, side_b());
    assert_eq!(hub.pending(), 0);
}

#[test]
fn combat_losses_replicate() {
    let hub = LoopbackHub::new(match_document());
    let mut a = Peer::join(&hub, side_a());
    let mut b = Peer::join(&hub, side_b());

    a.act(place(11, UnitKind::Assault, side_a(), 2, 2));
    a.act(ActionRecord::end_turn(side_a()));
    settle(&mut a, &mut b);
    b.act(place(21, UnitKind::Assault, side_b(), 5, 2));
    b.act(ActionRecord::end_turn(side_b()));
    settle(&mut a, &mut b);

    a.act(ActionRecord::unit(UnitId(11), UnitAction::Shot(Cell::new(5, 2))));
    a.act(ActionRecord::end_turn(side_a()));
    settle(&mut a, &mut b);

    assert!(b.sim.unit(UnitId(21)).is_none());
    assert_eq!(b.sim.force(&side_b()), Some(127));
    assert_eq!(a.sim.force(&side_b()), Some(127));
    assert_eq!(hub.document().unwrap().user2force, 127);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Syncing the same log twice changes nothing the second time.
    #[test]
    fn prop_replay_is_idempotent(
        cells in proptest::collection::vec((0i32..16, 0i32..16), 1..12),
    ) {
        let mut doc = match_document();
        doc.actions = cells
            .iter()
            .enumerate()
            .map(|(i, &(x, z))| place(i as u64 + 1, UnitKind::Assault, side_a(), x, z))
            .collect();
        let mut sim = Simulation::from_document(flat_grid(16, 16), Ruleset::default(), &doc);
        let mut replayer = Replayer::new(side_b(), &doc);

        replayer.sync(&mut sim, &mut doc, &ClearSight).unwrap();
        let first = sim.snapshot();
        let cursor = replayer.cursor();
        let report = replayer.sync(&mut sim, &mut doc, &ClearSight).unwrap();

        prop_assert_eq!(report.applied, 0);
        prop_assert_eq!(replayer.cursor(), cursor);
        prop_assert_eq!(sim.snapshot(), first);
    }
}
