//! Intent validation: what becomes a record and what is turned away.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sandtable_control::{plan, Intent, IntentError};
use sandtable_core::test_fixtures::{
    flag, flat_grid, put, ready_tank, ready_unit, side_a, side_b, two_side_sim,
};
use sandtable_core::*;
use serde_json::json;

fn plan_for_a(sim: &Simulation, intent: &Intent) -> Result<Vec<ActionRecord>, IntentError> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    plan(intent, sim, &side_a(), &ClearSight, &mut rng)
}

fn sim_with_rule(placement: PlacementRule) -> Simulation {
    let ruleset = Ruleset {
        placement,
        ..Ruleset::default()
    };
    Simulation::new(flat_grid(16, 16), ruleset, [side_a(), side_b()])
}

#[test]
fn placement_in_own_zone_gets_a_fresh_id() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    put(&mut sim, flag(1, side_a(), 3, 3));

    let records = plan_for_a(
        &sim,
        &Intent::Place {
            kind: UnitKind::Assault,
            cell: Cell::new(4, 4),
            heading: Heading::MinusX,
        },
    )
    .unwrap();

    assert_eq!(records.len(), 1);
    let ActionRecord::Place(placement) = &records[0] else {
        panic!("expected a place record, got {:?}", records[0]);
    };
    assert_eq!(placement.kind, UnitKind::Assault);
    assert_eq!(placement.side, side_a());
    assert_eq!(placement.cell, Cell::new(4, 4));
    assert_eq!(placement.heading, None);
    assert!(!placement.unit_id.is_none());
    assert!(sim.unit(placement.unit_id).is_none());
}

#[test]
fn placement_outside_the_zone_is_rejected() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    put(&mut sim, flag(1, side_a(), 3, 3));

    let err = plan_for_a(
        &sim,
        &Intent::Place {
            kind: UnitKind::Sniper,
            cell: Cell::new(12, 12),
            heading: Heading::PlusZ,
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        IntentError::NotSpawnable {
            kind: UnitKind::Sniper,
            cell: Cell::new(12, 12)
        }
    );
}

#[test]
fn placement_respects_the_selected_rule() {
    let mut budget = sim_with_rule(PlacementRule::PointBudget { cap: 2 });
    put(&mut budget, flag(1, side_a(), 3, 3));
    put(&mut budget, ready_unit(2, UnitKind::Engineer, side_a(), 5, 5));
    let assault = Intent::Place {
        kind: UnitKind::Assault,
        cell: Cell::new(4, 4),
        heading: Heading::PlusZ,
    };
    assert_eq!(
        plan_for_a(&budget, &assault).unwrap_err(),
        IntentError::OverBudget(UnitKind::Assault)
    );

    let mut heads = sim_with_rule(PlacementRule::classic_headcount());
    put(&mut heads, flag(1, side_a(), 3, 3));
    assert!(plan_for_a(&heads, &assault).is_ok());
    let tank = Intent::Place {
        kind: UnitKind::Tank,
        cell: Cell::new(4, 4),
        heading: Heading::PlusZ,
    };
    assert_eq!(
        plan_for_a(&heads, &tank).unwrap_err(),
        IntentError::OverBudget(UnitKind::Tank)
    );
}

#[test]
fn moves_must_be_reachable_and_owned() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    let ours = put(&mut sim, ready_unit(5, UnitKind::Assault, side_a(), 5, 5));
    let theirs = put(&mut sim, ready_unit(6, UnitKind::Assault, side_b(), 12, 12));

    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Move {
                unit: ours,
                cell: Cell::new(6, 5)
            }
        )
        .unwrap(),
        vec![ActionRecord::unit(ours, UnitAction::Move(Cell::new(6, 5)))]
    );
    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Move {
                unit: ours,
                cell: Cell::new(11, 5)
            }
        )
        .unwrap_err(),
        IntentError::Unreachable {
            unit: ours,
            cell: Cell::new(11, 5)
        }
    );
    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Move {
                unit: theirs,
                cell: Cell::new(12, 11)
            }
        )
        .unwrap_err(),
        IntentError::NotOwned(theirs)
    );
    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Move {
                unit: UnitId(99),
                cell: Cell::new(1, 1)
            }
        )
        .unwrap_err(),
        IntentError::UnknownUnit(UnitId(99))
    );
}

#[test]
fn attacks_need_charge_and_a_line_of_sight() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    let shooter = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 5, 5));
    let near = put(&mut sim, ready_unit(2, UnitKind::Sniper, side_b(), 7, 5));
    let far = put(&mut sim, ready_unit(3, UnitKind::Sniper, side_b(), 15, 15));
    let mut spent = ready_unit(4, UnitKind::Assault, side_a(), 6, 7);
    spent.bullet = 0;
    let spent = put(&mut sim, spent);

    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Attack {
                unit: shooter,
                target: near
            }
        )
        .unwrap(),
        vec![ActionRecord::unit(shooter, UnitAction::Shot(Cell::new(7, 5)))]
    );
    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Attack {
                unit: shooter,
                target: far
            }
        )
        .unwrap_err(),
        IntentError::NotInView {
            unit: shooter,
            target: far
        }
    );
    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Attack {
                unit: spent,
                target: near
            }
        )
        .unwrap_err(),
        IntentError::NoCharge(spent)
    );
}

#[test]
fn engineer_attack_on_friendly_armor_is_a_repair() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    let engineer = put(&mut sim, ready_unit(1, UnitKind::Engineer, side_a(), 5, 5));
    let rifle = put(&mut sim, ready_unit(2, UnitKind::Assault, side_a(), 5, 3));
    let tank = put(&mut sim, ready_tank(3, side_a(), 7, 5, Heading::PlusZ));

    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Attack {
                unit: engineer,
                target: tank
            }
        )
        .unwrap(),
        vec![ActionRecord::unit(engineer, UnitAction::Repair(Cell::new(7, 5)))]
    );
    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::Attack {
                unit: rifle,
                target: tank
            }
        )
        .unwrap_err(),
        IntentError::NotInView {
            unit: rifle,
            target: tank
        }
    );
}

#[test]
fn batch_move_claims_distinct_cells_and_skips_armor() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    let first = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 2, 2));
    let second = put(&mut sim, ready_unit(2, UnitKind::Assault, side_a(), 3, 2));
    let tank = put(&mut sim, ready_tank(3, side_a(), 10, 10, Heading::PlusZ));

    let records = plan_for_a(
        &sim,
        &Intent::BatchMove {
            units: vec![first, second, tank],
            toward: Cell::new(10, 2),
        },
    )
    .unwrap();
    assert_eq!(
        records,
        vec![
            ActionRecord::unit(first, UnitAction::Move(Cell::new(6, 2))),
            ActionRecord::unit(second, UnitAction::Move(Cell::new(7, 2))),
        ]
    );

    assert_eq!(
        plan_for_a(
            &sim,
            &Intent::BatchMove {
                units: vec![tank],
                toward: Cell::new(0, 0)
            }
        )
        .unwrap_err(),
        IntentError::EmptySelection
    );
}

#[test]
fn end_turn_names_the_acting_side() {
    let sim = two_side_sim(flat_grid(8, 8));
    assert_eq!(
        plan_for_a(&sim, &Intent::EndTurn).unwrap(),
        vec![ActionRecord::end_turn(side_a())]
    );
}

#[test]
fn intents_read_from_json() {
    let intents: Vec<Intent> = serde_json::from_value(json!([
        {"intent": "place", "kind": "Sniper", "cell": {"x": 1, "z": 2}, "heading": 3},
        {"intent": "batch_move", "units": [4, 5], "toward": {"x": 9, "z": 9}},
        {"intent": "end_turn"}
    ]))
    .unwrap();
    assert_eq!(
        intents,
        vec![
            Intent::Place {
                kind: UnitKind::Sniper,
                cell: Cell::new(1, 2),
                heading: Heading::MinusX,
            },
            Intent::BatchMove {
                units: vec![UnitId(4), UnitId(5)],
                toward: Cell::new(9, 9),
            },
            Intent::EndTurn,
        ]
    );
}
