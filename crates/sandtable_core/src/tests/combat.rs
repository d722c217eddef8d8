use super::*;

/// A holds one flag, B holds three.
fn outnumbered_field() -> Simulation {
    let mut sim = two_side_sim(flat_grid(20, 20));
    put(&mut sim, flag(101, side_a(), 0, 0));
    put(&mut sim, flag(102, side_b(), 19, 19));
    put(&mut sim, flag(103, side_b(), 19, 0));
    put(&mut sim, flag(104, side_b(), 0, 19));
    put(&mut sim, flag(105, SideId::neutral(), 10, 0));
    sim
}

#[test]
fn attrition_amplifies_losses_of_the_side_behind_on_objectives() {
    let mut sim = outnumbered_field();
    let a = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 8, 8));
    let b = put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 10, 10));

    sim.kill(a);
    assert_eq!(sim.force(&side_a()), Some(123));

    sim.kill(b);
    assert_eq!(sim.force(&side_b()), Some(127));
}

#[test]
fn armor_loss_base_is_eight() {
    let mut sim = outnumbered_field();
    let tank = put(&mut sim, ready_tank(1, side_b(), 8, 8, Heading::PlusZ));
    sim.kill(tank);
    assert_eq!(sim.force(&side_b()), Some(120));
    assert_eq!(sim.attrition_loss(&side_a(), 8), 40);
}

#[test]
fn force_saturates_at_zero() {
    let mut sim = outnumbered_field();
    for id in 1..=30 {
        put(&mut sim, ready_unit(id, UnitKind::Assault, side_a(), 5, 5));
        sim.kill(UnitId(id));
    }
    assert_eq!(sim.force(&side_a()), Some(0));
}

#[test]
fn rifle_shot_kills_infantry_but_not_armor() {
    let mut sim = open_field();
    let rifle = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 1, 1));
    let victim = put(&mut sim, ready_unit(2, UnitKind::Sniper, side_b(), 3, 1));
    let tank = put(&mut sim, ready_tank(3, side_b(), 6, 6, Heading::PlusZ));

    sim.apply(rifle, &UnitAction::Shot(Cell::new(3, 1))).unwrap();
    assert!(sim.unit(victim).is_none());
    assert_eq!(sim.occupant(Cell::new(3, 1)), None);
    let shooter = sim.unit(rifle).unwrap();
    assert_eq!((shooter.bullet, shooter.waiting), (2, 1));

    sim.apply(rifle, &UnitAction::Shot(Cell::new(6, 7))).unwrap();
    assert_eq!(sim.unit(tank).unwrap().health(), Some(ARMOR_MAX_HEALTH));
}

#[test]
fn explosion_hits_armor_once_per_overlapped_cell() {
    let mut sim = open_field();
    let engineer = put(&mut sim, ready_unit(1, UnitKind::Engineer, side_a(), 1, 1));
    let tank = put(&mut sim, ready_tank(2, side_b(), 6, 6, Heading::PlusZ));

    sim.apply(engineer, &UnitAction::Shot(Cell::new(6, 6))).unwrap();
    assert_eq!(sim.unit(tank).unwrap().health(), Some(18));

    // corner overlap: one cell
    let other = put(&mut sim, ready_unit(3, UnitKind::Engineer, side_a(), 1, 9));
    sim.apply(other, &UnitAction::Shot(Cell::new(8, 8))).unwrap();
    assert_eq!(sim.unit(tank).unwrap().health(), Some(17));
}

#[test]
fn explosion_clears_infantry_in_the_block_and_spares_flags() {
    let mut sim = open_field();
    let engineer = put(&mut sim, ready_unit(1, UnitKind::Engineer, side_a(), 1, 1));
    let near = put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 5, 5));
    let far = put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 7, 5));
    let objective = put(&mut sim, flag(4, side_b(), 6, 6));

    sim.apply(engineer, &UnitAction::Shot(Cell::new(6, 5))).unwrap();
    assert!(sim.unit(near).is_none());
    assert!(sim.unit(far).is_none());
    assert!(sim.unit(objective).is_some());
    assert_eq!(sim.unit(engineer).unwrap().bullet, 0);
}

#[test]
fn explosion_at_the_edge_of_the_coordinate_space_hits_nothing() {
    let mut sim = open_field();
    let engineer = put(&mut sim, ready_unit(1, UnitKind::Engineer, side_a(), 1, 1));
    let other = put(&mut sim, ready_unit(2, UnitKind::Engineer, side_a(), 1, 3));
    let bystander = put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 2, 2));

    sim.apply(engineer, &UnitAction::Shot(Cell::new(i32::MAX, i32::MAX))).unwrap();
    sim.apply(other, &UnitAction::Shot(Cell::new(i32::MIN, i32::MIN))).unwrap();
    assert!(sim.unit(bystander).is_some());
    assert_eq!(Cell::new(i32::MAX, 0).offset(1, 0), Cell::new(i32::MAX, 0));
}

#[test]
fn armor_dies_at_zero_health() {
    let mut sim = open_field();
    let mut worn = ready_tank(1, side_b(), 6, 6, Heading::PlusZ);
    worn.armor.as_mut().unwrap().health = 5;
    let tank = put(&mut sim, worn);
    let gun = put(&mut sim, ready_tank(2, side_a(), 2, 2, Heading::PlusZ));

    sim.apply(gun, &UnitAction::Shot(Cell::new(6, 6))).unwrap();
    assert!(sim.unit(tank).is_none());
    assert_eq!(sim.force(&side_b()), Some(120));
    for cell in Cell::new(6, 6).square(1) {
        assert_eq!(sim.occupant(cell), None);
    }
}

#[test]
fn repair_restores_friendly_armor_up_to_max() {
    let mut sim = open_field();
    let mut damaged = ready_tank(1, side_a(), 6, 6, Heading::PlusZ);
    damaged.armor.as_mut().unwrap().health = 12;
    let tank = put(&mut sim, damaged);
    let engineer = put(&mut sim, ready_unit(2, UnitKind::Engineer, side_a(), 4, 6));

    sim.apply(engineer, &UnitAction::Repair(Cell::new(5, 6))).unwrap();
    assert_eq!(sim.unit(tank).unwrap().health(), Some(21));
    let unit = sim.unit(engineer).unwrap();
    assert_eq!((unit.bullet, unit.waiting), (0, 1));

    sim.apply(engineer, &UnitAction::Repair(Cell::new(6, 6))).unwrap();
    assert_eq!(sim.unit(tank).unwrap().health(), Some(ARMOR_MAX_HEALTH));
}

#[test]
fn repair_ignores_enemy_armor() {
    let mut sim = open_field();
    let mut damaged = ready_tank(1, side_b(), 6, 6, Heading::PlusZ);
    damaged.armor.as_mut().unwrap().health = 12;
    let tank = put(&mut sim, damaged);
    let engineer = put(&mut sim, ready_unit(2, UnitKind::Engineer, side_a(), 4, 6));

    sim.apply(engineer, &UnitAction::Repair(Cell::new(5, 6))).unwrap();
    assert_eq!(sim.unit(tank).unwrap().health(), Some(12));
}

#[test]
fn unsupported_actions_and_unknown_units_are_errors() {
    let mut sim = open_field();
    let sniper = put(&mut sim, ready_unit(1, UnitKind::Sniper, side_a(), 1, 1));
    let objective = put(&mut sim, flag(2, side_b(), 5, 5));

    assert_eq!(
        sim.apply(sniper, &UnitAction::Repair(Cell::new(2, 2))),
        Err(ReplayError::UnsupportedAction {
            index: 0,
            kind: UnitKind::Sniper,
            action: ActionKind::Repair,
        })
    );
    assert!(matches!(
        sim.apply(objective, &UnitAction::Move(Cell::new(6, 6))),
        Err(ReplayError::UnsupportedAction { .. })
    ));
    assert_eq!(
        sim.apply(UnitId(77), &UnitAction::Shot(Cell::new(2, 2))),
        Err(ReplayError::UnknownUnit {
            index: 0,
            id: UnitId(77)
        })
    );
}

#[test]
fn occupy_sets_flag_owner() {
    let mut sim = open_field();
    let objective = put(&mut sim, flag(1, SideId::from("user2"), 5, 5));
    sim.apply(objective, &UnitAction::Occupy(side_b())).unwrap();
    assert_eq!(sim.unit(objective).unwrap().side, side_b());
}

#[test]
fn spawnable_cells_exclude_any_foreign_zone() {
    let mut sim = two_side_sim(flat_grid(20, 5));
    put(&mut sim, flag(1, side_a(), 2, 2));
    put(&mut sim, ready_unit(2, UnitKind::Assault, side_a(), 9, 2));
    put(&mut sim, flag(3, SideId::neutral(), 13, 2));

    let anywhere = sim.spawnable_cells(&side_a(), false);
    let flags_only = sim.spawnable_cells(&side_a(), true);

    assert!(anywhere.contains(&Cell::new(8, 4)));
    assert!(!flags_only.contains(&Cell::new(8, 4)));
    assert!(flags_only.contains(&Cell::new(6, 2)));
    // the neutral flag's radius (4) reaches x = 9..=17
    assert!(!anywhere.contains(&Cell::new(10, 2)));
    assert!(!anywhere.contains(&Cell::new(9, 2)));
    assert!(anywhere.contains(&Cell::new(8, 2)));
}
