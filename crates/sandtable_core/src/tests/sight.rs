use super::*;

#[test]
fn view_range_is_radius_plus_half() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    let sniper = put(&mut sim, ready_unit(1, UnitKind::Sniper, side_a(), 0, 0));
    let edge = put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 7, 2));
    put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 7, 3));
    let straight = put(&mut sim, ready_unit(4, UnitKind::Assault, side_b(), 7, 0));

    assert_eq!(sim.piece_in_view(sniper, false, &ClearSight), vec![edge, straight]);
}

#[test]
fn empty_charge_means_no_view() {
    let mut sim = open_field();
    let mut blind = ready_unit(1, UnitKind::Assault, side_a(), 5, 5);
    blind.bullet = 0;
    let blind = put(&mut sim, blind);
    put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 6, 6));

    assert!(sim.piece_in_view(blind, false, &ClearSight).is_empty());
}

#[test]
fn own_side_only_listed_on_request() {
    let mut sim = open_field();
    let viewer = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 5, 5));
    let friend = put(&mut sim, ready_unit(2, UnitKind::Assault, side_a(), 6, 5));
    let foe = put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 4, 5));

    assert_eq!(sim.piece_in_view(viewer, false, &ClearSight), vec![foe]);
    assert_eq!(sim.piece_in_view(viewer, true, &ClearSight), vec![friend, foe]);
}

#[test]
fn armor_sees_along_its_heading_axis_only() {
    let mut sim = two_side_sim(flat_grid(16, 16));
    let tank = put(&mut sim, ready_tank(1, side_a(), 5, 5, Heading::PlusZ));
    let ahead = put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 5, 10));
    let behind = put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 6, 1));
    put(&mut sim, ready_unit(4, UnitKind::Assault, side_b(), 10, 5));
    put(&mut sim, ready_unit(5, UnitKind::Assault, side_b(), 8, 8));

    assert_eq!(sim.piece_in_view(tank, false, &ClearSight), vec![ahead, behind]);
}

#[test]
fn engineer_sees_adjacent_friendly_armor_without_charge() {
    let mut sim = open_field();
    let mut engineer = ready_unit(1, UnitKind::Engineer, side_a(), 3, 5);
    engineer.bullet = 0;
    let engineer = put(&mut sim, engineer);
    let tank = put(&mut sim, ready_tank(2, side_a(), 5, 5, Heading::PlusZ));
    put(&mut sim, ready_tank(3, side_b(), 3, 8, Heading::PlusZ));

    assert_eq!(sim.piece_in_view(engineer, false, &ClearSight), vec![tank]);
}

#[test]
fn terrain_blocks_line_of_sight() {
    let mut sim = two_side_sim(walled_grid(12, 12, &[(5, 5)]));
    let viewer = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 3, 5));
    let hidden = put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 7, 5));
    let open = put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 3, 8));

    let sight = TerrainSight::default();
    let seen = sim.piece_in_view(viewer, false, &sight);
    assert!(!seen.contains(&hidden));
    assert!(seen.contains(&open));
}

#[test]
fn low_walls_still_block_line_of_sight() {
    let grid = flat_grid(12, 12).with_height(Cell::new(5, 5), 2);
    assert!(grid.is_obstructed(Cell::new(5, 5)));
    let mut sim = two_side_sim(grid);
    let viewer = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 3, 5));
    let hidden = put(&mut sim, ready_unit(2, UnitKind::Assault, side_b(), 7, 5));

    let sight = TerrainSight::default();
    assert!(sim.piece_in_view(viewer, false, &sight).is_empty());
    assert!(!sight.can_see(&sim, sim.unit(viewer).unwrap(), sim.unit(hidden).unwrap()));

    let unit = sim.unit(viewer).unwrap();
    assert!(!sight.can_reach(&sim, unit, Cell::new(7, 5)));
    assert!(sight.can_reach(&sim, unit, Cell::new(5, 5)));
}

#[test]
fn units_in_between_block_line_of_sight() {
    let mut sim = open_field();
    let viewer = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 2, 5));
    put(&mut sim, ready_unit(2, UnitKind::Assault, side_a(), 4, 5));
    let target = put(&mut sim, ready_unit(3, UnitKind::Assault, side_b(), 6, 5));

    let sight = TerrainSight::default();
    let blocker = sim.unit(UnitId(2)).unwrap();
    assert!(!sight.can_see(&sim, sim.unit(viewer).unwrap(), sim.unit(target).unwrap()));
    assert!(sight.can_see(&sim, sim.unit(viewer).unwrap(), blocker));
}

#[test]
fn reach_ignores_the_target_wall_itself() {
    let mut sim = two_side_sim(walled_grid(12, 12, &[(8, 2), (5, 2)]));
    let unit = put(&mut sim, ready_unit(1, UnitKind::Assault, side_a(), 2, 2));
    let sight = TerrainSight::default();
    let unit = sim.unit(unit).unwrap();
    assert!(sight.can_reach(&sim, unit, Cell::new(5, 2)));
    assert!(!sight.can_reach(&sim, unit, Cell::new(8, 2)));
}
