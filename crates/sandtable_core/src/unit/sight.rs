use crate::{Cell, Oracle, Simulation, Unit, UnitId, UnitKind};

/// `|d| <= view + 0.5`, in integers.
pub(crate) fn in_sight_range(from: Cell, to: Cell, view: u32) -> bool {
    let reach = 2 * u64::from(view) + 1;
    4 * from.distance_squared(to) <= reach * reach
}

fn effective_view(unit: &Unit) -> u32 {
    if unit.kind.is_combatant() && unit.bullet == 0 {
        0
    } else {
        unit.profile().view_range
    }
}

/// Units `viewer` can see, in id order. With `include_own` the viewer's side
/// is listed too; otherwise only other sides are.
pub(crate) fn units_in_view<O: Oracle + ?Sized>(
    sim: &Simulation,
    viewer: &Unit,
    include_own: bool,
    oracle: &O,
) -> Vec<UnitId> {
    let view = effective_view(viewer);
    let mut seen = Vec::new();

    if view > 0 {
        for other in sim.units() {
            if other.id == viewer.id || (!include_own && other.side == viewer.side) {
                continue;
            }
            if !in_sight_range(viewer.cell, other.cell, view) {
                continue;
            }
            if let Some(heading) = viewer.heading() {
                let dx = other.cell.x - viewer.cell.x;
                let dz = other.cell.z - viewer.cell.z;
                let (across, along) = heading.to_local(dx, dz);
                if along.abs() <= across.abs() {
                    continue;
                }
            }
            if oracle.can_see(sim, viewer, other) {
                seen.push(other.id);
            }
        }
    }

    if viewer.kind == UnitKind::Engineer {
        for cell in viewer.cell.square(1) {
            let Some(other) = sim.unit_at(cell) else {
                continue;
            };
            if other.kind.is_armor() && other.side == viewer.side && !seen.contains(&other.id) {
                seen.push(other.id);
            }
        }
        seen.sort_unstable();
    }

    seen
}
