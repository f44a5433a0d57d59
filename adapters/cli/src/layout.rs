//! Starting layouts built around the capital before the first tick.

use clap::ValueEnum;
use forum_defence_core::{BuildingKind, Event};
use forum_defence_simulation::Simulation;
use tracing::debug;

/// Layout applied to a fresh session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LayoutChoice {
    /// Capital only.
    Empty,
    /// A small road network with every building kind attached.
    Starter,
}

/// Offsets from the capital origin, placed in order.
const STARTER: [(BuildingKind, i32, i32); 17] = [
    (BuildingKind::Road, -1, 0),
    (BuildingKind::Road, -1, 1),
    (BuildingKind::Road, -1, -1),
    (BuildingKind::Road, 0, -1),
    (BuildingKind::Road, 1, -1),
    (BuildingKind::Road, 2, -1),
    (BuildingKind::Road, -2, -1),
    (BuildingKind::Road, -3, -1),
    (BuildingKind::Well, -2, 0),
    (BuildingKind::Market, -3, -3),
    (BuildingKind::House, -2, 1),
    (BuildingKind::House, 0, -2),
    (BuildingKind::House, 1, -2),
    (BuildingKind::Farm, 2, -3),
    (BuildingKind::Barracks, 2, 0),
    (BuildingKind::Tower, -1, 2),
    (BuildingKind::Wall, 0, 2),
];

/// Builds the chosen layout, returning how many buildings were placed.
///
/// Entries that do not fit the grid or the treasury are skipped.
pub(crate) fn build(
    simulation: &mut Simulation,
    choice: LayoutChoice,
    out: &mut Vec<Event>,
) -> usize {
    let entries: &[(BuildingKind, i32, i32)] = match choice {
        LayoutChoice::Empty => &[],
        LayoutChoice::Starter => &STARTER,
    };
    let Some(capital) = simulation.world().capital().copied() else {
        return 0;
    };
    let size = simulation.world().grid().size();

    let mut placed = 0;
    for &(kind, dx, dz) in entries {
        let Some(origin) = capital.origin.offset(dx, dz, size) else {
            debug!(?kind, dx, dz, "layout entry falls outside the grid");
            continue;
        };
        if simulation.try_place(kind, origin, out) {
            placed += 1;
        }
    }
    placed
}
