//! Road network flood fill rooted at the capital.

use std::collections::VecDeque;

use forum_defence_core::CellCoord;

use crate::grid::{perimeter_cells, Grid};

/// Dense set of road/plaza cells transitively linked to the root cells.
///
/// The set mirrors the grid's dimensions and is rebuilt wholesale by
/// [`compute_reachable_roads`]; membership tests are constant time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoadNetwork {
    size: u32,
    reachable: Vec<bool>,
    count: usize,
}

impl RoadNetwork {
    /// Reports whether the cell belongs to the reachable network.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        index(self.size, cell)
            .and_then(|offset| self.reachable.get(offset).copied())
            .unwrap_or(false)
    }

    /// Number of reachable cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Reports whether no cell is reachable.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over reachable cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let size = self.size.max(1);
        self.reachable
            .iter()
            .enumerate()
            .filter(|(_, reachable)| **reachable)
            .map(move |(offset, _)| {
                let offset = u32::try_from(offset).unwrap_or(u32::MAX);
                CellCoord::new(offset % size, offset / size)
            })
    }
}

/// Floods the road/plaza network outward from the provided root cells.
///
/// Only cells whose building is connective are entered; roots that are not
/// connective themselves are skipped.
#[must_use]
pub fn compute_reachable_roads(grid: &Grid, roots: &[CellCoord]) -> RoadNetwork {
    let size = grid.size();
    let cell_count = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
    let mut network = RoadNetwork {
        size,
        reachable: vec![false; cell_count],
        count: 0,
    };

    let mut queue = VecDeque::new();
    for &root in roots {
        if grid.is_connective(root) && network.insert(root) {
            queue.push_back(root);
        }
    }

    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.neighbors(size) {
            if grid.is_connective(neighbor) && network.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    network
}

/// Reports whether any cell strictly 4-adjacent to the footprint is reachable.
#[must_use]
pub fn is_footprint_connected(
    grid: &Grid,
    origin: CellCoord,
    size: u32,
    reachable: &RoadNetwork,
) -> bool {
    perimeter_cells(origin, size, grid.size())
        .into_iter()
        .any(|cell| reachable.contains(cell))
}

impl RoadNetwork {
    fn insert(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = index(self.size, cell).and_then(|offset| self.reachable.get_mut(offset))
        else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
        self.count += 1;
        true
    }
}

/// Lazily recomputed road network plus the dirty flag that triggers it.
#[derive(Clone, Debug)]
pub(crate) struct Connectivity {
    network: RoadNetwork,
    dirty: bool,
}

impl Connectivity {
    pub(crate) fn new() -> Self {
        Self {
            network: RoadNetwork::default(),
            dirty: true,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Recomputes the network when dirty, reporting whether work was done.
    pub(crate) fn refresh(&mut self, grid: &Grid, roots: &[CellCoord]) -> bool {
        if !self.dirty {
            return false;
        }
        self.network = compute_reachable_roads(grid, roots);
        self.dirty = false;
        true
    }
}

fn index(size: u32, cell: CellCoord) -> Option<usize> {
    if cell.x() >= size || cell.z() >= size {
        return None;
    }
    let column = usize::try_from(cell.x()).ok()?;
    let row = usize::try_from(cell.z()).ok()?;
    let width = usize::try_from(size).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
