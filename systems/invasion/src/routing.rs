//! Breadth-first routing toward the capital footprint.

use std::collections::VecDeque;

use forum_defence_core::CellCoord;

/// Shortest 4-connected path from `from` to the closest goal cell.
///
/// The returned waypoints exclude `from` and end on a goal cell; an empty
/// path means `from` already is a goal. Cells rejected by `is_blocked` are
/// never entered. Returns `None` when no goal is reachable.
pub fn find_path_with<F>(
    size: u32,
    from: CellCoord,
    goals: &[CellCoord],
    mut is_blocked: F,
) -> Option<Vec<CellCoord>>
where
    F: FnMut(CellCoord) -> bool,
{
    let width = usize::try_from(size).ok()?;
    let cell_count = width.checked_mul(width)?;
    let start = index(width, size, from)?;

    let mut is_goal = vec![false; cell_count];
    for goal in goals {
        if let Some(offset) = index(width, size, *goal) {
            is_goal[offset] = true;
        }
    }
    if is_goal[start] {
        return Some(Vec::new());
    }

    let mut parents: Vec<Option<usize>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    visited[start] = true;
    let mut queue = VecDeque::from([from]);

    while let Some(cell) = queue.pop_front() {
        let current = index(width, size, cell)?;
        for neighbor in cell.neighbors(size) {
            let Some(offset) = index(width, size, neighbor) else {
                continue;
            };
            if visited[offset] || is_blocked(neighbor) {
                continue;
            }
            visited[offset] = true;
            parents[offset] = Some(current);
            if is_goal[offset] {
                return Some(unwind(width, &parents, offset, start));
            }
            queue.push_back(neighbor);
        }
    }

    None
}

/// Invader route to the capital over an open grid.
///
/// Every cell is traversable; walls and other buildings are attacked on
/// arrival instead of being routed around. When no route exists the
/// invader heads straight for the nearest goal.
#[must_use]
pub fn route(size: u32, from: CellCoord, goals: &[CellCoord]) -> Vec<CellCoord> {
    find_path_with(size, from, goals, |_| false).unwrap_or_else(|| {
        goals
            .iter()
            .copied()
            .min_by_key(|goal| from.manhattan_distance(*goal))
            .into_iter()
            .collect()
    })
}

fn unwind(width: usize, parents: &[Option<usize>], goal: usize, start: usize) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        path.push(coord(width, cursor));
        match parents[cursor] {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

fn index(width: usize, size: u32, cell: CellCoord) -> Option<usize> {
    if cell.x() >= size || cell.z() >= size {
        return None;
    }
    let column = usize::try_from(cell.x()).ok()?;
    let row = usize::try_from(cell.z()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord(width: usize, offset: usize) -> CellCoord {
    let width = width.max(1);
    let column = u32::try_from(offset % width).unwrap_or(u32::MAX);
    let row = u32::try_from(offset / width).unwrap_or(u32::MAX);
    CellCoord::new(column, row)
}
