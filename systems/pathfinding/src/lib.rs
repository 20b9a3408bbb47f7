#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest-path search over the static walkability grid.
//!
//! Search reasons purely about walls and fixtures. Transient agent
//! occupancy is deliberately ignored so that a crowded aisle never produces a
//! false "no route" answer; contention is the movement system's concern.

use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap};

use shopfloor_core::{CellCoord, Direction, Grid, Path};

const STEP_COST: u32 = 1;

/// Frontier record used while a single search runs.
///
/// Nodes order by ascending `f`, then ascending `h` so that among equally
/// cheap candidates the one closest to the goal is expanded first. The cell
/// breaks any remaining tie to keep searches reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchNode {
    /// Cell represented by the node.
    pub cell: CellCoord,
    /// Cost accumulated from the start cell.
    pub g: u32,
    /// Manhattan estimate of the remaining cost.
    pub h: u32,
    /// Combined cost `g + h`.
    pub f: u32,
    /// Cell the node was reached from, `None` for the start.
    pub parent: Option<CellCoord>,
}

impl SearchNode {
    /// Creates a node reached at cost `g` with heuristic `h`.
    #[must_use]
    pub fn new(cell: CellCoord, g: u32, h: u32, parent: Option<CellCoord>) -> Self {
        Self {
            cell,
            g,
            h,
            f: g.saturating_add(h),
            parent,
        }
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .cmp(&other.f)
            .then_with(|| self.h.cmp(&other.h))
            .then_with(|| self.cell.cmp(&other.cell))
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| self.parent.cmp(&other.parent))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Computes a shortest 4-connected route from `start` to `goal`.
///
/// The returned path excludes `start` and ends on `goal`. It is empty when the
/// two cells coincide, when the goal lies outside the grid or on a
/// non-walkable tile, and when walls separate the cells.
#[must_use]
pub fn find_path(start: CellCoord, goal: CellCoord, grid: &Grid) -> Path {
    if start == goal {
        return Path::empty();
    }

    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return Path::empty();
    };
    if !grid.is_walkable(goal) {
        return Path::empty();
    }

    let cell_count = grid.cell_count();
    let mut best_cost = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut frontier = BinaryHeap::new();
    let mut expanded = 0_usize;

    best_cost[start_index] = 0;
    frontier.push(Reverse(SearchNode::new(
        start,
        0,
        start.manhattan_distance(goal),
        None,
    )));

    while let Some(Reverse(node)) = frontier.pop() {
        let Some(index) = grid.index(node.cell) else {
            continue;
        };
        if closed[index] {
            continue;
        }
        closed[index] = true;
        came_from[index] = node.parent;
        expanded += 1;

        if index == goal_index {
            let path = reconstruct(start, goal, grid, &came_from);
            tracing::trace!(
                expanded,
                length = path.len(),
                "path search reached goal"
            );
            return path;
        }

        let next_cost = node.g.saturating_add(STEP_COST);
        for neighbor in neighbors(node.cell, grid) {
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };
            if closed[neighbor_index] || best_cost[neighbor_index] <= next_cost {
                continue;
            }

            best_cost[neighbor_index] = next_cost;
            frontier.push(Reverse(SearchNode::new(
                neighbor,
                next_cost,
                neighbor.manhattan_distance(goal),
                Some(node.cell),
            )));
        }
    }

    tracing::trace!(expanded, "path search exhausted frontier");
    Path::empty()
}

fn reconstruct(
    start: CellCoord,
    goal: CellCoord,
    grid: &Grid,
    came_from: &[Option<CellCoord>],
) -> Path {
    let mut cells = vec![goal];
    let mut cursor = goal;
    while let Some(parent) = grid.index(cursor).and_then(|index| came_from[index]) {
        if parent == start {
            break;
        }
        cells.push(parent);
        cursor = parent;
    }
    cells.reverse();
    Path::from_cells(cells)
}

fn neighbors(cell: CellCoord, grid: &Grid) -> impl Iterator<Item = CellCoord> + '_ {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| cell.neighbor(direction))
        .filter(|neighbor| grid.is_walkable(*neighbor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_prefers_lower_heuristic_on_equal_cost() {
        let near_goal = SearchNode::new(CellCoord::new(5, 5), 4, 2, None);
        let far_from_goal = SearchNode::new(CellCoord::new(0, 0), 2, 4, None);
        assert_eq!(near_goal.f, far_from_goal.f);
        assert!(near_goal < far_from_goal);

        let mut heap = BinaryHeap::new();
        heap.push(Reverse(far_from_goal));
        heap.push(Reverse(near_goal));
        assert_eq!(heap.pop().map(|Reverse(node)| node), Some(near_goal));
    }

    #[test]
    fn frontier_prefers_lower_total_cost() {
        let cheap = SearchNode::new(CellCoord::new(3, 3), 1, 5, None);
        let expensive = SearchNode::new(CellCoord::new(1, 1), 6, 1, None);
        assert!(cheap < expensive);
    }

    #[test]
    fn neighbors_skip_walls_and_edges() {
        let grid = shopfloor_core::GridBuilder::from_ascii(&["#..", "..."])
            .expect("plan")
            .build();
        let found: Vec<_> = neighbors(CellCoord::new(0, 1), &grid).collect();
        assert_eq!(found, vec![CellCoord::new(1, 1)]);
    }
}
