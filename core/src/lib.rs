#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the shopfloor movement engine.
//!
//! This crate defines the vocabulary every other crate speaks: cell
//! coordinates, agent identities, the static walkability [`Grid`], the
//! [`Path`] produced by the search system and the [`Event`] stream the
//! simulation broadcasts after each tick. Systems consume these types and
//! never reach into each other's internals.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

mod grid;

pub use grid::{Grid, GridBuilder, GridError, Tile, TileSpan};

/// Events broadcast while the simulation advances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just started, counting from one.
        tick: u64,
    },
    /// Confirms that an agent joined the roster and reserved its spawn cell.
    AgentSpawned {
        /// Identifier assigned to the new agent.
        agent: AgentId,
        /// Variant of the agent.
        kind: AgentKind,
        /// Cell reserved for the agent on arrival.
        cell: CellCoord,
    },
    /// Confirms that an agent received a goal and a route toward it.
    GoalAssigned {
        /// Agent that received the goal.
        agent: AgentId,
        /// Cell the agent is now heading toward.
        goal: CellCoord,
        /// Number of steps in the freshly computed path.
        path_len: usize,
    },
    /// Reports that no walkable route exists toward the requested goal.
    GoalUnreachable {
        /// Agent whose goal cannot be reached.
        agent: AgentId,
        /// Goal that could not be reached.
        goal: CellCoord,
    },
    /// Confirms that an agent stepped onto the next cell of its path.
    AgentAdvanced {
        /// Agent that moved.
        agent: AgentId,
        /// Cell released by the move.
        from: CellCoord,
        /// Cell reserved and entered by the move.
        to: CellCoord,
    },
    /// Reports that an agent could not reserve the next cell of its path.
    AgentBlocked {
        /// Agent that is waiting.
        agent: AgentId,
        /// Cell the agent keeps while waiting.
        at: CellCoord,
        /// Cell the agent attempted to reserve.
        wanted: CellCoord,
        /// Agent currently holding the wanted cell, when known.
        owner: Option<AgentId>,
    },
    /// Reports that a blocked agent recomputed its route.
    AgentRerouted {
        /// Agent that replanned.
        agent: AgentId,
        /// Number of steps in the replacement path.
        path_len: usize,
    },
    /// Reports that a blocked agent stepped aside onto a free neighbour.
    AgentSidestepped {
        /// Agent that stepped aside.
        agent: AgentId,
        /// Cell released by the sidestep.
        from: CellCoord,
        /// Neighbour cell entered by the sidestep.
        to: CellCoord,
    },
    /// Confirms that an agent settled on its goal.
    GoalReached {
        /// Agent that arrived.
        agent: AgentId,
        /// Goal cell the agent now occupies.
        goal: CellCoord,
    },
    /// Confirms that an agent left the simulation and released its cells.
    AgentDeactivated {
        /// Agent that was removed.
        agent: AgentId,
    },
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Variants of agents that walk the store floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Shopper following a one-shot itinerary through the store.
    Customer,
    /// Staff member following a work route.
    Employee,
}

/// Relative precedence of an agent when several compete for the same cell.
///
/// Higher values are processed earlier within a tick and therefore win
/// contested reservations under first-come-first-served ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Priority(u8);

impl Priority {
    /// Creates a priority with the provided rank.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric rank.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Fallback colour used when an agent is drawn without a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl AgentColor {
    /// Creates a new agent color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise scan order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Adjacent cell in the provided direction.
    ///
    /// Returns `None` when the step would leave the coordinate space; callers
    /// still need to check the grid bounds on the positive side.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| CellCoord::new(column, self.row)),
            Direction::South => self
                .row
                .checked_add(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| CellCoord::new(column, self.row)),
        }
    }
}

/// Ordered route of cells leading away from (but excluding) a start cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: VecDeque<CellCoord>,
}

impl Path {
    /// Creates an empty path, the canonical "no route" value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a path from cells ordered from the first step to the goal.
    #[must_use]
    pub fn from_cells(cells: impl IntoIterator<Item = CellCoord>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Next cell to step onto, if any.
    #[must_use]
    pub fn front(&self) -> Option<CellCoord> {
        self.cells.front().copied()
    }

    /// Final cell of the path, if any.
    #[must_use]
    pub fn destination(&self) -> Option<CellCoord> {
        self.cells.back().copied()
    }

    /// Removes and returns the next cell after a successful step.
    pub fn pop_front(&mut self) -> Option<CellCoord> {
        self.cells.pop_front()
    }

    /// Number of steps remaining.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no steps remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the remaining steps in travel order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Drops every remaining step.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentId, CellCoord, Direction, Path, Priority};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn neighbor_stops_at_coordinate_origin() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.neighbor(Direction::North), None);
        assert_eq!(origin.neighbor(Direction::West), None);
        assert_eq!(
            origin.neighbor(Direction::East),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(
            origin.neighbor(Direction::South),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn cells_order_by_column_then_row() {
        let mut cells = vec![
            CellCoord::new(2, 0),
            CellCoord::new(1, 5),
            CellCoord::new(1, 2),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 2),
                CellCoord::new(1, 5),
                CellCoord::new(2, 0)
            ]
        );
    }

    #[test]
    fn path_is_consumed_front_to_back() {
        let mut path = Path::from_cells([CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        assert_eq!(path.destination(), Some(CellCoord::new(2, 0)));
        assert_eq!(path.pop_front(), Some(CellCoord::new(1, 0)));
        assert_eq!(path.front(), Some(CellCoord::new(2, 0)));
        assert_eq!(path.len(), 1);
        path.clear();
        assert!(path.is_empty());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&AgentId::new(42));
        assert_round_trip(&CellCoord::new(5, 7));
        assert_round_trip(&Priority::new(3));
    }
}
