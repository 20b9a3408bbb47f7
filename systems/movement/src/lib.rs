#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-agent movement state machine layered over path search and reservations.
//!
//! A [`MovementController`] owns an agent's authoritative tile, its trailing
//! visual position and the path it is following. Each tick the visual
//! position catches up first; only a settled agent attempts to reserve the
//! next cell. Agents that keep failing escalate by rerouting once and then
//! stepping aside onto any free neighbour.

mod config;
pub mod interpolation;

pub use config::{ConfigError, MovementConfig};
pub use interpolation::VisualPosition;

use shopfloor_core::{AgentId, CellCoord, Direction, Event, Grid, Path, Priority};
use shopfloor_system_pathfinding::find_path;
use shopfloor_system_reservations::ReservationLedger;
use thiserror::Error;

/// Coarse state of a movement controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MovementPhase {
    /// No goal has been assigned.
    #[default]
    Idle,
    /// The agent is walking its path.
    Following,
    /// The next cell is held by someone else.
    Blocked,
    /// The agent settled on its goal.
    Arrived,
    /// The last assigned goal has no walkable route.
    Unreachable,
}

/// Reasons an agent cannot be placed on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The spawn cell lies outside the grid.
    #[error("spawn cell {cell:?} lies outside the grid")]
    OutOfBounds {
        /// Rejected cell.
        cell: CellCoord,
    },
    /// The spawn cell is a wall or fixture.
    #[error("spawn cell {cell:?} is not walkable")]
    NotWalkable {
        /// Rejected cell.
        cell: CellCoord,
    },
    /// Another agent already holds the spawn cell.
    #[error("spawn cell {cell:?} is reserved by {owner:?}")]
    CellReserved {
        /// Rejected cell.
        cell: CellCoord,
        /// Agent holding the cell, when the ledger knows it.
        owner: Option<AgentId>,
    },
}

/// Movement state owned by a single agent.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementController {
    agent: AgentId,
    priority: Priority,
    tile: CellCoord,
    visual: VisualPosition,
    goal: Option<CellCoord>,
    path: Path,
    phase: MovementPhase,
    blocked_ticks: u32,
    config: MovementConfig,
}

impl MovementController {
    /// Places an agent on `cell`, reserving it in the ledger.
    pub fn spawn<L>(
        agent: AgentId,
        priority: Priority,
        cell: CellCoord,
        grid: &Grid,
        ledger: &mut L,
        config: MovementConfig,
    ) -> Result<Self, SpawnError>
    where
        L: ReservationLedger + ?Sized,
    {
        if grid.tile_at(cell).is_none() {
            return Err(SpawnError::OutOfBounds { cell });
        }
        if !grid.is_walkable(cell) {
            return Err(SpawnError::NotWalkable { cell });
        }
        if !ledger.reserve(cell, agent) {
            return Err(SpawnError::CellReserved {
                cell,
                owner: ledger.owner(cell),
            });
        }

        Ok(Self {
            agent,
            priority,
            tile: cell,
            visual: VisualPosition::at(cell),
            goal: None,
            path: Path::empty(),
            phase: MovementPhase::Idle,
            blocked_ticks: 0,
            config,
        })
    }

    /// Replaces the current goal and plans a fresh route toward it.
    ///
    /// Any path still being followed is discarded. An unreachable goal leaves
    /// the agent standing in [`MovementPhase::Unreachable`] until a new goal is
    /// assigned.
    pub fn set_goal(&mut self, goal: CellCoord, grid: &Grid, out: &mut Vec<Event>) {
        self.goal = Some(goal);
        self.blocked_ticks = 0;
        self.path = find_path(self.tile, goal, grid);

        if self.path.is_empty() && goal != self.tile {
            self.mark_unreachable(goal, out);
            return;
        }

        self.phase = MovementPhase::Following;
        out.push(Event::GoalAssigned {
            agent: self.agent,
            goal,
            path_len: self.path.len(),
        });
    }

    /// Advances the controller by one tick.
    pub fn update<L>(&mut self, grid: &Grid, ledger: &mut L, out: &mut Vec<Event>)
    where
        L: ReservationLedger + ?Sized,
    {
        let settled = self
            .visual
            .advance_toward(self.tile, self.config.animation_step);
        if !settled {
            return;
        }

        if matches!(
            self.phase,
            MovementPhase::Following | MovementPhase::Blocked
        ) {
            self.attempt_step(grid, ledger, out);
        }
    }

    /// Reports whether the agent stands settled on its goal with nothing left
    /// to walk.
    #[must_use]
    pub fn has_reached_goal(&self) -> bool {
        self.goal == Some(self.tile) && self.path.is_empty() && self.visual.is_settled_on(self.tile)
    }

    /// Releases every reservation and forgets the current goal.
    pub fn retire<L>(&mut self, ledger: &mut L)
    where
        L: ReservationLedger + ?Sized,
    {
        ledger.release(self.agent);
        self.goal = None;
        self.path.clear();
        self.blocked_ticks = 0;
        self.phase = MovementPhase::Idle;
    }

    /// Identifier of the agent that owns the controller.
    #[must_use]
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// Precedence of the agent.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Authoritative cell of the agent.
    #[must_use]
    pub const fn tile(&self) -> CellCoord {
        self.tile
    }

    /// Draw position trailing the authoritative cell.
    #[must_use]
    pub const fn visual(&self) -> VisualPosition {
        self.visual
    }

    /// Goal currently pursued, if any.
    #[must_use]
    pub const fn goal(&self) -> Option<CellCoord> {
        self.goal
    }

    /// Remaining steps toward the goal.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Coarse state of the controller.
    #[must_use]
    pub const fn phase(&self) -> MovementPhase {
        self.phase
    }

    /// Consecutive ticks spent waiting for the next cell.
    #[must_use]
    pub const fn blocked_ticks(&self) -> u32 {
        self.blocked_ticks
    }

    /// Tunables the controller was created with.
    #[must_use]
    pub const fn config(&self) -> &MovementConfig {
        &self.config
    }

    fn attempt_step<L>(&mut self, grid: &Grid, ledger: &mut L, out: &mut Vec<Event>)
    where
        L: ReservationLedger + ?Sized,
    {
        let Some(goal) = self.goal else {
            self.phase = MovementPhase::Idle;
            return;
        };

        let Some(next) = self.path.front() else {
            if self.tile == goal {
                self.phase = MovementPhase::Arrived;
                self.blocked_ticks = 0;
                out.push(Event::GoalReached {
                    agent: self.agent,
                    goal,
                });
            } else {
                self.replan(goal, grid, out);
            }
            return;
        };

        if ledger.reserve(next, self.agent) {
            let from = self.tile;
            ledger.release_cell(from, self.agent);
            self.tile = next;
            let _ = self.path.pop_front();
            self.blocked_ticks = 0;
            self.phase = MovementPhase::Following;
            out.push(Event::AgentAdvanced {
                agent: self.agent,
                from,
                to: next,
            });
            return;
        }

        self.blocked_ticks = self.blocked_ticks.saturating_add(1);
        if self.phase != MovementPhase::Blocked {
            self.phase = MovementPhase::Blocked;
            out.push(Event::AgentBlocked {
                agent: self.agent,
                at: self.tile,
                wanted: next,
                owner: ledger.owner(next),
            });
        }

        if self.blocked_ticks == self.config.reroute_after {
            tracing::debug!(
                agent = self.agent.get(),
                blocked_ticks = self.blocked_ticks,
                "rerouting around blocked cell"
            );
            self.path = find_path(self.tile, goal, grid);
            if self.path.is_empty() && self.tile != goal {
                self.mark_unreachable(goal, out);
                return;
            }
            out.push(Event::AgentRerouted {
                agent: self.agent,
                path_len: self.path.len(),
            });
        } else if self.blocked_ticks >= self.config.sidestep_after {
            self.sidestep(goal, grid, ledger, out);
        }
    }

    fn sidestep<L>(&mut self, goal: CellCoord, grid: &Grid, ledger: &mut L, out: &mut Vec<Event>)
    where
        L: ReservationLedger + ?Sized,
    {
        let from = self.tile;
        let Some(to) = Direction::ALL
            .into_iter()
            .filter_map(|direction| from.neighbor(direction))
            .filter(|cell| grid.is_walkable(*cell))
            .find(|cell| ledger.reserve(*cell, self.agent))
        else {
            tracing::trace!(
                agent = self.agent.get(),
                blocked_ticks = self.blocked_ticks,
                "no free neighbour to sidestep onto"
            );
            return;
        };

        ledger.release_cell(from, self.agent);
        self.tile = to;
        self.blocked_ticks = 0;
        self.phase = MovementPhase::Following;
        tracing::debug!(
            agent = self.agent.get(),
            from = ?from,
            to = ?to,
            "sidestepped out of contention"
        );
        out.push(Event::AgentSidestepped {
            agent: self.agent,
            from,
            to,
        });

        self.replan(goal, grid, out);
    }

    fn replan(&mut self, goal: CellCoord, grid: &Grid, out: &mut Vec<Event>) {
        self.path = find_path(self.tile, goal, grid);
        if self.path.is_empty() && self.tile != goal {
            self.mark_unreachable(goal, out);
        }
    }

    fn mark_unreachable(&mut self, goal: CellCoord, out: &mut Vec<Event>) {
        tracing::warn!(
            agent = self.agent.get(),
            goal = ?goal,
            from = ?self.tile,
            "goal is unreachable"
        );
        self.phase = MovementPhase::Unreachable;
        out.push(Event::GoalUnreachable {
            agent: self.agent,
            goal,
        });
    }
}
