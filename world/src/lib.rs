#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative store floor state and the tick driver that advances it.
//!
//! [`Simulation`] owns the grid, the reservation ledger and the roster of
//! agents. Each tick updates every agent exactly once in roster order, which
//! sorts by descending priority and then by spawn order. Reservations are
//! granted first-come-first-served in that order.

pub mod agents;

use agents::{Agent, Customer, Employee, Itinerary, CUSTOMER_PRIORITY, EMPLOYEE_PRIORITY};
use shopfloor_core::{AgentColor, AgentId, AgentKind, CellCoord, Event, Grid, Priority};
use shopfloor_system_movement::{ConfigError, MovementConfig, MovementController, SpawnError};
use shopfloor_system_reservations::{ReservationLedger, TileReservationTable};

/// Represents the authoritative store floor state.
#[derive(Debug)]
pub struct Simulation<L: ReservationLedger = TileReservationTable> {
    grid: Grid,
    ledger: L,
    config: MovementConfig,
    roster: Vec<Box<dyn Agent>>,
    next_agent_id: u32,
    tick_index: u64,
}

impl Simulation<TileReservationTable> {
    /// Creates an empty floor backed by a fresh reservation table.
    pub fn new(grid: Grid, config: MovementConfig) -> Result<Self, ConfigError> {
        Self::with_ledger(grid, TileReservationTable::new(), config)
    }
}

impl<L: ReservationLedger> Simulation<L> {
    /// Creates an empty floor backed by the provided ledger.
    pub fn with_ledger(grid: Grid, ledger: L, config: MovementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid,
            ledger,
            config,
            roster: Vec::new(),
            next_agent_id: 0,
            tick_index: 0,
        })
    }

    /// Places a customer on `cell` with the provided itinerary.
    pub fn spawn_customer(
        &mut self,
        cell: CellCoord,
        color: AgentColor,
        destinations: impl IntoIterator<Item = CellCoord>,
        out: &mut Vec<Event>,
    ) -> Result<AgentId, SpawnError> {
        let movement = self.spawn_controller(CUSTOMER_PRIORITY, cell)?;
        let customer = Customer::new(movement, color, Itinerary::new(destinations));
        Ok(self.enroll(Box::new(customer), out))
    }

    /// Places an employee on `cell` with the provided work route.
    pub fn spawn_employee(
        &mut self,
        cell: CellCoord,
        route: impl IntoIterator<Item = CellCoord>,
        patrol: bool,
        out: &mut Vec<Event>,
    ) -> Result<AgentId, SpawnError> {
        let movement = self.spawn_controller(EMPLOYEE_PRIORITY, cell)?;
        let employee = Employee::new(movement, Itinerary::new(route), patrol);
        Ok(self.enroll(Box::new(employee), out))
    }

    /// Advances every agent by one tick and drops agents that left.
    pub fn tick(&mut self, out: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for agent in &mut self.roster {
            agent.update(&self.grid, &mut self.ledger, out);
        }

        self.roster.retain(|agent| agent.is_active());
    }

    /// Mutable access to an agent, for assigning goals or stops from outside.
    pub fn agent_mut(&mut self, agent: AgentId) -> Option<&mut dyn Agent> {
        let index = self.position(agent)?;
        Some(self.roster[index].as_mut())
    }

    /// Sends an agent toward `goal`, replacing its current route.
    ///
    /// Returns `false` when the agent is unknown.
    pub fn move_agent(&mut self, agent: AgentId, goal: CellCoord, out: &mut Vec<Event>) -> bool {
        let Some(index) = self.position(agent) else {
            return false;
        };
        self.roster[index].move_to(goal, &self.grid, out);
        true
    }

    /// Takes an agent off the floor immediately, releasing its cells.
    ///
    /// Returns `false` when the agent is unknown.
    pub fn remove(&mut self, agent: AgentId, out: &mut Vec<Event>) -> bool {
        let Some(index) = self.position(agent) else {
            return false;
        };
        let mut removed = self.roster.remove(index);
        removed.deactivate(&mut self.ledger, out);
        true
    }

    /// Number of agents on the floor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Reports whether the floor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    fn spawn_controller(
        &mut self,
        priority: Priority,
        cell: CellCoord,
    ) -> Result<MovementController, SpawnError> {
        MovementController::spawn(
            AgentId::new(self.next_agent_id),
            priority,
            cell,
            &self.grid,
            &mut self.ledger,
            self.config,
        )
    }

    fn enroll(&mut self, agent: Box<dyn Agent>, out: &mut Vec<Event>) -> AgentId {
        let id = agent.id();
        let priority = agent.movement().priority();
        let cell = agent.movement().tile();
        let kind = agent.kind();
        self.next_agent_id = self.next_agent_id.saturating_add(1);

        let index = self
            .roster
            .partition_point(|existing| existing.movement().priority() >= priority);
        self.roster.insert(index, agent);

        tracing::info!(agent = id.get(), ?kind, ?cell, "agent entered the floor");
        out.push(Event::AgentSpawned {
            agent: id,
            kind,
            cell,
        });
        id
    }

    fn position(&self, agent: AgentId) -> Option<usize> {
        self.roster.iter().position(|existing| existing.id() == agent)
    }

    fn count_kind(&self, kind: AgentKind) -> usize {
        self.roster
            .iter()
            .filter(|agent| agent.kind() == kind)
            .count()
    }
}

/// Query functions that provide read-only access to the simulation state.
pub mod query {
    use glam::Vec2;
    use shopfloor_core::{AgentColor, AgentId, AgentKind, CellCoord, Grid, Priority};
    use shopfloor_system_movement::{MovementConfig, MovementPhase};
    use shopfloor_system_reservations::ReservationLedger;

    use super::Simulation;

    /// Immutable representation of a single agent's state used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct AgentSnapshot {
        /// Unique identifier assigned to the agent.
        pub id: AgentId,
        /// Variant of the agent.
        pub kind: AgentKind,
        /// Fallback colour of the agent.
        pub color: AgentColor,
        /// Precedence of the agent.
        pub priority: Priority,
        /// Authoritative cell of the agent.
        pub tile: CellCoord,
        /// Draw position in tile units.
        pub visual: Vec2,
        /// Coarse movement state.
        pub phase: MovementPhase,
        /// Goal currently pursued.
        pub goal: Option<CellCoord>,
        /// Remaining steps toward the goal.
        pub path: Vec<CellCoord>,
        /// Stops not yet started.
        pub remaining_destinations: Vec<CellCoord>,
        /// Consecutive ticks spent waiting.
        pub blocked_ticks: u32,
    }

    /// Captures every agent ordered by identifier.
    #[must_use]
    pub fn agent_view<L: ReservationLedger>(simulation: &Simulation<L>) -> Vec<AgentSnapshot> {
        let mut snapshots: Vec<AgentSnapshot> = simulation
            .roster
            .iter()
            .map(|agent| {
                let movement = agent.movement();
                AgentSnapshot {
                    id: agent.id(),
                    kind: agent.kind(),
                    color: agent.color(),
                    priority: movement.priority(),
                    tile: movement.tile(),
                    visual: movement.visual().position(),
                    phase: movement.phase(),
                    goal: movement.goal(),
                    path: movement.path().iter().collect(),
                    remaining_destinations: agent.remaining_destinations().iter().collect(),
                    blocked_ticks: movement.blocked_ticks(),
                }
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Identifiers in the order agents are updated each tick.
    #[must_use]
    pub fn update_order<L: ReservationLedger>(simulation: &Simulation<L>) -> Vec<AgentId> {
        simulation.roster.iter().map(|agent| agent.id()).collect()
    }

    /// Provides read-only access to the floor grid.
    #[must_use]
    pub fn grid<L: ReservationLedger>(simulation: &Simulation<L>) -> &Grid {
        &simulation.grid
    }

    /// Provides read-only access to the reservation ledger.
    #[must_use]
    pub fn reservations<L: ReservationLedger>(simulation: &Simulation<L>) -> &L {
        &simulation.ledger
    }

    /// Movement tunables applied to every agent.
    #[must_use]
    pub fn movement_config<L: ReservationLedger>(simulation: &Simulation<L>) -> &MovementConfig {
        &simulation.config
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index<L: ReservationLedger>(simulation: &Simulation<L>) -> u64 {
        simulation.tick_index
    }

    /// Number of customers currently on the floor.
    #[must_use]
    pub fn active_customers<L: ReservationLedger>(simulation: &Simulation<L>) -> usize {
        simulation.count_kind(AgentKind::Customer)
    }
}
