//! Agent variants walking the store floor.

use std::{collections::VecDeque, fmt};

use shopfloor_core::{AgentColor, AgentId, AgentKind, CellCoord, Event, Grid, Priority};
use shopfloor_system_movement::MovementController;
use shopfloor_system_reservations::ReservationLedger;

/// Precedence assigned to customers.
pub const CUSTOMER_PRIORITY: Priority = Priority::new(1);

/// Precedence assigned to staff, processed ahead of customers.
pub const EMPLOYEE_PRIORITY: Priority = Priority::new(2);

/// Fallback colour of every staff member.
pub const STAFF_COLOR: AgentColor = AgentColor::from_rgb(0x1e, 0x4d, 0x8c);

/// Ordered list of cells an agent still intends to visit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Itinerary {
    stops: VecDeque<CellCoord>,
}

impl Itinerary {
    /// Creates an itinerary visiting the cells in order.
    #[must_use]
    pub fn new(stops: impl IntoIterator<Item = CellCoord>) -> Self {
        Self {
            stops: stops.into_iter().collect(),
        }
    }

    /// Appends a stop to the end of the itinerary.
    pub fn push(&mut self, cell: CellCoord) {
        self.stops.push_back(cell);
    }

    /// Removes and returns the next stop.
    pub fn pop_front(&mut self) -> Option<CellCoord> {
        self.stops.pop_front()
    }

    /// Number of stops left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Reports whether no stops are left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Iterator over the stops in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.stops.iter().copied()
    }
}

/// Behaviour shared by every agent on the floor.
///
/// Variants supply their itinerary policy; the provided methods drive the
/// movement controller and tear the agent down once it is done.
pub trait Agent: fmt::Debug {
    /// Variant of the agent.
    fn kind(&self) -> AgentKind;

    /// Colour drawn when no sprite is available.
    fn color(&self) -> AgentColor;

    /// Movement state of the agent.
    fn movement(&self) -> &MovementController;

    /// Mutable movement state of the agent.
    fn movement_mut(&mut self) -> &mut MovementController;

    /// Takes the next stop to walk toward, if any.
    fn next_destination(&mut self) -> Option<CellCoord>;

    /// Appends a stop to the itinerary.
    fn add_destination(&mut self, cell: CellCoord);

    /// Stops not yet handed to the movement controller.
    fn remaining_destinations(&self) -> &Itinerary;

    /// Whether the agent leaves the floor once its itinerary runs out.
    fn leaves_when_done(&self) -> bool;

    /// Whether the agent still takes part in the simulation.
    fn is_active(&self) -> bool;

    /// Flags the agent for removal from the roster.
    fn mark_inactive(&mut self);

    /// Identifier of the agent.
    fn id(&self) -> AgentId {
        self.movement().agent()
    }

    /// Sends the agent toward `goal`, replacing any route in flight.
    fn move_to(&mut self, goal: CellCoord, grid: &Grid, out: &mut Vec<Event>) {
        self.movement_mut().set_goal(goal, grid, out);
    }

    /// Advances the agent by one tick.
    fn update(&mut self, grid: &Grid, ledger: &mut dyn ReservationLedger, out: &mut Vec<Event>) {
        if !self.is_active() {
            return;
        }

        let movement = self.movement();
        if movement.goal().is_none() || movement.has_reached_goal() {
            match self.next_destination() {
                Some(goal) => self.move_to(goal, grid, out),
                None if self.leaves_when_done() => {
                    self.deactivate(ledger, out);
                    return;
                }
                None => {}
            }
        }

        self.movement_mut().update(grid, ledger, out);
    }

    /// Releases every reservation and takes the agent off the floor.
    fn deactivate(&mut self, ledger: &mut dyn ReservationLedger, out: &mut Vec<Event>) {
        if !self.is_active() {
            return;
        }

        self.movement_mut().retire(ledger);
        self.mark_inactive();
        tracing::info!(agent = self.id().get(), kind = ?self.kind(), "agent left the floor");
        out.push(Event::AgentDeactivated { agent: self.id() });
    }
}

/// Shopper walking a one-shot itinerary and leaving afterwards.
#[derive(Debug)]
pub struct Customer {
    movement: MovementController,
    color: AgentColor,
    itinerary: Itinerary,
    active: bool,
}

impl Customer {
    /// Creates a customer around an already spawned controller.
    #[must_use]
    pub fn new(movement: MovementController, color: AgentColor, itinerary: Itinerary) -> Self {
        Self {
            movement,
            color,
            itinerary,
            active: true,
        }
    }
}

impl Agent for Customer {
    fn kind(&self) -> AgentKind {
        AgentKind::Customer
    }

    fn color(&self) -> AgentColor {
        self.color
    }

    fn movement(&self) -> &MovementController {
        &self.movement
    }

    fn movement_mut(&mut self) -> &mut MovementController {
        &mut self.movement
    }

    fn next_destination(&mut self) -> Option<CellCoord> {
        self.itinerary.pop_front()
    }

    fn add_destination(&mut self, cell: CellCoord) {
        self.itinerary.push(cell);
    }

    fn remaining_destinations(&self) -> &Itinerary {
        &self.itinerary
    }

    fn leaves_when_done(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn mark_inactive(&mut self) {
        self.active = false;
    }
}

/// Staff member walking a work route, optionally in a loop.
#[derive(Debug)]
pub struct Employee {
    movement: MovementController,
    route: Itinerary,
    patrol: bool,
    active: bool,
}

impl Employee {
    /// Creates an employee around an already spawned controller.
    ///
    /// A patrolling employee re-queues every stop it takes, so the route
    /// repeats until the employee is removed.
    #[must_use]
    pub fn new(movement: MovementController, route: Itinerary, patrol: bool) -> Self {
        Self {
            movement,
            route,
            patrol,
            active: true,
        }
    }
}

impl Agent for Employee {
    fn kind(&self) -> AgentKind {
        AgentKind::Employee
    }

    fn color(&self) -> AgentColor {
        STAFF_COLOR
    }

    fn movement(&self) -> &MovementController {
        &self.movement
    }

    fn movement_mut(&mut self) -> &mut MovementController {
        &mut self.movement
    }

    fn next_destination(&mut self) -> Option<CellCoord> {
        let stop = self.route.pop_front()?;
        if self.patrol {
            self.route.push(stop);
        }
        Some(stop)
    }

    fn add_destination(&mut self, cell: CellCoord) {
        self.route.push(cell);
    }

    fn remaining_destinations(&self) -> &Itinerary {
        &self.route
    }

    fn leaves_when_done(&self) -> bool {
        !self.patrol
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn mark_inactive(&mut self) {
        self.active = false;
    }
}
