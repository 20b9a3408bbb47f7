//! Run summary and ASCII frames printed by the headless driver.

use std::fmt;

use shopfloor_core::{AgentKind, CellCoord, Event, Grid};
use shopfloor_world::query::AgentSnapshot;

use crate::layout::{ENTRANCE_LABEL, EXIT_LABEL};

/// Running counts of what happened on the floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) ticks: u64,
    pub(crate) spawned: usize,
    pub(crate) turned_away: usize,
    pub(crate) departed: usize,
    pub(crate) steps: usize,
    pub(crate) arrivals: usize,
    pub(crate) blocks: usize,
    pub(crate) reroutes: usize,
    pub(crate) sidesteps: usize,
    pub(crate) unreachable: usize,
}

impl Tally {
    /// Folds a batch of events into the counts.
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { tick } => self.ticks = *tick,
                Event::AgentSpawned { .. } => self.spawned += 1,
                Event::AgentDeactivated { .. } => self.departed += 1,
                Event::AgentAdvanced { .. } | Event::AgentSidestepped { .. } => {
                    self.steps += 1;
                    if matches!(event, Event::AgentSidestepped { .. }) {
                        self.sidesteps += 1;
                    }
                }
                Event::GoalReached { .. } => self.arrivals += 1,
                Event::AgentBlocked { .. } => self.blocks += 1,
                Event::AgentRerouted { .. } => self.reroutes += 1,
                Event::GoalUnreachable { .. } => self.unreachable += 1,
                Event::GoalAssigned { .. } => {}
            }
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks simulated    {}", self.ticks)?;
        writeln!(f, "agents spawned     {}", self.spawned)?;
        writeln!(f, "turned away        {}", self.turned_away)?;
        writeln!(f, "agents departed    {}", self.departed)?;
        writeln!(f, "tile steps         {}", self.steps)?;
        writeln!(f, "goals reached      {}", self.arrivals)?;
        writeln!(f, "blocked episodes   {}", self.blocks)?;
        writeln!(f, "reroutes           {}", self.reroutes)?;
        writeln!(f, "sidesteps          {}", self.sidesteps)?;
        write!(f, "unreachable goals  {}", self.unreachable)
    }
}

/// Draws the floor with every agent on its authoritative tile.
///
/// Customers appear as `c`, staff as `e`. Fixtures show the first letter of
/// their label on the origin cell; the rest of their footprint draws like a
/// wall.
pub(crate) fn render_frame(grid: &Grid, agents: &[AgentSnapshot]) -> String {
    let capacity = (grid.width() as usize + 1) * grid.height() as usize;
    let mut frame = String::with_capacity(capacity);

    for row in 0..grid.height() {
        for column in 0..grid.width() {
            let cell = CellCoord::new(column, row);
            let glyph = agents
                .iter()
                .find(|agent| agent.tile == cell)
                .map_or_else(|| tile_glyph(grid, cell), |agent| agent_glyph(agent.kind));
            frame.push(glyph);
        }
        frame.push('\n');
    }

    frame
}

fn agent_glyph(kind: AgentKind) -> char {
    match kind {
        AgentKind::Customer => 'c',
        AgentKind::Employee => 'e',
    }
}

fn tile_glyph(grid: &Grid, cell: CellCoord) -> char {
    let Some(tile) = grid.tile_at(cell) else {
        return ' ';
    };

    match tile.label() {
        Some(ENTRANCE_LABEL) => 'E',
        Some(EXIT_LABEL) => 'X',
        Some(label) => label
            .chars()
            .next()
            .map_or('#', |initial| initial.to_ascii_uppercase()),
        None if tile.is_walkable() => '.',
        None => '#',
    }
}
