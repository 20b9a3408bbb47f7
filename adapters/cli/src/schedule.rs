//! Commands a scenario queues for specific ticks.
//!
//! Agents are addressed by id; ids are handed out from 0 in spawn order, so
//! the scenario's employees take the first ones.

use std::collections::BTreeMap;

use serde::Deserialize;
use shopfloor_core::{AgentId, Event};
use shopfloor_world::Simulation;

use crate::scenario::cell;

/// One `[[schedule]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScheduleEntry {
    pub(crate) tick: u64,
    pub(crate) action: ScheduledAction,
}

/// Command applied to the floor when its tick comes up.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum ScheduledAction {
    /// Brings a staff member onto the floor.
    SpawnEmployee {
        start: [u32; 2],
        #[serde(default)]
        route: Vec<[u32; 2]>,
        #[serde(default)]
        patrol: bool,
    },
    /// Sends an agent to a cell, dropping the route it was on.
    SendAgent { agent: u32, goal: [u32; 2] },
    /// Takes an agent off the floor.
    RemoveAgent { agent: u32 },
}

/// Pending commands keyed by the tick they run on.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    pending: BTreeMap<u64, Vec<ScheduledAction>>,
}

impl Schedule {
    /// Queues entries, keeping file order among commands for the same tick.
    pub(crate) fn new(entries: impl IntoIterator<Item = ScheduleEntry>) -> Self {
        let mut pending: BTreeMap<u64, Vec<ScheduledAction>> = BTreeMap::new();
        for entry in entries {
            pending.entry(entry.tick).or_default().push(entry.action);
        }
        Self { pending }
    }

    /// Runs every command queued for `tick`.
    ///
    /// A command that cannot be carried out is logged and skipped.
    pub(crate) fn run_due(&mut self, tick: u64, simulation: &mut Simulation, out: &mut Vec<Event>) {
        let Some(actions) = self.pending.remove(&tick) else {
            return;
        };
        for action in actions {
            apply(&action, simulation, out);
        }
    }

    /// Number of ticks that still have commands queued.
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

fn apply(action: &ScheduledAction, simulation: &mut Simulation, out: &mut Vec<Event>) {
    match action {
        ScheduledAction::SpawnEmployee {
            start,
            route,
            patrol,
        } => {
            let route = route.iter().copied().map(cell);
            if let Err(error) = simulation.spawn_employee(cell(*start), route, *patrol, out) {
                tracing::warn!(%error, "scheduled employee could not be placed");
            }
        }
        ScheduledAction::SendAgent { agent, goal } => {
            if !simulation.move_agent(AgentId::new(*agent), cell(*goal), out) {
                tracing::warn!(agent, "scheduled move for an agent not on the floor");
            }
        }
        ScheduledAction::RemoveAgent { agent } => {
            if !simulation.remove(AgentId::new(*agent), out) {
                tracing::warn!(agent, "scheduled removal of an agent not on the floor");
            }
        }
    }
}
