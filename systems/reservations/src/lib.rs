#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Mutual-exclusion ledger that guarantees at most one agent per cell.
//!
//! The ledger only records ownership. It never consults walkability and never
//! arbitrates between competing requests: whichever agent asks first within a
//! tick wins, so callers must process agents in a stable order.

use std::collections::BTreeMap;

use shopfloor_core::{AgentId, CellCoord};

/// Ownership ledger consulted by movement before entering a cell.
pub trait ReservationLedger {
    /// Claims the cell for `agent`.
    ///
    /// Succeeds when the cell is unowned or already owned by `agent`. A failed
    /// claim leaves the ledger untouched.
    fn reserve(&mut self, cell: CellCoord, agent: AgentId) -> bool;

    /// Drops every claim held by `agent`. Idempotent.
    fn release(&mut self, agent: AgentId);

    /// Drops the claim on `cell` if `agent` holds it.
    fn release_cell(&mut self, cell: CellCoord, agent: AgentId);

    /// Reports whether `agent` could claim the cell right now.
    fn is_free(&self, cell: CellCoord, agent: AgentId) -> bool;

    /// Agent currently holding the cell.
    fn owner(&self, cell: CellCoord) -> Option<AgentId>;
}

/// Ledger backed by an ordered map so iteration is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileReservationTable {
    owners: BTreeMap<CellCoord, AgentId>,
}

impl TileReservationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reserved cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Reports whether no cell is reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Iterator over every reservation ordered by cell.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, AgentId)> + '_ {
        self.owners.iter().map(|(cell, agent)| (*cell, *agent))
    }

    /// Cells currently held by `agent`, ordered by cell.
    #[must_use]
    pub fn cells_owned_by(&self, agent: AgentId) -> Vec<CellCoord> {
        self.owners
            .iter()
            .filter(|(_, owner)| **owner == agent)
            .map(|(cell, _)| *cell)
            .collect()
    }
}

impl ReservationLedger for TileReservationTable {
    fn reserve(&mut self, cell: CellCoord, agent: AgentId) -> bool {
        match self.owners.get(&cell) {
            Some(owner) if *owner != agent => false,
            Some(_) => true,
            None => {
                let _ = self.owners.insert(cell, agent);
                true
            }
        }
    }

    fn release(&mut self, agent: AgentId) {
        let before = self.owners.len();
        self.owners.retain(|_, owner| *owner != agent);
        tracing::trace!(
            agent = agent.get(),
            released = before - self.owners.len(),
            "released reservations"
        );
    }

    fn release_cell(&mut self, cell: CellCoord, agent: AgentId) {
        if self.owners.get(&cell) == Some(&agent) {
            let _ = self.owners.remove(&cell);
        }
    }

    fn is_free(&self, cell: CellCoord, agent: AgentId) -> bool {
        self.owners.get(&cell).map_or(true, |owner| *owner == agent)
    }

    fn owner(&self, cell: CellCoord) -> Option<AgentId> {
        self.owners.get(&cell).copied()
    }
}
