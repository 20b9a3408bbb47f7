//! Smooth draw positions derived from discrete tile steps.
//!
//! Visual coordinates are expressed in tile units: the cell `(3, 2)` is drawn
//! at `Vec2::new(3.0, 2.0)`. Renderers scale by their own cell size.

use glam::Vec2;
use shopfloor_core::CellCoord;

/// Moves `current` toward `target` by at most `step`, snapping once within
/// reach so the value never overshoots.
#[must_use]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step.copysign(delta)
    }
}

/// Draw position of the provided cell in tile units.
#[must_use]
pub fn tile_position(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}

/// Continuous position that trails the authoritative tile position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualPosition {
    position: Vec2,
}

impl VisualPosition {
    /// Position resting exactly on the provided cell.
    #[must_use]
    pub fn at(cell: CellCoord) -> Self {
        Self {
            position: tile_position(cell),
        }
    }

    /// Current draw position in tile units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Advances one animation step toward `cell` on each axis independently.
    ///
    /// Returns whether the position rests on the cell afterwards.
    pub fn advance_toward(&mut self, cell: CellCoord, step: f32) -> bool {
        let target = tile_position(cell);
        self.position = Vec2::new(
            approach(self.position.x, target.x, step),
            approach(self.position.y, target.y, step),
        );
        self.is_settled_on(cell)
    }

    /// Reports whether no sub-cell lag remains relative to `cell`.
    #[must_use]
    pub fn is_settled_on(&self, cell: CellCoord) -> bool {
        self.position == tile_position(cell)
    }
}
