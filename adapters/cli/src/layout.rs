//! Turns a scenario floor plan into a grid and the access points agents use.
//!
//! Legend: `#` wall, `.` floor, `S` shelf, `C` checkout, `E` entrance,
//! `X` exit. Shelves and checkouts are fixtures; agents visit the first
//! walkable cell south, north, east or west of them.

use anyhow::{bail, Context, Result};
use shopfloor_core::{CellCoord, Direction, Grid, GridBuilder, Tile, TileSpan};
use shopfloor_system_spawning::Venue;

use crate::scenario::{cell, FloorSection};

pub(crate) const SHELF_LABEL: &str = "shelf";
pub(crate) const CHECKOUT_LABEL: &str = "checkout";
pub(crate) const ENTRANCE_LABEL: &str = "entrance";
pub(crate) const EXIT_LABEL: &str = "exit";

const ACCESS_ORDER: [Direction; 4] = [
    Direction::South,
    Direction::North,
    Direction::East,
    Direction::West,
];

/// Built floor together with the cells customers are routed through.
#[derive(Debug)]
pub(crate) struct Layout {
    pub(crate) grid: Grid,
    pub(crate) venue: Venue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FixtureRole {
    Shelf,
    Checkout,
    Other,
}

impl FixtureRole {
    fn from_label(label: &str) -> Self {
        match label {
            SHELF_LABEL => Self::Shelf,
            CHECKOUT_LABEL => Self::Checkout,
            _ => Self::Other,
        }
    }
}

struct PlacedFixture {
    origin: CellCoord,
    span: TileSpan,
    role: FixtureRole,
}

impl Layout {
    /// Builds the floor described by the scenario.
    pub(crate) fn from_floor(floor: &FloorSection) -> Result<Self> {
        let mut builder = GridBuilder::for_plan(floor.plan.as_slice())?;
        let mut fixtures = Vec::new();
        let mut venue = Venue::default();

        for (row, line) in (0_u32..).zip(&floor.plan) {
            for (column, glyph) in (0_u32..).zip(line.chars()) {
                let at = CellCoord::new(column, row);
                match glyph {
                    '.' => {}
                    '#' => builder.wall(at)?,
                    'S' | 'C' => {
                        let label = if glyph == 'S' { SHELF_LABEL } else { CHECKOUT_LABEL };
                        let span = TileSpan::new(1, 1);
                        builder.place_fixture(at, span, label)?;
                        fixtures.push(PlacedFixture {
                            origin: at,
                            span,
                            role: FixtureRole::from_label(label),
                        });
                    }
                    'E' => {
                        builder.set_tile(at, Tile::floor().with_label(ENTRANCE_LABEL))?;
                        venue.entrances.push(at);
                    }
                    'X' => {
                        builder.set_tile(at, Tile::floor().with_label(EXIT_LABEL))?;
                        venue.exits.push(at);
                    }
                    other => bail!("unknown glyph {other:?} at column {column}, row {row}"),
                }
            }
        }

        for fixture in &floor.fixtures {
            let origin = cell(fixture.origin);
            let span = TileSpan::new(fixture.size[0], fixture.size[1]);
            builder
                .place_fixture(origin, span, fixture.label.as_str())
                .with_context(|| format!("cannot place {} at {origin:?}", fixture.label))?;
            fixtures.push(PlacedFixture {
                origin,
                span,
                role: FixtureRole::from_label(&fixture.label),
            });
        }

        let grid = builder.build();
        for fixture in &fixtures {
            let target = match fixture.role {
                FixtureRole::Shelf => &mut venue.shelves,
                FixtureRole::Checkout => &mut venue.checkouts,
                FixtureRole::Other => continue,
            };
            let access = access_point(&grid, fixture).with_context(|| {
                format!("fixture at {:?} has no walkable neighbour", fixture.origin)
            })?;
            target.push(access);
        }

        for &entrance in &venue.entrances {
            if !grid.is_walkable(entrance) {
                bail!("entrance at {entrance:?} is covered by a fixture");
            }
        }
        for &exit in &venue.exits {
            if !grid.is_walkable(exit) {
                bail!("exit at {exit:?} is covered by a fixture");
            }
        }

        Ok(Self { grid, venue })
    }
}

fn access_point(grid: &Grid, fixture: &PlacedFixture) -> Option<CellCoord> {
    let origin = fixture.origin;
    (origin.row()..origin.row() + fixture.span.height())
        .flat_map(|row| {
            (origin.column()..origin.column() + fixture.span.width())
                .map(move |column| CellCoord::new(column, row))
        })
        .flat_map(|covered| {
            ACCESS_ORDER
                .into_iter()
                .filter_map(move |direction| covered.neighbor(direction))
        })
        .find(|candidate| grid.is_walkable(*candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::FixtureSection;
    use shopfloor_core::GridError;

    fn floor(plan: &[&str]) -> FloorSection {
        FloorSection {
            plan: plan.iter().map(|row| (*row).to_owned()).collect(),
            fixtures: Vec::new(),
        }
    }

    #[test]
    fn legend_maps_to_tiles_and_access_points() {
        let layout = Layout::from_floor(&floor(&[
            "#####", //
            "#S.C#", //
            "#...#", //
            "#E.X#", //
            "#####",
        ]))
        .expect("layout");

        let grid = &layout.grid;
        assert!(!grid.is_walkable(CellCoord::new(1, 1)));
        assert_eq!(
            grid.tile_at(CellCoord::new(1, 1)).and_then(Tile::label),
            Some(SHELF_LABEL)
        );
        assert!(grid.is_walkable(CellCoord::new(1, 3)));
        assert_eq!(layout.venue.shelves, vec![CellCoord::new(1, 2)]);
        assert_eq!(layout.venue.checkouts, vec![CellCoord::new(3, 2)]);
        assert_eq!(layout.venue.entrances, vec![CellCoord::new(1, 3)]);
        assert_eq!(layout.venue.exits, vec![CellCoord::new(3, 3)]);
    }

    #[test]
    fn access_falls_back_to_other_sides() {
        let layout = Layout::from_floor(&floor(&[
            "#####", //
            "#..S#", //
            "#..S#", //
            "#####",
        ]))
        .expect("layout");

        assert_eq!(
            layout.venue.shelves,
            vec![CellCoord::new(2, 1), CellCoord::new(2, 2)]
        );
    }

    #[test]
    fn multi_cell_fixtures_are_placed() {
        let mut section = floor(&[
            "......", //
            "......", //
            "......",
        ]);
        section.fixtures.push(FixtureSection {
            origin: [1, 0],
            size: [3, 2],
            label: CHECKOUT_LABEL.to_owned(),
        });

        let layout = Layout::from_floor(&section).expect("layout");

        let blocked = layout
            .grid
            .cells()
            .filter(|cell| !layout.grid.is_walkable(*cell))
            .count();
        assert_eq!(blocked, 6);
        assert_eq!(
            layout.grid.tile_at(CellCoord::new(1, 0)).and_then(Tile::span),
            Some(TileSpan::new(3, 2))
        );
        assert_eq!(layout.venue.checkouts, vec![CellCoord::new(0, 0)]);
    }

    #[test]
    fn rejects_ragged_rows_and_unknown_glyphs() {
        let ragged = Layout::from_floor(&floor(&["...", ".."])).expect_err("ragged");
        assert_eq!(
            ragged.downcast_ref::<GridError>(),
            Some(&GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2,
            })
        );
        assert!(Layout::from_floor(&floor(&["..?"])).is_err());
    }

    #[test]
    fn rejects_fixture_outside_floor() {
        let mut section = floor(&["...."]);
        section.fixtures.push(FixtureSection {
            origin: [3, 0],
            size: [2, 1],
            label: "freezer".to_owned(),
        });
        assert!(Layout::from_floor(&section).is_err());
    }
}
