//! Static walkability map consulted by search and movement.

use thiserror::Error;

use crate::CellCoord;

/// Errors raised while populating a [`Grid`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The grid would contain no cells.
    #[error("grid dimensions {columns}x{rows} contain no cells")]
    Empty {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A cell lies outside the configured dimensions.
    #[error("cell ({}, {}) lies outside the {columns}x{rows} grid", cell.column(), cell.row())]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Column count of the grid.
        columns: u32,
        /// Row count of the grid.
        rows: u32,
    },
    /// A fixture footprint has a zero-sized edge.
    #[error("fixture anchored at ({}, {}) has an empty footprint", origin.column(), origin.row())]
    EmptyFixture {
        /// Upper-left cell of the fixture.
        origin: CellCoord,
    },
    /// A row of an ASCII plan differs in length from the first row.
    #[error("plan row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// An ASCII plan contains a character outside its legend.
    #[error("unknown glyph {glyph:?} at ({column}, {row})")]
    UnknownGlyph {
        /// Character that could not be interpreted.
        glyph: char,
        /// Column of the glyph.
        column: u32,
        /// Row of the glyph.
        row: u32,
    },
}

/// Footprint of a fixture that covers more than one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileSpan {
    width: u32,
    height: u32,
}

impl TileSpan {
    /// Creates a span covering `width` by `height` cells.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the footprint in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the footprint in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Single cell of the store floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    walkable: bool,
    occupied: bool,
    span: Option<TileSpan>,
    label: Option<String>,
}

impl Tile {
    /// Open floor that agents may walk across.
    #[must_use]
    pub const fn floor() -> Self {
        Self {
            walkable: true,
            occupied: false,
            span: None,
            label: None,
        }
    }

    /// Solid wall segment.
    #[must_use]
    pub const fn wall() -> Self {
        Self {
            walkable: false,
            occupied: true,
            span: None,
            label: None,
        }
    }

    /// Marks the tile as held by a static fixture.
    #[must_use]
    pub fn occupied(mut self) -> Self {
        self.occupied = true;
        self
    }

    /// Attaches a diagnostic label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Records the footprint of the fixture anchored on this tile.
    #[must_use]
    pub fn with_span(mut self, span: TileSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Reports whether agents may stand on the tile.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Reports whether a static fixture holds the tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Footprint of a multi-cell fixture anchored here.
    #[must_use]
    pub const fn span(&self) -> Option<TileSpan> {
        self.span
    }

    /// Diagnostic label, if one was assigned.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Immutable walkability map.
///
/// A grid is populated once through [`GridBuilder`] and never resized or
/// edited afterwards. Lookups outside the configured dimensions report an
/// absent tile instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Fully walkable grid without walls or fixtures.
    pub fn open(columns: u32, rows: u32) -> Result<Self, GridError> {
        GridBuilder::new(columns, rows).map(GridBuilder::build)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.rows
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tile stored at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    /// Reports whether the cell exists and can be walked on.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile_at(cell).is_some_and(Tile::is_walkable)
    }

    /// Row-major offset of the cell, or `None` outside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        dense_index(self.columns, self.rows, cell)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| CellCoord::new(column, row))
        })
    }
}

/// Mutable staging area used by level building before a [`Grid`] is frozen.
#[derive(Clone, Debug)]
pub struct GridBuilder {
    grid: Grid,
}

impl GridBuilder {
    /// Starts a grid of the provided dimensions covered in floor tiles.
    pub fn new(columns: u32, rows: u32) -> Result<Self, GridError> {
        let count = u64::from(columns) * u64::from(rows);
        let count = usize::try_from(count).unwrap_or(0);
        if count == 0 {
            return Err(GridError::Empty { columns, rows });
        }

        Ok(Self {
            grid: Grid {
                columns,
                rows,
                tiles: vec![Tile::floor(); count],
            },
        })
    }

    /// Creates an all-floor builder sized to a text plan.
    ///
    /// Every row must have as many characters as the first one. Callers with
    /// their own legend use this and then fill in cells glyph by glyph.
    pub fn for_plan<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let (columns, row_count) = ascii_dimensions(rows)?;
        Self::new(columns, row_count)
    }

    /// Parses a plan where `#` marks walls and `.` marks floor.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let mut builder = Self::for_plan(rows)?;
        for (row, line) in (0_u32..).zip(rows) {
            for (column, glyph) in (0_u32..).zip(line.as_ref().chars()) {
                let cell = CellCoord::new(column, row);
                match glyph {
                    '#' => builder.wall(cell)?,
                    '.' => {}
                    other => {
                        return Err(GridError::UnknownGlyph {
                            glyph: other,
                            column,
                            row,
                        })
                    }
                }
            }
        }
        Ok(builder)
    }

    /// Number of columns being built.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.columns
    }

    /// Number of rows being built.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.rows
    }

    /// Replaces the tile at the provided cell.
    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) -> Result<(), GridError> {
        let index = self.checked_index(cell)?;
        self.grid.tiles[index] = tile;
        Ok(())
    }

    /// Turns the provided cell into a wall.
    pub fn wall(&mut self, cell: CellCoord) -> Result<(), GridError> {
        self.set_tile(cell, Tile::wall())
    }

    /// Places a static fixture covering `span` cells from `origin`.
    ///
    /// The origin tile carries the span and label; every covered cell becomes
    /// non-walkable and occupied.
    pub fn place_fixture(
        &mut self,
        origin: CellCoord,
        span: TileSpan,
        label: impl Into<String>,
    ) -> Result<(), GridError> {
        if span.width() == 0 || span.height() == 0 {
            return Err(GridError::EmptyFixture { origin });
        }

        let far_column = origin.column().checked_add(span.width() - 1);
        let far_row = origin.row().checked_add(span.height() - 1);
        let far_corner = match (far_column, far_row) {
            (Some(column), Some(row)) => CellCoord::new(column, row),
            _ => return Err(self.out_of_bounds(origin)),
        };
        let _ = self.checked_index(far_corner)?;

        let blocked = Tile {
            walkable: false,
            ..Tile::floor()
        }
        .occupied();
        for row in origin.row()..=far_corner.row() {
            for column in origin.column()..=far_corner.column() {
                self.set_tile(CellCoord::new(column, row), blocked.clone())?;
            }
        }
        self.set_tile(origin, blocked.with_span(span).with_label(label))
    }

    /// Freezes the layout.
    #[must_use]
    pub fn build(self) -> Grid {
        self.grid
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, GridError> {
        self.grid
            .index(cell)
            .ok_or_else(|| self.out_of_bounds(cell))
    }

    fn out_of_bounds(&self, cell: CellCoord) -> GridError {
        GridError::OutOfBounds {
            cell,
            columns: self.grid.columns,
            rows: self.grid.rows,
        }
    }
}

fn ascii_dimensions<S: AsRef<str>>(rows: &[S]) -> Result<(u32, u32), GridError> {
    let row_count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
    let Some(first) = rows.first() else {
        return Err(GridError::Empty {
            columns: 0,
            rows: 0,
        });
    };
    let expected = u32::try_from(first.as_ref().chars().count()).unwrap_or(u32::MAX);
    for (row, line) in (0_u32..).zip(rows) {
        let found = u32::try_from(line.as_ref().chars().count()).unwrap_or(u32::MAX);
        if found != expected {
            return Err(GridError::RaggedRow {
                row,
                expected,
                found,
            });
        }
    }
    Ok((expected, row_count))
}

fn dense_index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}
