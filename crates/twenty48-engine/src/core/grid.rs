use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    CELLS, MAX_TILE, SIZE,
    direction::Direction,
    line::{self, Line},
};

/// Coordinates of a single cell, row-major with the origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Outcome of shifting the whole grid in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shift {
    /// Whether any line changed.
    pub moved: bool,
    /// Sum of the points gained over all lines.
    pub gained: u64,
}

/// Rejected cell value or grid shape.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidGridError {
    #[display("expected {} rows, got {_0}", SIZE)]
    RowCount(#[error(not(source))] usize),
    #[display("row {row} has {len} cells, expected {}", SIZE)]
    RowLength { row: usize, len: usize },
    #[display("cell ({row}, {col}) holds {value}, which is not 0 or a power of two up to {}", MAX_TILE)]
    CellValue { row: usize, col: usize, value: f64 },
}

/// The N×N playing field.
///
/// Cells hold `0` for empty or a power of two up to [`MAX_TILE`]. Every
/// constructor checks this, so a `Grid` obtained from outside the crate always
/// satisfies it.
///
/// Serializes as a nested array of rows. Deserialization accepts any JSON
/// numbers but rejects the grid as a whole if the shape is not N×N or a cell
/// is negative, fractional, non-finite, not a power of two, or above
/// [`MAX_TILE`].
///
/// # Example
///
/// ```
/// use twenty48_engine::{Direction, Grid};
///
/// let mut grid = Grid::from_rows([
///     [2, 2, 2, 2],
///     [0, 2, 0, 2],
///     [0, 0, 0, 0],
///     [0, 0, 0, 0],
/// ])
/// .unwrap();
///
/// let shift = grid.shift(Direction::Left);
/// assert!(shift.moved);
/// assert_eq!(shift.gained, 12);
/// assert_eq!(grid.rows()[0], [4, 4, 0, 0]);
/// assert_eq!(grid.rows()[1], [4, 0, 0, 0]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid {
    cells: [[u32; SIZE]; SIZE],
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells.iter()).finish()
    }
}

impl Grid {
    pub const SIZE: usize = SIZE;
    pub const EMPTY: Self = Self {
        cells: [[0; SIZE]; SIZE],
    };

    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Result<Self, InvalidGridError> {
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if !is_tile_value(value) {
                    return Err(InvalidGridError::CellValue {
                        row,
                        col,
                        value: f64::from(value),
                    });
                }
            }
        }
        Ok(Self { cells: rows })
    }

    #[must_use]
    pub const fn rows(&self) -> &[[u32; SIZE]; SIZE] {
        &self.cells
    }

    #[must_use]
    pub const fn get(&self, pos: Position) -> u32 {
        self.cells[pos.row][pos.col]
    }

    pub(crate) fn set(&mut self, pos: Position, value: u32) {
        debug_assert!(is_tile_value(value));
        self.cells[pos.row][pos.col] = value;
    }

    /// Reads line `index` oriented so that `dir` becomes a leftward move.
    #[must_use]
    pub fn line(&self, dir: Direction, index: usize) -> Line {
        let mut out = [0; SIZE];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.get(Self::line_cell(dir, index, k));
        }
        out
    }

    fn set_line(&mut self, dir: Direction, index: usize, values: Line) {
        for (k, value) in values.into_iter().enumerate() {
            let Position { row, col } = Self::line_cell(dir, index, k);
            self.cells[row][col] = value;
        }
    }

    /// Cell holding slot `k` of line `index` as seen moving towards `dir`.
    const fn line_cell(dir: Direction, index: usize, k: usize) -> Position {
        let k = if dir.is_reversed() { SIZE - 1 - k } else { k };
        if dir.is_vertical() {
            Position::new(k, index)
        } else {
            Position::new(index, k)
        }
    }

    /// Slides and merges every line towards `dir`, in place.
    pub fn shift(&mut self, dir: Direction) -> Shift {
        let mut shift = Shift::default();
        for index in 0..SIZE {
            let before = self.line(dir, index);
            let merged = line::slide(before);
            if merged.line != before {
                shift.moved = true;
            }
            shift.gained += merged.gained;
            self.set_line(dir, index, merged.line);
        }
        shift
    }

    /// Like [`Self::shift`], but leaves `self` untouched.
    #[must_use]
    pub fn shifted(mut self, dir: Direction) -> (Self, Shift) {
        let shift = self.shift(dir);
        (self, shift)
    }

    /// Lists empty cells in row-major order.
    #[must_use]
    pub fn empty_cells(&self) -> ArrayVec<Position, CELLS> {
        Self::positions().filter(|&pos| self.get(pos) == 0).collect()
    }

    /// Returns `false` only when the grid is full and no two neighbors below
    /// [`MAX_TILE`] match.
    ///
    /// This does not say which direction is playable, only that some is.
    #[must_use]
    pub fn has_moves_available(&self) -> bool {
        Self::positions().any(|Position { row, col }| {
            let value = self.cells[row][col];
            value == 0
                || (value < MAX_TILE && col + 1 < SIZE && self.cells[row][col + 1] == value)
                || (value < MAX_TILE && row + 1 < SIZE && self.cells[row + 1][col] == value)
        })
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    #[must_use]
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    fn positions() -> impl Iterator<Item = Position> {
        (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Position::new(row, col)))
    }
}

fn is_tile_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "range and integrality are checked before the cast"
)]
fn tile_from_f64(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(MAX_TILE) {
        return None;
    }
    let value = value as u32;
    is_tile_value(value).then_some(value)
}

impl TryFrom<Vec<Vec<f64>>> for Grid {
    type Error = InvalidGridError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        if rows.len() != SIZE {
            return Err(InvalidGridError::RowCount(rows.len()));
        }
        let mut grid = Self::EMPTY;
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != SIZE {
                return Err(InvalidGridError::RowLength {
                    row,
                    len: cells.len(),
                });
            }
            for (col, value) in cells.into_iter().enumerate() {
                grid.cells[row][col] = tile_from_f64(value)
                    .ok_or(InvalidGridError::CellValue { row, col, value })?;
            }
        }
        Ok(grid)
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.cells.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        Self::try_from(rows).map_err(|e| serde::de::Error::custom(format!("invalid grid: {e}")))
    }
}
