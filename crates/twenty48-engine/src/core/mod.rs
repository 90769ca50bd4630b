//! Pure grid data structures and transforms.
//!
//! - [`Grid`] - The N×N field with directional shifts and terminal detection
//! - [`Direction`] - Move direction, parsed from tokens, key names, or swipes
//! - [`line`] - Compress and merge of a single leftward line

pub use self::{direction::*, grid::*};

pub(crate) mod direction;
pub(crate) mod grid;
pub mod line;

/// Side length of the square grid.
pub const SIZE: usize = 4;
/// Number of cells in the grid.
pub const CELLS: usize = SIZE * SIZE;
/// Largest tile a grid holds: the highest value a 4×4 board can build.
///
/// Two tiles of this value do not merge.
pub const MAX_TILE: u32 = 1 << 17;
