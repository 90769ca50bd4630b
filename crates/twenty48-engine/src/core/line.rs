use super::{MAX_TILE, SIZE};

/// One row or column of the grid, oriented so that the move direction is "left".
pub type Line = [u32; SIZE];

/// Result of sliding a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMerge {
    /// The line after compressing and merging.
    pub line: Line,
    /// Points gained from merges in this line.
    pub gained: u64,
}

/// Packs all non-zero values to the front of the line, preserving their order.
///
/// ```
/// use twenty48_engine::core::line::compress;
///
/// assert_eq!(compress([0, 2, 0, 4]), [2, 4, 0, 0]);
/// ```
#[must_use]
pub fn compress(line: Line) -> Line {
    let mut out = [0; SIZE];
    for (slot, value) in out.iter_mut().zip(line.into_iter().filter(|&v| v != 0)) {
        *slot = value;
    }
    out
}

/// Merges adjacent equal tiles of an already compressed line.
///
/// A single left-to-right pass: once a pair merges, the cell to its right
/// becomes empty, so a freshly merged tile is never merged again in the same
/// move. Tiles at [`MAX_TILE`] never merge. The result is compressed again
/// before returning.
///
/// ```
/// use twenty48_engine::core::line::merge;
///
/// let merged = merge([2, 2, 2, 2]);
/// assert_eq!(merged.line, [4, 4, 0, 0]);
/// assert_eq!(merged.gained, 8);
/// ```
#[must_use]
pub fn merge(mut line: Line) -> LineMerge {
    let mut gained = 0;
    for i in 0..SIZE - 1 {
        if line[i] != 0 && line[i] < MAX_TILE && line[i] == line[i + 1] {
            line[i] *= 2;
            line[i + 1] = 0;
            gained += u64::from(line[i]);
        }
    }
    LineMerge {
        line: compress(line),
        gained,
    }
}

/// Compresses and merges a line: the full leftward move of a single line.
#[must_use]
pub fn slide(line: Line) -> LineMerge {
    merge(compress(line))
}
