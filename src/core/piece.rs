//! Active piece state and the fixed-pivot rotation transform.
//!
//! Rotation maps each offset `(r, c)` through the shape's pivot `(pr, pc)`:
//! clockwise `(nr, nc) = (pr + (c - pc), pc - (r - pr))`, counter-clockwise
//! the inverse. Pivots are half-integers for I and O, so the arithmetic runs
//! on a doubled lattice and results round half-away-from-zero back to cells.
//! There are no kick retries: a rotation that lands out of bounds or overlaps
//! is rejected outright by the caller.

use crate::core::catalog::{self, ShapeCells};
use crate::types::{CellHandle, ShapeKind};

/// The one falling piece. Created at spawn, consumed by locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: ShapeKind,
    /// Current rotated offsets; starts equal to the catalog base offsets.
    pub offsets: ShapeCells,
    /// (row, col) anchor added to each offset for absolute grid cells.
    pub origin: (i8, i8),
    /// Render handles of the currently displayed cells, replaced on every
    /// move, rotation, and fall step.
    pub handles: [CellHandle; 4],
}

impl ActivePiece {
    /// Absolute grid cells at the current origin.
    pub fn cells(&self) -> ShapeCells {
        let mut out = self.offsets;
        for cell in &mut out {
            cell.0 += self.origin.0;
            cell.1 += self.origin.1;
        }
        out
    }
}

/// Rotate a shape's offsets one quarter turn around its pivot.
pub fn rotated(offsets: &ShapeCells, kind: ShapeKind, clockwise: bool) -> ShapeCells {
    let (pr2, pc2) = catalog::pivot2(kind);
    let (pr2, pc2) = (pr2 as i16, pc2 as i16);

    let mut out = *offsets;
    for cell in &mut out {
        let dr2 = 2 * cell.0 as i16 - pr2;
        let dc2 = 2 * cell.1 as i16 - pc2;
        let (nr2, nc2) = if clockwise {
            (pr2 + dc2, pc2 - dr2)
        } else {
            (pr2 - dc2, pc2 + dr2)
        };
        *cell = (round_half(nr2), round_half(nc2));
    }
    out
}

/// Halve a doubled-lattice coordinate, rounding halves away from zero.
///
/// The doubled arithmetic is exact for every catalog pivot, so rounding only
/// matters as a documented tie-break if pivots ever change.
fn round_half(n2: i16) -> i8 {
    let n = if n2 >= 0 { (n2 + 1) / 2 } else { (n2 - 1) / 2 };
    n as i8
}
