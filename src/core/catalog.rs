//! Shape catalog - base cell offsets, colors, and rotation pivots.
//!
//! Pure lookup tables. Offsets are (row, col) relative to the piece origin;
//! pivots are stored doubled so half-integer pivots (I and O) stay integral.

use crate::types::{Rgb, ShapeKind};

/// Offset of a single mino relative to the piece origin, as (row, col).
pub type MinoOffset = (i8, i8);

/// A shape is exactly 4 mino offsets.
pub type ShapeCells = [MinoOffset; 4];

/// Base (spawn orientation) offsets for a shape.
pub fn base_offsets(kind: ShapeKind) -> ShapeCells {
    match kind {
        ShapeKind::I => [(0, 0), (0, 1), (0, 2), (0, 3)],
        ShapeKind::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
        ShapeKind::S => [(0, 1), (0, 2), (1, 0), (1, 1)],
        ShapeKind::Z => [(0, 0), (0, 1), (1, 1), (1, 2)],
        ShapeKind::J => [(0, 0), (1, 0), (1, 1), (1, 2)],
        ShapeKind::L => [(0, 2), (1, 0), (1, 1), (1, 2)],
        ShapeKind::T => [(0, 1), (1, 0), (1, 1), (1, 2)],
    }
}

/// Rotation pivot for a shape, doubled: `(2 * pivot_row, 2 * pivot_col)`.
///
/// I pivots at (0.5, 1.5) and O at (0.5, 0.5); everything else pivots at the
/// whole-cell (1, 1).
pub fn pivot2(kind: ShapeKind) -> (i8, i8) {
    match kind {
        ShapeKind::I => (1, 3),
        ShapeKind::O => (1, 1),
        _ => (2, 2),
    }
}

/// Display color for a shape. Opaque to the core beyond being handed to the
/// render collaborator.
pub fn color(kind: ShapeKind) -> Rgb {
    match kind {
        ShapeKind::I => Rgb::new(0, 220, 220),
        ShapeKind::O => Rgb::new(220, 220, 0),
        ShapeKind::S => Rgb::new(0, 200, 0),
        ShapeKind::Z => Rgb::new(220, 0, 0),
        ShapeKind::J => Rgb::new(40, 80, 240),
        ShapeKind::L => Rgb::new(240, 150, 0),
        ShapeKind::T => Rgb::new(170, 0, 220),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_offsets_in_a_2x4_box() {
        for kind in ShapeKind::ALL {
            let offsets = base_offsets(kind);
            assert_eq!(offsets.len(), 4);
            for (r, c) in offsets {
                assert!((0..2).contains(&r), "{kind:?} row offset {r}");
                assert!((0..4).contains(&c), "{kind:?} col offset {c}");
            }
        }
    }

    #[test]
    fn test_offsets_are_distinct() {
        for kind in ShapeKind::ALL {
            let offsets = base_offsets(kind);
            for i in 0..4 {
                for j in (i + 1)..4 {
                    assert_ne!(offsets[i], offsets[j], "{kind:?} has duplicate cells");
                }
            }
        }
    }

    #[test]
    fn test_half_integer_pivots() {
        // Doubled-pivot parity: odd components encode the .5 pivots.
        assert_eq!(pivot2(ShapeKind::I), (1, 3));
        assert_eq!(pivot2(ShapeKind::O), (1, 1));
        assert_eq!(pivot2(ShapeKind::T), (2, 2));
    }

    #[test]
    fn test_colors_are_distinct() {
        for (i, a) in ShapeKind::ALL.iter().enumerate() {
            for b in &ShapeKind::ALL[i + 1..] {
                assert_ne!(color(*a), color(*b));
            }
        }
    }
}
