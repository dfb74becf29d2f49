//! Deterministic shape selection.
//!
//! A simple LCG keeps games reproducible from a seed without pulling in an
//! external RNG crate. Each spawn draws uniformly among the seven shapes.

use crate::types::ShapeKind;

/// Simple LCG (Numerical Recipes constants).
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed. A zero seed is remapped to 1.
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in `[0, max)`.
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Uniform draw among the seven shapes.
    pub fn draw_shape(&mut self) -> ShapeKind {
        ShapeKind::ALL[self.next_range(7) as usize]
    }
}
