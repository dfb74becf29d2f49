//! Core module - pure game logic with no terminal dependencies.
//!
//! Everything in here talks to the outside world only through the collaborator
//! traits in [`crate::io`], so the whole module runs headless under test.

pub mod catalog;
pub mod grid;
pub mod piece;
pub mod rng;
pub mod session;

// Re-export commonly used types
pub use grid::Grid;
pub use piece::{rotated, ActivePiece};
pub use rng::SimpleRng;
pub use session::{Phase, Session};
