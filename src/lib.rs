//! Minofall - a falling-block puzzle engine with a terminal front end.
//!
//! The `core` module is the engine proper: grid, shape catalog, rotation, and
//! the timed-descent session state machine. It is headless and deterministic;
//! rendering and timing are injected through the traits in [`io`]. The `term`
//! and `input` modules plus the binary wrap it in a crossterm host.

pub mod core;
pub mod input;
pub mod io;
pub mod term;
pub mod types;
