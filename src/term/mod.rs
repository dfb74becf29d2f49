//! Terminal front end.
//!
//! A thin crossterm layer: the canvas draws individual well cells on demand
//! instead of re-rendering a frame, which matches the command-style render
//! contract the core emits.

pub mod canvas;

pub use canvas::TerminalCanvas;
