//! Compute module - Grid stepping, simulation runs and rule search.

mod grid;
mod simulation;

pub mod evolution;

pub use grid::*;
pub use simulation::*;
