//! Seed types for initializing cellular automaton grids.

use serde::{Deserialize, Serialize};

/// Default probability of a cell starting alive in a random seed.
pub const DEFAULT_SEED_PROBABILITY: f64 = 0.3;

/// Initial condition for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Seed {
    /// Each cell alive independently with the given probability.
    Random {
        /// Probability in [0, 1].
        probability: f64,
    },
    /// A single live cell at `(rows / 2, cols / 2)`.
    Center,
}

impl Default for Seed {
    fn default() -> Self {
        Self::Random {
            probability: DEFAULT_SEED_PROBABILITY,
        }
    }
}
