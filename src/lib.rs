//! CA rule search - Genetic discovery of birth/survival cellular automata.
//!
//! This crate simulates two-state cellular automata on a toroidal grid under
//! `B<births>/S<survivals>` rules and searches the rule space with a genetic
//! algorithm, scoring every candidate by a full simulation run.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Rules, seeding procedures and search configuration
//! - `compute`: Grid stepping, simulation runs, fitness scoring and the search engine
//!
//! # Example
//!
//! ```rust,no_run
//! use ca_rule_search::{
//!     schema::{Rule, Seed},
//!     compute::{Simulation, SimulationStats},
//! };
//! use rand::SeedableRng;
//!
//! let rule: Rule = "B3/S23".parse().expect("valid rule");
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut sim = Simulation::seeded(rule, 32, 32, &Seed::default(), &mut rng)
//!     .expect("valid grid");
//!
//! let series = sim.live_count_series(100);
//! let stats = SimulationStats::from_simulation(&sim);
//! println!("{} live cells after {} generations", stats.live_cells, series.len() - 1);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::EvolutionEngine;
pub use compute::{Grid, Simulation, SimulationStats};
pub use schema::{EvolutionConfig, FitnessStrategy, Rule, Seed};
