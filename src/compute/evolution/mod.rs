//! Evolutionary search module for discovering birth/survival rules.
//!
//! # Overview
//!
//! The evolutionary search system consists of:
//!
//! - **Fitness Functions** (`fitness`): One scoring routine per [`FitnessStrategy`]
//! - **Genome Operations** (`genome`): Random rules, crossover, and mutation
//! - **Evaluation Scheduler** (`scheduler`): Bounded worker pool for scoring a generation
//! - **Search** (`search`): The genetic algorithm driving the loop
//!
//! # Example
//!
//! ```rust,no_run
//! use ca_rule_search::schema::{EvolutionConfig, FitnessStrategy};
//! use ca_rule_search::compute::evolution::EvolutionEngine;
//!
//! let config = EvolutionConfig {
//!     fitness_strategy: FitnessStrategy::MaximizeDivergence { window: 25 },
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(config).expect("valid config");
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best = {} ({})",
//!         progress.generation, progress.generation_best.score, progress.generation_best.rule);
//! });
//!
//! println!("Best rule: {} ({})", result.best_rule, result.best_score);
//! ```
//!
//! # Fitness Strategies
//!
//! - `MinimizeLivingCount`: Fewest live cells without ever going extinct
//! - `MaximizeDivergence`: Most cell flips between consecutive generations
//! - `SymmetryAndComplexity`: Change plus mirror symmetry, penalizing cycles
//! - `CheckerboardPattern`: Local 2x2 checkerboard tiles
//! - `GlobalCheckerboard`: Whole-grid checkerboard agreement at the end of the run
//! - `CarpetStructure` / `CarpetSymmetry`: Carpet-like textures
//! - `MaxTotalCount` / `MinTotalCount`: Total live cells over the run
//!
//! [`FitnessStrategy`]: crate::schema::FitnessStrategy

mod fitness;
mod genome;
mod scheduler;
mod search;

pub use fitness::FitnessEvaluator;
pub use genome::GenomeRng;
pub use scheduler::EvaluationScheduler;
pub use search::{Candidate, EngineError, EvolutionEngine};
