//! Evolution configuration types for automated rule discovery.
//!
//! This module provides the configuration of the genetic search over
//! birth/survival rules and the progress/result types it reports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_SEED_PROBABILITY, Rule, Seed};

/// Top-level configuration for a genetic rule search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Grid height in cells.
    #[serde(default = "default_grid_size")]
    pub rows: usize,
    /// Grid width in cells.
    #[serde(default = "default_grid_size")]
    pub cols: usize,
    /// Number of individuals per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Probability (0.0-1.0) that an offspring is mutated.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// CA generations simulated per fitness evaluation.
    #[serde(default = "default_ca_generations")]
    pub ca_generations: usize,
    /// Parent selection method.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Objective optimized by the search.
    #[serde(default)]
    pub fitness_strategy: FitnessStrategy,
    /// Number of GA generations to run.
    #[serde(default = "default_ga_generations")]
    pub ga_generations: usize,
    /// Live-cell probability for randomly seeded strategies.
    #[serde(default = "default_seed_probability")]
    pub seed_probability: f64,
    /// Evaluation worker threads (0 = one per logical CPU).
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Descriptors seeding the first population; the rest is random.
    #[serde(default)]
    pub initial_rules: Vec<String>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            rows: default_grid_size(),
            cols: default_grid_size(),
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            ca_generations: default_ca_generations(),
            selection: SelectionMethod::default(),
            fitness_strategy: FitnessStrategy::default(),
            ga_generations: default_ga_generations(),
            seed_probability: default_seed_probability(),
            workers: default_workers(),
            random_seed: None,
            initial_rules: Vec::new(),
        }
    }
}

fn default_grid_size() -> usize {
    11
}
fn default_population_size() -> usize {
    20
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_ca_generations() -> usize {
    50
}
fn default_ga_generations() -> usize {
    20
}
fn default_seed_probability() -> f64 {
    DEFAULT_SEED_PROBABILITY
}
fn default_workers() -> usize {
    10
}

/// Selection method for the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum SelectionMethod {
    /// Best of `size` individuals sampled without replacement.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
    /// Fitness-proportionate selection with replacement.
    Roulette,
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::Tournament {
            size: default_tournament_size(),
        }
    }
}

fn default_tournament_size() -> usize {
    2
}

fn default_divergence_window() -> usize {
    25
}
fn default_checkerboard_window() -> usize {
    20
}

/// Objective function for a search run.
///
/// Every strategy simulates the full configured number of CA generations
/// from its own initial condition and reduces the run to one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum FitnessStrategy {
    /// Sparse but alive: `10000 / min live count`, 0 after any extinction.
    /// Random seed.
    MinimizeLivingCount {
        /// Trailing generations observed (None = whole run).
        window: Option<usize>,
    },

    /// Cell flips between consecutive generations over a trailing window.
    /// Random seed.
    MaximizeDivergence { window: usize },

    /// Flips, mirror symmetry and density minus a penalty for repeated states.
    /// Centered seed.
    SymmetryAndComplexity,

    /// 2x2 blocks matching a checkerboard tile over a trailing window.
    /// Centered seed.
    CheckerboardPattern { window: usize },

    /// Agreement of the final grid with a parity checkerboard.
    /// Centered seed.
    GlobalCheckerboard,

    /// Product of neighborhood clustering, change and row-shift structure.
    /// Centered seed.
    CarpetStructure,

    /// Complexity times quadrant symmetry times density over mirror asymmetry.
    /// Centered seed.
    CarpetSymmetry,

    /// Total live cells over the run. Random seed.
    MaxTotalCount,

    /// Reciprocal of total live cells over the run. Random seed.
    MinTotalCount,
}

impl Default for FitnessStrategy {
    fn default() -> Self {
        Self::SymmetryAndComplexity
    }
}

impl FitnessStrategy {
    /// Every strategy with default parameters.
    pub fn all() -> [FitnessStrategy; 9] {
        [
            FitnessStrategy::MinimizeLivingCount { window: None },
            FitnessStrategy::MaximizeDivergence {
                window: default_divergence_window(),
            },
            FitnessStrategy::SymmetryAndComplexity,
            FitnessStrategy::CheckerboardPattern {
                window: default_checkerboard_window(),
            },
            FitnessStrategy::GlobalCheckerboard,
            FitnessStrategy::CarpetStructure,
            FitnessStrategy::CarpetSymmetry,
            FitnessStrategy::MaxTotalCount,
            FitnessStrategy::MinTotalCount,
        ]
    }

    /// Variant name.
    pub fn name(&self) -> &'static str {
        match self {
            FitnessStrategy::MinimizeLivingCount { .. } => "MinimizeLivingCount",
            FitnessStrategy::MaximizeDivergence { .. } => "MaximizeDivergence",
            FitnessStrategy::SymmetryAndComplexity => "SymmetryAndComplexity",
            FitnessStrategy::CheckerboardPattern { .. } => "CheckerboardPattern",
            FitnessStrategy::GlobalCheckerboard => "GlobalCheckerboard",
            FitnessStrategy::CarpetStructure => "CarpetStructure",
            FitnessStrategy::CarpetSymmetry => "CarpetSymmetry",
            FitnessStrategy::MaxTotalCount => "MaxTotalCount",
            FitnessStrategy::MinTotalCount => "MinTotalCount",
        }
    }

    /// Initial condition used by this strategy.
    pub fn seed(&self, probability: f64) -> Seed {
        match self {
            FitnessStrategy::MinimizeLivingCount { .. }
            | FitnessStrategy::MaximizeDivergence { .. }
            | FitnessStrategy::MaxTotalCount
            | FitnessStrategy::MinTotalCount => Seed::Random { probability },
            FitnessStrategy::SymmetryAndComplexity
            | FitnessStrategy::CheckerboardPattern { .. }
            | FitnessStrategy::GlobalCheckerboard
            | FitnessStrategy::CarpetStructure
            | FitnessStrategy::CarpetSymmetry => Seed::Center,
        }
    }

    /// Trailing window size, if the strategy has one.
    pub fn window(&self) -> Option<usize> {
        match *self {
            FitnessStrategy::MinimizeLivingCount { window } => window,
            FitnessStrategy::MaximizeDivergence { window }
            | FitnessStrategy::CheckerboardPattern { window } => Some(window),
            _ => None,
        }
    }
}

impl fmt::Display for FitnessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitnessStrategy {
    type Err = String;

    /// Parse a variant name or short alias, using default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "min" => "MinimizeLivingCount",
            "div" => "MaximizeDivergence",
            "sym" => "SymmetryAndComplexity",
            "alt" => "GlobalCheckerboard",
            "checker" => "CheckerboardPattern",
            "carpet" => "CarpetStructure",
            "carpet_alt" => "CarpetSymmetry",
            "max_count" => "MaxTotalCount",
            "min_count" => "MinTotalCount",
            other => other,
        };
        Self::all()
            .into_iter()
            .find(|strategy| strategy.name() == name)
            .ok_or_else(|| format!("Unknown fitness strategy: {s}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum FitnessStrategyTagged {
    MinimizeLivingCount {
        #[serde(default)]
        window: Option<usize>,
    },
    MaximizeDivergence {
        #[serde(default = "default_divergence_window")]
        window: usize,
    },
    SymmetryAndComplexity,
    CheckerboardPattern {
        #[serde(default = "default_checkerboard_window")]
        window: usize,
    },
    GlobalCheckerboard,
    CarpetStructure,
    CarpetSymmetry,
    MaxTotalCount,
    MinTotalCount,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FitnessStrategyRepr {
    String(String),
    Tagged(FitnessStrategyTagged),
}

impl<'de> Deserialize<'de> for FitnessStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = FitnessStrategyRepr::deserialize(deserializer)?;
        match repr {
            FitnessStrategyRepr::String(value) => value.parse().map_err(serde::de::Error::custom),
            FitnessStrategyRepr::Tagged(tagged) => Ok(match tagged {
                FitnessStrategyTagged::MinimizeLivingCount { window } => {
                    FitnessStrategy::MinimizeLivingCount { window }
                }
                FitnessStrategyTagged::MaximizeDivergence { window } => {
                    FitnessStrategy::MaximizeDivergence { window }
                }
                FitnessStrategyTagged::SymmetryAndComplexity => {
                    FitnessStrategy::SymmetryAndComplexity
                }
                FitnessStrategyTagged::CheckerboardPattern { window } => {
                    FitnessStrategy::CheckerboardPattern { window }
                }
                FitnessStrategyTagged::GlobalCheckerboard => FitnessStrategy::GlobalCheckerboard,
                FitnessStrategyTagged::CarpetStructure => FitnessStrategy::CarpetStructure,
                FitnessStrategyTagged::CarpetSymmetry => FitnessStrategy::CarpetSymmetry,
                FitnessStrategyTagged::MaxTotalCount => FitnessStrategy::MaxTotalCount,
                FitnessStrategyTagged::MinTotalCount => FitnessStrategy::MinTotalCount,
            }),
        }
    }
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// A rule paired with its fitness score for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredRule {
    pub rule: Rule,
    pub score: f64,
}

/// Statistics recorded for one evaluated GA generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Zero-based GA generation index.
    pub generation: usize,
    /// Highest score in the generation.
    pub best_score: f64,
    /// Rule achieving the highest score.
    pub best_rule: Rule,
    /// Mean score of the generation.
    pub avg_score: f64,
}

/// Evolution history for plotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionHistory {
    pub records: Vec<GenerationRecord>,
}

impl EvolutionHistory {
    /// `(generation_index, best_score)` pairs in order.
    pub fn best_scores(&self) -> Vec<(usize, f64)> {
        self.records
            .iter()
            .map(|r| (r.generation, r.best_score))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Progress update emitted after every evaluated generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Zero-based index of the generation just evaluated.
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Best individual of this generation.
    pub generation_best: ScoredRule,
    /// Best individual seen so far.
    pub best_ever: ScoredRule,
    /// Mean score of this generation.
    pub avg_score: f64,
    /// Evaluations completed so far in the run.
    pub evaluations_completed: u64,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best individual of the last evaluated generation.
    pub best_rule: Rule,
    /// Score of `best_rule` in that generation.
    pub best_score: f64,
    /// Best individual over the whole run.
    pub best_ever: ScoredRule,
    /// Per-generation statistics.
    pub history: EvolutionHistory,
    /// Run statistics.
    pub stats: EvolutionStats,
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// GA generations evaluated.
    pub generations: usize,
    /// Total fitness evaluations performed.
    pub total_evaluations: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran the configured number of generations.
    MaxGenerations,
    /// Cancelled through the engine's cancel handle.
    Cancelled,
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Grid dimensions (rows, cols) must be non-zero")]
    InvalidDimensions,
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Mutation rate {0} must be within [0, 1]")]
    InvalidMutationRate(f64),
    #[error("Seed probability {0} must be within [0, 1]")]
    InvalidSeedProbability(f64),
    #[error("CA generations per evaluation must be positive")]
    InvalidSteps,
    #[error("GA generations must be positive")]
    InvalidGenerations,
    #[error("Tournament size must be positive")]
    InvalidTournamentSize,
    #[error("Fitness window for {0} must be positive")]
    InvalidWindow(&'static str),
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EvolutionConfigError::InvalidDimensions);
        }
        if self.population_size < 2 {
            return Err(EvolutionConfigError::PopulationTooSmall);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvolutionConfigError::InvalidMutationRate(
                self.mutation_rate,
            ));
        }
        if !(0.0..=1.0).contains(&self.seed_probability) {
            return Err(EvolutionConfigError::InvalidSeedProbability(
                self.seed_probability,
            ));
        }
        if self.ca_generations == 0 {
            return Err(EvolutionConfigError::InvalidSteps);
        }
        if self.ga_generations == 0 {
            return Err(EvolutionConfigError::InvalidGenerations);
        }
        if let SelectionMethod::Tournament { size: 0 } = self.selection {
            return Err(EvolutionConfigError::InvalidTournamentSize);
        }
        if self.fitness_strategy.window() == Some(0) {
            return Err(EvolutionConfigError::InvalidWindow(
                self.fitness_strategy.name(),
            ));
        }
        Ok(())
    }

    /// Initial condition for every evaluation of this run.
    pub fn seed(&self) -> Seed {
        self.fitness_strategy.seed(self.seed_probability)
    }
}
