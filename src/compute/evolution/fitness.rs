//! Fitness strategy implementations for evolutionary rule search.
//!
//! Each strategy seeds its own grid, simulates the full run and reduces the
//! trajectory to one score. A run of `N` generations observes the states
//! produced by steps `0..N`; strategies with a trailing window of `k` only
//! score steps `N-k..N`, but every earlier step is still simulated.

use std::collections::HashSet;

use rand::Rng;

use crate::compute::{Grid, GridError, Simulation};
use crate::schema::{EvolutionConfig, FitnessStrategy, Rule, Seed};

/// Penalty for every repeated grid state in `SymmetryAndComplexity`.
const CYCLE_PENALTY: f64 = 50.0;
/// Numerator of the `MinimizeLivingCount` score.
const SPARSITY_NUMERATOR: usize = 10_000;
/// Divisor turning checkerboard block matches into a score.
const CHECKERBOARD_DIVISOR: f64 = 10.0;
/// Scale applied to the `CarpetStructure` product.
const CARPET_STRUCTURE_SCALE: f64 = 1000.0;
/// Divisor applied to the `CarpetSymmetry` product.
const CARPET_SYMMETRY_DIVISOR: f64 = 1000.0;
/// Numerator of the `MinTotalCount` score.
const RECIPROCAL_NUMERATOR: f64 = 1000.0;

/// Runs one strategy against candidate rules.
///
/// Strategies score the states after each step; the seed state itself is never scored.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    strategy: FitnessStrategy,
    rows: usize,
    cols: usize,
    generations: usize,
    seed: Seed,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(
        strategy: FitnessStrategy,
        rows: usize,
        cols: usize,
        generations: usize,
        seed_probability: f64,
    ) -> Self {
        Self {
            strategy,
            rows,
            cols,
            generations,
            seed: strategy.seed(seed_probability),
        }
    }

    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            strategy: config.fitness_strategy,
            rows: config.rows,
            cols: config.cols,
            generations: config.ca_generations,
            seed: config.seed(),
        }
    }

    pub fn strategy(&self) -> FitnessStrategy {
        self.strategy
    }

    /// Seed a fresh grid with the strategy's initial condition and score the run.
    pub fn evaluate<R: Rng + ?Sized>(&self, rule: &Rule, rng: &mut R) -> Result<f64, GridError> {
        let sim = Simulation::seeded(*rule, self.rows, self.cols, &self.seed, rng)?;
        Ok(self.score(sim))
    }

    /// Score a run from an already initialized simulation.
    pub fn score(&self, mut sim: Simulation) -> f64 {
        let n = self.generations;
        match self.strategy {
            FitnessStrategy::MinimizeLivingCount { window } => {
                minimize_living_count(&mut sim, n, window.unwrap_or(n))
            }
            FitnessStrategy::MaximizeDivergence { window } => {
                maximize_divergence(&mut sim, n, window)
            }
            FitnessStrategy::SymmetryAndComplexity => symmetry_and_complexity(&mut sim, n),
            FitnessStrategy::CheckerboardPattern { window } => {
                checkerboard_pattern(&mut sim, n, window)
            }
            FitnessStrategy::GlobalCheckerboard => global_checkerboard(&mut sim, n),
            FitnessStrategy::CarpetStructure => carpet_structure(&mut sim, n),
            FitnessStrategy::CarpetSymmetry => carpet_symmetry(&mut sim, n),
            FitnessStrategy::MaxTotalCount => total_live_count(&mut sim, n) as f64,
            FitnessStrategy::MinTotalCount => {
                let total = total_live_count(&mut sim, n);
                if total == 0 {
                    0.0
                } else {
                    RECIPROCAL_NUMERATOR / total as f64
                }
            }
        }
    }
}

/// First step index inside a trailing window of `window` steps.
#[inline]
fn window_start(generations: usize, window: usize) -> usize {
    generations.saturating_sub(window)
}

/// `floor(10000 / min live count)` over the window, or 0 if any windowed
/// generation is empty.
fn minimize_living_count(sim: &mut Simulation, generations: usize, window: usize) -> f64 {
    let start = window_start(generations, window);
    let mut min_live: Option<usize> = None;
    let mut extinct = false;

    sim.run_observed(generations, |step, _, current| {
        if step < start {
            return;
        }
        match current.live_count() {
            0 => extinct = true,
            live => min_live = Some(min_live.map_or(live, |m| m.min(live))),
        }
    });

    match min_live {
        Some(min) if !extinct => (SPARSITY_NUMERATOR / min) as f64,
        _ => 0.0,
    }
}

/// Cells flipped between consecutive generations, summed over the window.
fn maximize_divergence(sim: &mut Simulation, generations: usize, window: usize) -> f64 {
    let start = window_start(generations, window);
    let mut flips = 0usize;
    sim.run_observed(generations, |step, prev, current| {
        if step >= start {
            flips += prev.diff_count(current);
        }
    });
    flips as f64
}

fn symmetry_and_complexity(sim: &mut Simulation, generations: usize) -> f64 {
    let rows = sim.grid().rows() as f64;
    let area = sim.grid().area() as f64;

    let mut seen: HashSet<Grid> = HashSet::new();
    seen.insert(sim.grid().clone());

    let mut complexity = 0.0;
    let mut pattern = 0.0;
    let mut density = 0.0;
    let mut diversity = 0.0;
    let mut penalty = 0.0;

    sim.run_observed(generations, |_, prev, current| {
        if !seen.insert(current.clone()) {
            penalty += CYCLE_PENALTY;
        }

        complexity += prev.diff_count(current) as f64;

        let asymmetry = (current.mirror_mismatch_lr() + current.mirror_mismatch_ud()) as f64;
        pattern += (area - asymmetry) / area;

        let live = current.live_count();
        density += live as f64 / area;
        // Distinct cell values present: 1 for uniform grids, otherwise 2
        diversity += if live == 0 || live == current.area() {
            1.0
        } else {
            2.0
        };
    });

    let total = complexity + pattern + density * diversity - penalty;
    let normalizer = 10.0 + 0.1 * (rows - 11.0).powi(2);
    (total / normalizer).floor().max(0.0)
}

/// Whether the 2x2 block with top-left corner `(r, c)` is a checkerboard tile.
#[inline]
fn is_checker_tile(grid: &Grid, r: usize, c: usize) -> bool {
    let a = grid.get(r, c);
    let b = grid.get(r, c + 1);
    let d = grid.get(r + 1, c);
    let e = grid.get(r + 1, c + 1);
    a == e && b == d && a != b
}

fn checkerboard_pattern(sim: &mut Simulation, generations: usize, window: usize) -> f64 {
    let start = window_start(generations, window);
    let mut matches = 0usize;

    sim.run_observed(generations, |step, _, current| {
        if step < start {
            return;
        }
        for r in 0..current.rows().saturating_sub(1) {
            for c in 0..current.cols().saturating_sub(1) {
                if is_checker_tile(current, r, c) {
                    matches += 1;
                }
            }
        }
    });

    matches as f64 / CHECKERBOARD_DIVISOR
}

/// `(max(match1, match2) / area - 0.5) * 100` on the final grid, where the
/// matches count agreement with the two parity checkerboards.
fn global_checkerboard(sim: &mut Simulation, generations: usize) -> f64 {
    sim.run(generations);
    let grid = sim.grid();

    let odd_parity = (0..grid.rows())
        .flat_map(|r| (0..grid.cols()).map(move |c| (r, c)))
        .filter(|&(r, c)| grid.get(r, c) == ((r + c) % 2 == 1))
        .count();
    let best = odd_parity.max(grid.area() - odd_parity);

    (best as f64 / grid.area() as f64 - 0.5) * 100.0
}

fn carpet_structure(sim: &mut Simulation, generations: usize) -> f64 {
    if generations == 0 {
        return 0.0;
    }

    let mut clustering = 0usize;
    let mut change = 0usize;
    let mut shift = 0usize;

    sim.run_observed(generations, |_, prev, current| {
        change += prev.diff_count(current);
        for r in 0..current.rows() {
            for c in 0..current.cols() {
                let alive = current.get(r, c);
                if alive {
                    clustering += current.neighbor_count(r, c);
                }
                // Compare against the row above shifted by one column
                if alive != current.get_wrapped(r as isize - 1, c as isize - 1) {
                    shift += 1;
                }
            }
        }
    });

    let norm = (generations * sim.grid().area()) as f64;
    let clustering = clustering as f64 / (norm * 8.0);
    let change = change as f64 / norm;
    let shift = shift as f64 / norm;

    CARPET_STRUCTURE_SCALE * clustering * change * shift
}

/// Live cells whose reflections across both axes and the center are all live.
fn quadrant_matches(grid: &Grid) -> usize {
    let (rows, cols) = (grid.rows(), grid.cols());
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .filter(|&(r, c)| {
            grid.get(r, c)
                && grid.get(rows - 1 - r, c)
                && grid.get(r, cols - 1 - c)
                && grid.get(rows - 1 - r, cols - 1 - c)
        })
        .count()
}

fn carpet_symmetry(sim: &mut Simulation, generations: usize) -> f64 {
    if generations == 0 {
        return 0.0;
    }

    let mut complexity = 0usize;
    let mut quadrant = 0usize;
    let mut live = 0usize;
    let mut asymmetry = 0usize;

    sim.run_observed(generations, |_, prev, current| {
        complexity += prev.diff_count(current);
        quadrant += quadrant_matches(current);
        live += current.live_count();
        asymmetry += current.mirror_mismatch_lr() + current.mirror_mismatch_ud();
    });

    let density = live as f64 / (generations * sim.grid().area()) as f64;
    complexity as f64 * quadrant as f64 * density
        / (asymmetry as f64 + 1.0)
        / CARPET_SYMMETRY_DIVISOR
}

fn total_live_count(sim: &mut Simulation, generations: usize) -> usize {
    let mut total = 0usize;
    sim.run_observed(generations, |_, _, current| total += current.live_count());
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::grid::grid_from_pattern;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn evaluator(strategy: FitnessStrategy, size: usize, generations: usize) -> FitnessEvaluator {
        FitnessEvaluator::new(strategy, size, size, generations, 0.3)
    }

    fn lonely_center() -> Simulation {
        Simulation::new(
            Rule::game_of_life(),
            grid_from_pattern(&["...", ".#.", "..."]),
        )
    }

    fn blinker() -> Simulation {
        Simulation::new(
            Rule::game_of_life(),
            grid_from_pattern(&[".....", "..#..", "..#..", "..#..", "....."]),
        )
    }

    /// Checkerboard is a still life under B3/S4 on an even torus.
    fn stable_checkerboard() -> Simulation {
        Simulation::new(
            Rule::parse("B3/S4").unwrap(),
            grid_from_pattern(&["#.#.", ".#.#", "#.#.", ".#.#"]),
        )
    }

    #[test]
    fn test_min_living_extinction_scores_zero() {
        let strategy = FitnessStrategy::MinimizeLivingCount { window: None };
        assert_eq!(evaluator(strategy, 3, 10).score(lonely_center()), 0.0);

        let windowed = FitnessStrategy::MinimizeLivingCount { window: Some(1) };
        assert_eq!(evaluator(windowed, 3, 10).score(lonely_center()), 0.0);
    }

    #[test]
    fn test_min_living_still_life() {
        let block = Simulation::new(
            Rule::game_of_life(),
            grid_from_pattern(&["......", ".##...", ".##...", "......", "......", "......"]),
        );
        let strategy = FitnessStrategy::MinimizeLivingCount { window: None };
        assert_eq!(evaluator(strategy, 6, 10).score(block), 2500.0);
    }

    #[test]
    fn test_min_living_extinct_random_seed() {
        // An empty seed stays empty under a rule without B0
        let eval = FitnessEvaluator::new(
            FitnessStrategy::MinimizeLivingCount { window: None },
            8,
            8,
            10,
            0.0,
        );
        let score = eval
            .evaluate(&Rule::game_of_life(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_divergence_blinker() {
        // Each blinker phase change flips four cells
        let full = FitnessStrategy::MaximizeDivergence { window: 25 };
        assert_eq!(evaluator(full, 5, 10).score(blinker()), 40.0);

        let windowed = FitnessStrategy::MaximizeDivergence { window: 3 };
        assert_eq!(evaluator(windowed, 5, 10).score(blinker()), 12.0);

        assert_eq!(evaluator(full, 4, 10).score(stable_checkerboard()), 0.0);
    }

    #[test]
    fn test_symmetry_penalizes_cycles() {
        let eval = evaluator(FitnessStrategy::SymmetryAndComplexity, 3, 3);
        assert_eq!(eval.score(lonely_center()), 0.0);
    }

    #[test]
    fn test_symmetry_rewards_growth() {
        // Nothing dies and the diagonals keep growing, so no state repeats
        let rule = Rule::parse("B1/S012345678").unwrap();
        let eval = evaluator(FitnessStrategy::SymmetryAndComplexity, 11, 5);
        let score = eval
            .evaluate(&rule, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(score >= 1.0, "score {score}");
        assert_eq!(score.fract(), 0.0);
    }

    #[test]
    fn test_checkerboard_blocks() {
        // 9 tiles per generation on a 4x4 grid, 2 windowed generations
        let strategy = FitnessStrategy::CheckerboardPattern { window: 2 };
        let score = evaluator(strategy, 4, 5).score(stable_checkerboard());
        assert!((score - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_global_checkerboard() {
        let eval = evaluator(FitnessStrategy::GlobalCheckerboard, 4, 5);
        assert!((eval.score(stable_checkerboard()) - 50.0).abs() < 1e-9);

        // An empty grid matches exactly half of either parity
        assert!(eval.score(Simulation::new(Rule::game_of_life(), Grid::new(4, 4).unwrap())).abs() < 1e-9);
    }

    #[test]
    fn test_carpet_structure() {
        let eval = evaluator(FitnessStrategy::CarpetStructure, 5, 4);
        assert!(eval.score(blinker()) > 0.0);
        assert_eq!(eval.score(stable_checkerboard()), 0.0);
        assert_eq!(evaluator(FitnessStrategy::CarpetStructure, 3, 4).score(lonely_center()), 0.0);
    }

    #[test]
    fn test_carpet_symmetry_blinker() {
        // 4 flips, 3 quadrant matches and 3 live cells per generation, no asymmetry
        let eval = evaluator(FitnessStrategy::CarpetSymmetry, 5, 4);
        let expected = 16.0 * 12.0 * (12.0 / 100.0) / 1.0 / 1000.0;
        assert!((eval.score(blinker()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_total_counts() {
        assert_eq!(evaluator(FitnessStrategy::MaxTotalCount, 5, 4).score(blinker()), 12.0);
        let reciprocal = evaluator(FitnessStrategy::MinTotalCount, 5, 4).score(blinker());
        assert!((reciprocal - 1000.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_seed_state_is_not_scored() {
        // The lone seed cell dies on the first step
        let eval = evaluator(FitnessStrategy::MaxTotalCount, 3, 1);
        assert_eq!(eval.score(lonely_center()), 0.0);
    }

    #[test]
    fn test_from_config_uses_strategy_seed() {
        let config = EvolutionConfig {
            fitness_strategy: FitnessStrategy::CarpetStructure,
            ..Default::default()
        };
        let eval = FitnessEvaluator::from_config(&config);
        assert_eq!(eval.seed, Seed::Center);
        assert_eq!(eval.seed, config.seed());
        assert_eq!(eval.generations, config.ca_generations);
    }

    #[test]
    fn test_reciprocal_guards_zero_total() {
        let eval = evaluator(FitnessStrategy::MinTotalCount, 3, 4);
        assert_eq!(eval.score(lonely_center()), 0.0);
    }

    #[test]
    fn test_every_strategy_is_reproducible() {
        let rule = Rule::parse("B36/S23").unwrap();
        for strategy in FitnessStrategy::all() {
            let eval = evaluator(strategy, 12, 30);
            let a = eval.evaluate(&rule, &mut StdRng::seed_from_u64(11)).unwrap();
            let b = eval.evaluate(&rule, &mut StdRng::seed_from_u64(11)).unwrap();
            assert_eq!(a, b, "{strategy}");
            assert!(a.is_finite() && a >= 0.0, "{strategy} gave {a}");
        }
    }

    #[test]
    fn test_invalid_seed_probability_is_an_error() {
        let eval = FitnessEvaluator::new(FitnessStrategy::MaxTotalCount, 4, 4, 5, 2.0);
        let result = eval.evaluate(&Rule::game_of_life(), &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(GridError::InvalidProbability(_))));
    }
}
