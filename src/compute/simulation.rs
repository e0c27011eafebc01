//! Simulation driver - advances one grid under one rule.
//!
//! Holds a current and a next buffer that are swapped after every step, so no
//! cell update ever reads a neighbor from the generation being written.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::{Rule, Seed};

use super::{Grid, GridError};

/// A single cellular automaton run.
#[derive(Debug, Clone)]
pub struct Simulation {
    rule: Rule,
    current: Grid,
    /// Scratch buffer for the next generation (reused each step).
    next: Grid,
    generation: u64,
}

impl Simulation {
    /// Start a run from an explicit grid.
    pub fn new(rule: Rule, grid: Grid) -> Self {
        let next = grid.clone();
        Self {
            rule,
            current: grid,
            next,
            generation: 0,
        }
    }

    /// Start a run on a fresh grid initialized by `seed`.
    pub fn seeded<R: Rng + ?Sized>(
        rule: Rule,
        rows: usize,
        cols: usize,
        seed: &Seed,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(rows, cols)?;
        grid.seed(seed, rng)?;
        Ok(Self::new(rule, grid))
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The current generation's grid.
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    /// Number of steps taken so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        self.current.step_into(&self.rule, &mut self.next);
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
    }

    /// Advance `steps` generations.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Advance `steps` generations, calling `observe(index, previous, current)`
    /// after each one. `index` counts from 0 within this call.
    pub fn run_observed<F>(&mut self, steps: usize, mut observe: F)
    where
        F: FnMut(usize, &Grid, &Grid),
    {
        for index in 0..steps {
            self.step();
            observe(index, &self.next, &self.current);
        }
    }

    /// Live-cell count of the current grid followed by the count after each
    /// of `steps` further generations.
    pub fn live_count_series(&mut self, steps: usize) -> Vec<usize> {
        let mut series = Vec::with_capacity(steps + 1);
        series.push(self.current.live_count());
        self.run_observed(steps, |_, _, current| series.push(current.live_count()));
        series
    }

    /// Read-only matrix view of the current grid.
    pub fn snapshot(&self) -> Vec<Vec<bool>> {
        self.current.snapshot()
    }
}

/// Summary of a simulation's current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub generation: u64,
    pub live_cells: usize,
    pub dead_cells: usize,
    /// Fraction of live cells.
    pub density: f64,
}

impl SimulationStats {
    pub fn from_simulation(sim: &Simulation) -> Self {
        let grid = sim.grid();
        let (live_cells, dead_cells) = grid.count_live_dead();
        Self {
            generation: sim.generation(),
            live_cells,
            dead_cells,
            density: live_cells as f64 / grid.area() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::grid::grid_from_pattern;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_live_count_series_extinction() {
        let grid = grid_from_pattern(&["...", ".#.", "..."]);
        let mut sim = Simulation::new(Rule::game_of_life(), grid);
        assert_eq!(sim.live_count_series(3), vec![1, 0, 0, 0]);
        assert_eq!(sim.generation(), 3);
    }

    #[test]
    fn test_run_observed_sees_consecutive_generations() {
        let grid = grid_from_pattern(&[".....", "..#..", "..#..", "..#..", "....."]);
        let rule = Rule::game_of_life();
        let mut expected_prev = grid.clone();
        let mut sim = Simulation::new(rule, grid);

        let mut seen = Vec::new();
        sim.run_observed(4, |index, prev, current| {
            assert_eq!(prev, &expected_prev);
            assert_eq!(current, &prev.step(&rule));
            expected_prev = current.clone();
            seen.push(index);
        });
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_seeded_center() {
        let mut rng = StdRng::seed_from_u64(0);
        let sim = Simulation::seeded(Rule::game_of_life(), 11, 11, &Seed::Center, &mut rng).unwrap();
        let stats = SimulationStats::from_simulation(&sim);
        assert_eq!(stats.live_cells, 1);
        assert_eq!(stats.dead_cells, 120);
        assert!(sim.grid().get(5, 5));
    }

    #[test]
    fn test_seeded_rejects_bad_probability() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = Simulation::seeded(
            Rule::game_of_life(),
            4,
            4,
            &Seed::Random { probability: -0.1 },
            &mut rng,
        );
        assert!(matches!(result, Err(GridError::InvalidProbability(_))));
    }

    #[test]
    fn test_still_life_is_stable() {
        let block = grid_from_pattern(&["......", ".##...", ".##...", "......"]);
        let mut sim = Simulation::new(Rule::game_of_life(), block.clone());
        sim.run(10);
        assert_eq!(sim.grid(), &block);
        assert_eq!(sim.snapshot(), block.snapshot());
    }
}
