//! Bounded worker pool for fitness evaluation.
//!
//! Every job of a batch is its own rayon task; the batch returns once every
//! job has finished, which is the barrier between evaluation and breeding.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::compute::GridError;
use crate::schema::Rule;

use super::fitness::FitnessEvaluator;

/// Dedicated rayon pool sized by the `workers` setting.
pub struct EvaluationScheduler {
    pool: ThreadPool,
}

impl EvaluationScheduler {
    /// Build a pool with `workers` threads (0 = one per logical CPU).
    pub fn new(workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ca-eval-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job(0..jobs)` on the pool and return results in index order.
    pub fn run<T, F>(&self, jobs: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        self.pool
            .install(|| (0..jobs).into_par_iter().with_max_len(1).map(&job).collect())
    }

    /// Score every rule. `seeds[i]` seeds the private RNG of job `i`, so the
    /// scores do not depend on which worker ran which job.
    pub fn evaluate(
        &self,
        evaluator: &FitnessEvaluator,
        rules: &[Rule],
        seeds: &[u64],
    ) -> Vec<Result<f64, GridError>> {
        debug_assert_eq!(rules.len(), seeds.len());
        self.run(rules.len().min(seeds.len()), |index| {
            let mut rng = StdRng::seed_from_u64(seeds[index]);
            evaluator.evaluate(&rules[index], &mut rng)
        })
    }
}
