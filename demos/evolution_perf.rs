//! Quick evolution performance test

use ca_rule_search::{
    EvolutionConfig, EvolutionEngine,
    schema::{FitnessStrategy, SelectionMethod},
};
use std::time::Instant;

fn main() {
    println!("=== Evolution Performance Test ===\n");

    // Test different grid sizes
    for grid_size in [11, 32, 64] {
        println!("Grid size: {}x{}", grid_size, grid_size);

        let config = EvolutionConfig {
            rows: grid_size,
            cols: grid_size,
            population_size: 20,
            ga_generations: 10,
            ca_generations: 50,
            mutation_rate: 0.2,
            selection: SelectionMethod::Tournament { size: 3 },
            fitness_strategy: FitnessStrategy::MaximizeDivergence { window: 25 },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = match EvolutionEngine::new(config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("  {}", e);
                continue;
            }
        };
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", result.stats.generations);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best rule:      {} ({})", result.best_ever.rule, result.best_ever.score);
        println!();
    }

    println!("=== Worker Scaling (fixed 32x32 grid) ===\n");

    // Test different pool sizes
    for workers in [1, 2, 4, 10] {
        let config = EvolutionConfig {
            rows: 32,
            cols: 32,
            population_size: 40,
            ga_generations: 5,
            ca_generations: 50,
            workers,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = match EvolutionEngine::new(config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Workers {}: {}", workers, e);
                continue;
            }
        };
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!(
            "Workers {}: {} evals in {:.2}s ({:.1} evals/sec)",
            workers,
            total_evals,
            elapsed.as_secs_f64(),
            evals_per_sec
        );
    }
}
