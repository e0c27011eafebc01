//! CA rule search CLI - Run a genetic rule search from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;

use ca_rule_search::{
    compute::{Simulation, SimulationStats, evolution::EvolutionEngine},
    schema::{EvolutionConfig, Rule, Seed},
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Generations simulated by `--simulate` when none are given.
const DEFAULT_SIMULATE_GENERATIONS: usize = 50;
/// Grid side used by `--simulate`.
const SIMULATE_GRID_SIZE: usize = 11;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprint!("{}", usage(&args[0]));
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example_config(),
        "--simulate" => {
            let Some(descriptor) = args.get(2) else {
                eprintln!("Missing rule for --simulate");
                std::process::exit(1);
            };
            let generations = args
                .get(3)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SIMULATE_GENERATIONS);
            simulate(descriptor, generations);
        }
        path => search(PathBuf::from(path)),
    }
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <config.json>
       {program} --simulate <rule> [generations]
       {program} --example

Search birth/survival rules with a genetic algorithm.

Arguments:
  config.json  Path to search configuration file
  rule         Rule descriptor, e.g. B3/S23
  generations  Generations to simulate (default: {DEFAULT_SIMULATE_GENERATIONS})

--example prints the default configuration as JSON.
"
    )
}

fn search(config_path: PathBuf) {
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("CA Rule Search");
    println!("==============");
    println!("Grid: {}x{}", config.rows, config.cols);
    println!(
        "Population: {} x {} generations",
        config.population_size, config.ga_generations
    );
    println!("CA generations: {}", config.ca_generations);
    println!("Fitness: {}", config.fitness_strategy);
    println!("Selection: {:?}", config.selection);
    println!("Mutation rate: {}", config.mutation_rate);
    println!();

    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let result = engine.run_with_callback(|progress| {
        println!(
            "  Generation {}/{}: best={} ({}), avg={:.3}",
            progress.generation + 1,
            progress.total_generations,
            progress.generation_best.score,
            progress.generation_best.rule,
            progress.avg_score
        );
    });

    println!();
    println!("Best rule: {} (score {})", result.best_rule, result.best_score);
    println!(
        "Best ever: {} (score {})",
        result.best_ever.rule, result.best_ever.score
    );
    println!(
        "Time: {:.2}s ({} evaluations, {:.1} evals/s, {:?})",
        result.stats.elapsed_seconds,
        result.stats.total_evaluations,
        result.stats.evaluations_per_second,
        result.stats.stop_reason
    );
}

fn simulate(descriptor: &str, generations: usize) {
    let rule = Rule::parse(descriptor).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut rng = StdRng::from_entropy();
    let mut sim = Simulation::seeded(
        rule,
        SIMULATE_GRID_SIZE,
        SIMULATE_GRID_SIZE,
        &Seed::Center,
        &mut rng,
    )
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let series = sim.live_count_series(generations);
    let stats = SimulationStats::from_simulation(&sim);

    println!("Rule: {}", rule);
    println!("Live cells per generation:");
    for (generation, live) in series.iter().enumerate() {
        println!("  {:>4}: {}", generation, live);
    }
    println!();
    println!(
        "Final: {} live, {} dead ({:.1}%)",
        stats.live_cells,
        stats.dead_cells,
        stats.density * 100.0
    );
    print!("{}", sim.grid());
}

fn print_example_config() {
    let config = EvolutionConfig::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => {
            println!("Example configuration (config.json):");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_lists_every_mode() {
        let text = usage("ca-rule-search");
        assert!(text.contains("ca-rule-search <config.json>"));
        assert!(text.contains("ca-rule-search --simulate <rule> [generations]"));
        assert!(text.contains("ca-rule-search --example"));
        assert!(text.contains("(default: 50)"));
    }
}
