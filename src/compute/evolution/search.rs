//! Genetic algorithm over birth/survival rules.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::Rng;
use rand::distributions::WeightedIndex;
use rand::seq::index;

use crate::schema::{
    EvolutionConfig, EvolutionConfigError, EvolutionHistory, EvolutionProgress, EvolutionResult,
    EvolutionStats, GenerationRecord, Rule, ScoredRule, SelectionMethod, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::genome::GenomeRng;
use super::scheduler::EvaluationScheduler;

/// Re-draws of the second tournament winner before a duplicate is accepted.
const MAX_TOURNAMENT_REDRAWS: usize = 64;

/// Errors that prevent an engine from being built.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid evolution config: {0}")]
    Config(#[from] EvolutionConfigError),
    #[error("Failed to build evaluation pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// A candidate individual in the population.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub rule: Rule,
    /// Score from the most recent evaluation (0 until evaluated).
    pub score: f64,
    /// Generation created.
    pub generation: usize,
}

impl Candidate {
    /// Unevaluated individual born in `generation`.
    pub fn new(rule: Rule, generation: usize) -> Self {
        Self {
            rule,
            score: 0.0,
            generation,
        }
    }

    pub fn scored(&self) -> ScoredRule {
        ScoredRule {
            rule: self.rule,
            score: self.score,
        }
    }
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    rng: GenomeRng,
    evaluator: FitnessEvaluator,
    scheduler: EvaluationScheduler,
    population: Vec<Candidate>,
    history: EvolutionHistory,
    generation: usize,
    best_ever: Option<ScoredRule>,
    evaluations: u64,
    cancelled: Arc<AtomicBool>,
}

impl EvolutionEngine {
    /// Create a new evolution engine.
    pub fn new(config: EvolutionConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let scheduler = EvaluationScheduler::new(config.workers)?;
        log::debug!(
            "Evolution engine: seed {seed}, {} workers, strategy {}",
            scheduler.workers(),
            config.fitness_strategy
        );

        Ok(Self {
            rng: GenomeRng::new(seed),
            evaluator: FitnessEvaluator::from_config(&config),
            scheduler,
            config,
            population: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            best_ever: None,
            evaluations: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Current population.
    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    /// Zero-based index of the current generation.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Build the first population from `initial_rules`, filling the rest
    /// with random rules.
    pub fn initialize(&mut self) {
        self.population.clear();
        self.history = EvolutionHistory::default();
        self.generation = 0;
        self.best_ever = None;
        self.evaluations = 0;

        let size = self.config.population_size;
        if self.config.initial_rules.len() > size {
            log::warn!(
                "Ignoring {} initial rules beyond the population size {size}",
                self.config.initial_rules.len() - size
            );
        }

        let mut rules = Vec::with_capacity(size);
        for i in 0..size {
            let rule = match self.config.initial_rules.get(i) {
                Some(descriptor) => match Rule::parse(descriptor) {
                    Ok(rule) => rule,
                    Err(e) => {
                        let replacement = self.rng.random_rule();
                        log::warn!("Replacing initial rule with {replacement}: {e}");
                        replacement
                    }
                },
                None => self.rng.random_rule(),
            };
            rules.push(rule);
        }

        self.population = rules
            .into_iter()
            .map(|rule| Candidate::new(rule, 0))
            .collect();
    }

    /// Evaluate all candidates in the population.
    ///
    /// Per-job seeds are drawn here, in population order, before anything is
    /// dispatched.
    fn evaluate_population(&mut self) {
        let rules: Vec<Rule> = self.population.iter().map(|c| c.rule).collect();
        let seeds: Vec<u64> = rules.iter().map(|_| self.rng.next_seed()).collect();

        let results = self.scheduler.evaluate(&self.evaluator, &rules, &seeds);

        for (candidate, result) in self.population.iter_mut().zip(results) {
            candidate.score = match result {
                Ok(score) => score,
                Err(e) => {
                    log::warn!("Evaluation of {} failed, scoring 0: {e}", candidate.rule);
                    0.0
                }
            };
            log::debug!("{} ({})", candidate.score, candidate.rule);
        }
        self.evaluations += rules.len() as u64;
    }

    /// Index of the highest score; the first one wins ties.
    fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, candidate) in self.population.iter().enumerate() {
            if candidate.score > self.population[best].score {
                best = i;
            }
        }
        best
    }

    /// Index of the lowest score; the first one wins ties.
    fn worst_index(&self) -> usize {
        let mut worst = 0;
        for (i, candidate) in self.population.iter().enumerate() {
            if candidate.score < self.population[worst].score {
                worst = i;
            }
        }
        worst
    }

    /// Record statistics for the just-evaluated generation.
    fn record_generation(&mut self) -> GenerationRecord {
        let best = self.population[self.best_index()].scored();
        let avg_score = self.population.iter().map(|c| c.score).sum::<f64>()
            / self.population.len() as f64;

        if self.best_ever.is_none_or(|ever| best.score > ever.score) {
            self.best_ever = Some(best);
        }

        let record = GenerationRecord {
            generation: self.generation,
            best_score: best.score,
            best_rule: best.rule,
            avg_score,
        };
        self.history.records.push(record);

        log::info!(
            "Generation {}: best {} ({}), avg {:.3}",
            record.generation,
            record.best_score,
            record.best_rule,
            record.avg_score
        );
        record
    }

    /// Breed the next population from the evaluated one.
    ///
    /// Offspring come in crossover pairs until there are exactly as many as
    /// parents; the generation's best rule then overwrites the offspring at
    /// the index of the worst-scoring parent.
    fn step_generation(&mut self) {
        let size = self.population.len();
        let elite = self.population[self.best_index()].rule;
        let worst = self.worst_index();
        let rate = self.config.mutation_rate;

        let mut offspring = Vec::with_capacity(size);
        while offspring.len() < size {
            let (a, b) = self.select_parents();
            let (child1, child2) = self
                .rng
                .crossover(&self.population[a].rule, &self.population[b].rule);

            offspring.push(self.rng.mutate(&child1, rate));
            if offspring.len() < size {
                offspring.push(self.rng.mutate(&child2, rate));
            }
        }
        offspring[worst] = elite;

        self.generation += 1;
        let generation = self.generation;
        self.population = offspring
            .into_iter()
            .map(|rule| Candidate::new(rule, generation))
            .collect();
    }

    /// Select two parent indices using the configured method.
    fn select_parents(&mut self) -> (usize, usize) {
        match self.config.selection {
            SelectionMethod::Tournament { size } => {
                let size = size.clamp(1, self.population.len());
                let first = self.tournament(size);
                let mut second = self.tournament(size);
                let mut redraws = 0;
                while self.population[second].rule == self.population[first].rule
                    && redraws < MAX_TOURNAMENT_REDRAWS
                {
                    second = self.tournament(size);
                    redraws += 1;
                }
                if self.population[second].rule == self.population[first].rule {
                    log::debug!(
                        "Tournament accepted identical parents {}",
                        self.population[first].rule
                    );
                }
                (first, second)
            }
            SelectionMethod::Roulette => self.roulette_pair(),
        }
    }

    /// Best of `size` distinct individuals sampled uniformly.
    fn tournament(&mut self, size: usize) -> usize {
        let population = &self.population;
        index::sample(self.rng.rng_mut(), population.len(), size)
            .into_iter()
            .reduce(|best, i| {
                if population[i].score > population[best].score {
                    i
                } else {
                    best
                }
            })
            .unwrap_or(0)
    }

    /// Two independent fitness-proportionate draws.
    fn roulette_pair(&mut self) -> (usize, usize) {
        let weights = self.population.iter().map(|c| c.score.max(0.0));
        match WeightedIndex::new(weights) {
            Ok(wheel) => {
                let rng = self.rng.rng_mut();
                (rng.sample(&wheel), rng.sample(&wheel))
            }
            Err(e) => {
                log::warn!("Roulette fell back to uniform selection: {e}");
                let len = self.population.len();
                let rng = self.rng.rng_mut();
                (rng.gen_range(0..len), rng.gen_range(0..len))
            }
        }
    }

    fn progress_for(&self, record: &GenerationRecord) -> EvolutionProgress {
        let generation_best = ScoredRule {
            rule: record.best_rule,
            score: record.best_score,
        };
        EvolutionProgress {
            generation: record.generation,
            total_generations: self.config.ga_generations,
            generation_best,
            best_ever: self.best_ever.unwrap_or(generation_best),
            avg_score: record.avg_score,
            evaluations_completed: self.evaluations,
        }
    }

    /// Progress as of the last evaluated generation.
    pub fn progress(&self) -> Option<EvolutionProgress> {
        self.history.records.last().map(|r| self.progress_for(r))
    }

    /// Check if evolution should stop after the current generation.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if self.generation + 1 >= self.config.ga_generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Run evolution with progress callback.
    ///
    /// At least one generation is always evaluated, even when the cancel
    /// handle is already set.
    pub fn run_with_callback<F>(&mut self, callback: F) -> EvolutionResult
    where
        F: Fn(&EvolutionProgress),
    {
        let start_time = Instant::now();
        self.initialize();

        let (last, stop_reason) = loop {
            self.evaluate_population();
            let record = self.record_generation();
            callback(&self.progress_for(&record));

            if let Some(reason) = self.should_stop() {
                break (record, reason);
            }
            self.step_generation();
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        let best_score = last.best_score;

        EvolutionResult {
            best_rule: last.best_rule,
            best_score,
            best_ever: self.best_ever.unwrap_or(ScoredRule {
                rule: last.best_rule,
                score: best_score,
            }),
            history: self.history.clone(),
            stats: EvolutionStats {
                generations: self.history.len(),
                total_evaluations: self.evaluations,
                elapsed_seconds: elapsed,
                evaluations_per_second: if elapsed > 0.0 {
                    self.evaluations as f64 / elapsed
                } else {
                    0.0
                },
                stop_reason,
            },
        }
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }
}
