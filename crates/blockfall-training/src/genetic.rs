//! Genetic algorithm for evolving placement weights.
//!
//! # Algorithm Overview
//!
//! 1. **Initialize** - Every individual gets weights drawn from `U(-1, 1)`
//! 2. **Evaluate** - Each individual plays `runs_per_individual` capped games on
//!    independent piece seeds; its fitness is the mean number of lines cleared
//! 3. **Elite Selection** - The best `round(elitism_rate × size)` individuals are
//!    copied into the next generation unchanged
//! 4. **Roulette Selection** - Parents are drawn with probability proportional
//!    to their fitness, shifted up when negative so the minimum is zero
//! 5. **Crossover** - With probability `crossover_rate` the child splices the
//!    parents at a single cut point, otherwise it copies one parent
//! 6. **Mutation** - Each component is shifted by `U(-magnitude, magnitude)`
//!    with probability `mutation_rate`
//!
//! Steps 2 to 6 repeat for a fixed number of generations.
//!
//! # Key Components
//!
//! - [`GeneticParams`] - Run configuration
//! - [`Individual`] - A weight vector and its fitness
//! - [`Population`] - The individuals of one generation
//! - [`PopulationEvolver`] - Produces the next generation from an evaluated one
//! - [`GeneticOptimizer`] - Drives the evaluate/select cycle on a worker pool
//!
//! # Determinism
//!
//! All randomness (initial weights, game seeds, selection, crossover and
//! mutation) flows from one generator seeded in [`GeneticOptimizer::new`].
//! Results are keyed by task rather than completion order, so a run is
//! reproducible regardless of the worker count.

use std::time::{Duration, Instant};

use blockfall_engine::{BoardSize, PieceSeed};
use blockfall_evaluator::{
    placement_evaluator::FeatureWeights, session_evaluator::SessionEvaluator,
};
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution as _, weighted::WeightedIndex},
};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError, weights,
    worker_pool::{FitnessResult, FitnessTask, FitnessWorkerPool},
};

/// Configuration of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    pub runs_per_individual: usize,
    /// Placements after which a fitness game is stopped.
    pub placement_limit: usize,
    /// Fraction of each generation carried over unchanged.
    pub elitism_rate: f64,
    pub crossover_rate: f64,
    /// Per-component mutation probability.
    pub mutation_rate: f64,
    pub mutation_magnitude: f32,
    pub board_size: BoardSize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 128,
            generations: 20,
            runs_per_individual: 3,
            placement_limit: 60_000,
            elitism_rate: 0.1,
            crossover_rate: 0.8,
            mutation_rate: 0.17,
            mutation_magnitude: 0.4,
            board_size: BoardSize::DEFAULT,
        }
    }
}

/// A candidate weight vector and its fitness.
///
/// Fitness is zero until the individual has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Individual {
    weights: FeatureWeights,
    fitness: f32,
}

impl Individual {
    #[must_use]
    pub fn new(weights: FeatureWeights) -> Self {
        Self {
            weights,
            fitness: 0.0,
        }
    }

    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::random(rng))
    }

    #[must_use]
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Mean lines cleared per evaluation game.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[must_use]
    pub fn with_fitness(mut self, fitness: f32) -> Self {
        self.fitness = fitness;
        self
    }
}

/// The individuals of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn random<R>(count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            individuals: (0..count).map(|_| Individual::random(rng)).collect(),
        }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The fittest individual; the earliest one wins ties.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .reduce(|best, ind| if ind.fitness > best.fitness { ind } else { best })
    }

    #[must_use]
    pub fn mean_fitness(&self) -> f32 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        #[expect(clippy::cast_precision_loss)]
        let len = self.individuals.len() as f32;
        self.individuals.iter().map(|ind| ind.fitness).sum::<f32>() / len
    }

    /// One task per (individual × run), each with its own piece seed.
    pub fn fitness_tasks<R>(&self, runs: usize, rng: &mut R) -> Vec<FitnessTask>
    where
        R: Rng + ?Sized,
    {
        let mut tasks = Vec::with_capacity(self.individuals.len() * runs);
        for (individual, ind) in self.individuals.iter().enumerate() {
            for run in 0..runs {
                tasks.push(FitnessTask {
                    individual,
                    run,
                    weights: ind.weights,
                    seed: rng.random::<PieceSeed>(),
                });
            }
        }
        tasks
    }

    /// Sets each individual's fitness to the mean cleared lines of its results.
    ///
    /// Individuals without results get zero fitness.
    pub fn apply_results(&mut self, results: &[FitnessResult]) {
        let mut totals = vec![(0_usize, 0_usize); self.individuals.len()];
        for result in results {
            if let Some((lines, runs)) = totals.get_mut(result.individual) {
                *lines += result.cleared_lines;
                *runs += 1;
            }
        }
        for (ind, (lines, runs)) in self.individuals.iter_mut().zip(totals) {
            #[expect(clippy::cast_precision_loss)]
            let fitness = if runs == 0 {
                0.0
            } else {
                lines as f32 / runs as f32
            };
            ind.fitness = fitness;
        }
    }
}

/// Parameters of the selection, crossover and mutation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    pub elitism_rate: f64,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_magnitude: f32,
}

impl From<&GeneticParams> for PopulationEvolver {
    fn from(params: &GeneticParams) -> Self {
        Self {
            elitism_rate: params.elitism_rate,
            crossover_rate: params.crossover_rate,
            mutation_rate: params.mutation_rate,
            mutation_magnitude: params.mutation_magnitude,
        }
    }
}

impl PopulationEvolver {
    /// Number of individuals copied unchanged into a generation of `size`.
    #[must_use]
    pub fn elite_count(&self, size: usize) -> usize {
        #[expect(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let count = (self.elitism_rate.max(0.0) * size as f64).round() as usize;
        count.min(size)
    }

    /// Creates the next generation, of the same size as `population`.
    ///
    /// The elites come first, in descending fitness order, with their fitness
    /// kept; the offspring after them have zero fitness.
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let mut ranked = population.individuals.clone();
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let size = ranked.len();
        let mut next = Vec::with_capacity(size);
        next.extend_from_slice(&ranked[..self.elite_count(size)]);
        if ranked.is_empty() {
            return Population::from_individuals(next);
        }

        let roulette = roulette_wheel(&ranked);
        let crossover_rate = self.crossover_rate.clamp(0.0, 1.0);
        while next.len() < size {
            let p1 = &ranked[select(roulette.as_ref(), size, rng)];
            let p2 = &ranked[select(roulette.as_ref(), size, rng)];

            let mut child = if rng.random_bool(crossover_rate) {
                weights::random_crossover(&p1.weights, &p2.weights, rng)
            } else if rng.random_bool(0.5) {
                p1.weights
            } else {
                p2.weights
            };
            weights::mutate(&mut child, self.mutation_rate, self.mutation_magnitude, rng);
            next.push(Individual::new(child));
        }
        Population::from_individuals(next)
    }
}

/// Fitness-proportionate distribution over `ranked`, or `None` when every
/// weight is zero.
///
/// Negative fitness is shifted up so the minimum becomes zero; non-negative
/// fitness is used as is.
fn roulette_wheel(ranked: &[Individual]) -> Option<WeightedIndex<f32>> {
    let min = ranked
        .iter()
        .map(|ind| ind.fitness)
        .fold(f32::INFINITY, f32::min);
    let shift = min.min(0.0);
    WeightedIndex::new(ranked.iter().map(|ind| ind.fitness - shift)).ok()
}

fn select<R>(roulette: Option<&WeightedIndex<f32>>, size: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    match roulette {
        Some(dist) => dist.sample(rng),
        None => rng.random_range(0..size),
    }
}

/// Progress of the optimizer's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    /// No population yet.
    Init,
    /// The current population awaits fitness evaluation.
    Evaluate,
    /// The current population is evaluated and awaits selection.
    Select,
    /// All generations are evaluated.
    Done,
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// Zero-based generation index.
    pub generation: usize,
    pub generations: usize,
    pub elapsed: Duration,
    pub best_fitness: f32,
    pub best_weights: FeatureWeights,
    pub mean_fitness: f32,
}

/// Runs the genetic algorithm on a [`FitnessWorkerPool`].
///
/// The optimizer moves `Init → Evaluate ⇄ Select → Done`. At least one
/// generation is always evaluated, even when `generations` is zero.
#[derive(Debug)]
pub struct GeneticOptimizer {
    params: GeneticParams,
    evolver: PopulationEvolver,
    session: SessionEvaluator,
    rng: Pcg64Mcg,
    state: OptimizerState,
    population: Population,
    generation: usize,
    best: Option<Individual>,
}

impl GeneticOptimizer {
    pub fn new(params: GeneticParams, seed: u64) -> Result<Self, TrainingError> {
        if params.population_size == 0 {
            return Err(TrainingError::EmptyPopulation);
        }
        Ok(Self {
            evolver: PopulationEvolver::from(&params),
            session: SessionEvaluator::new(Some(params.placement_limit)),
            params,
            rng: Pcg64Mcg::seed_from_u64(seed),
            state: OptimizerState::Init,
            population: Population::from_individuals(vec![]),
            generation: 0,
            best: None,
        })
    }

    #[must_use]
    pub fn params(&self) -> &GeneticParams {
        &self.params
    }

    #[must_use]
    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Number of generations evaluated so far.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The fittest individual seen in any evaluated generation.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Advances the state machine by one transition.
    ///
    /// Returns a report when the transition evaluated a generation.
    pub fn step(&mut self, pool: &FitnessWorkerPool) -> Option<GenerationReport> {
        match self.state {
            OptimizerState::Init => {
                self.population = Population::random(self.params.population_size, &mut self.rng);
                self.state = OptimizerState::Evaluate;
                None
            }
            OptimizerState::Evaluate => {
                let report = self.evaluate(pool);
                self.state = if self.generation >= self.params.generations {
                    OptimizerState::Done
                } else {
                    OptimizerState::Select
                };
                Some(report)
            }
            OptimizerState::Select => {
                self.population = self.evolver.evolve(&self.population, &mut self.rng);
                self.state = OptimizerState::Evaluate;
                None
            }
            OptimizerState::Done => None,
        }
    }

    /// Runs until [`OptimizerState::Done`], calling `on_generation` after
    /// every evaluated generation, and returns the best individual.
    pub fn run<F>(&mut self, pool: &FitnessWorkerPool, mut on_generation: F) -> Option<&Individual>
    where
        F: FnMut(&GenerationReport),
    {
        while self.state != OptimizerState::Done {
            if let Some(report) = self.step(pool) {
                on_generation(&report);
            }
        }
        self.best()
    }

    fn evaluate(&mut self, pool: &FitnessWorkerPool) -> GenerationReport {
        let start = Instant::now();
        let tasks = self
            .population
            .fitness_tasks(self.params.runs_per_individual, &mut self.rng);
        let results = pool.evaluate(tasks, &self.session, self.params.board_size);
        self.population.apply_results(&results);

        let generation_best = self
            .population
            .best()
            .copied()
            .unwrap_or_else(|| Individual::new(FeatureWeights::default()));
        if self
            .best
            .is_none_or(|best| generation_best.fitness > best.fitness)
        {
            self.best = Some(generation_best);
        }

        let report = GenerationReport {
            generation: self.generation,
            generations: self.params.generations.max(1),
            elapsed: start.elapsed(),
            best_fitness: generation_best.fitness,
            best_weights: generation_best.weights,
            mean_fitness: self.population.mean_fitness(),
        };
        tracing::debug!(
            generation = report.generation,
            best_fitness = report.best_fitness,
            mean_fitness = report.mean_fitness,
            elapsed_ms = report.elapsed.as_millis(),
            "generation evaluated"
        );
        self.generation += 1;
        report
    }
}
