//! Training system for evolving placement weights with a genetic algorithm.
//!
//! Each individual of the population is a [`FeatureWeights`] vector. Its
//! fitness is the average number of lines a solver driven by those weights
//! clears over several independent games, each game capped at a fixed number
//! of placements. The best vectors survive, are recombined and mutated, and
//! the cycle repeats for a fixed number of generations.
//!
//! # Architecture
//!
//! ```text
//! GeneticOptimizer (Init → Evaluate ⇄ Select → Done)
//!     ↓ submits FitnessTask per (individual × run)
//! FitnessWorkerPool (rayon thread pool)
//!     ↓ plays
//! SessionEvaluator (blockfall-evaluator)
//!     ↓ returns FitnessResult
//! PopulationEvolver (elitism, roulette selection, crossover, mutation)
//! ```
//!
//! # Modules
//!
//! - [`genetic`] - Population, evolution operators and the optimizer state machine
//! - [`weights`] - Initialization, crossover and mutation of weight vectors
//! - [`worker_pool`] - Parallel fitness evaluation
//!
//! # Example
//!
//! ```no_run
//! use blockfall_training::{
//!     genetic::{GeneticOptimizer, GeneticParams},
//!     worker_pool::FitnessWorkerPool,
//! };
//!
//! let params = GeneticParams {
//!     population_size: 16,
//!     generations: 2,
//!     ..GeneticParams::default()
//! };
//! let pool = FitnessWorkerPool::new(None)?;
//! let mut optimizer = GeneticOptimizer::new(params, 42)?;
//! if let Some(best) = optimizer.run(&pool, |report| println!("{}", report.best_fitness)) {
//!     println!("{}", best.weights());
//! }
//! # Ok::<(), blockfall_training::TrainingError>(())
//! ```
//!
//! [`FeatureWeights`]: blockfall_evaluator::placement_evaluator::FeatureWeights

pub mod genetic;
pub mod weights;
pub mod worker_pool;

/// Errors that abort a training run.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    /// The fitness worker threads could not be spawned.
    #[display("failed to build fitness worker pool: {_0}")]
    ThreadPool(rayon::ThreadPoolBuildError),
    /// A population of zero individuals was requested.
    #[display("population size must be at least 1")]
    EmptyPopulation,
}
