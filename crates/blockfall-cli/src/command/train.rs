use std::{path::PathBuf, time::Instant};

use blockfall_engine::BoardSize;
use blockfall_training::{
    genetic::{GeneticOptimizer, GeneticParams},
    worker_pool::FitnessWorkerPool,
};
use chrono::Utc;

use crate::model::TrainedModel;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Individuals per generation
    #[arg(long, default_value_t = GeneticParams::default().population_size)]
    population: usize,
    /// Number of generations to evaluate
    #[arg(long, default_value_t = GeneticParams::default().generations)]
    generations: usize,
    /// Games played per individual and generation
    #[arg(long, default_value_t = GeneticParams::default().runs_per_individual)]
    runs: usize,
    /// Placements after which a training game stops
    #[arg(long, default_value_t = GeneticParams::default().placement_limit)]
    placement_limit: usize,
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,
    /// Seed of the optimizer's random generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Name recorded in the saved model
    #[arg(long, default_value = "trained")]
    name: String,
    /// Write the best weights as a model JSON file
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg, board_size: BoardSize) -> anyhow::Result<()> {
    let TrainArg {
        population,
        generations,
        runs,
        placement_limit,
        threads,
        seed,
        name,
        output,
    } = arg;

    let params = GeneticParams {
        population_size: *population,
        generations: *generations,
        runs_per_individual: *runs,
        placement_limit: *placement_limit,
        board_size,
        ..GeneticParams::default()
    };
    let seed = seed.unwrap_or_else(rand::random);
    let pool = FitnessWorkerPool::new(*threads)?.with_progress(true);
    let mut optimizer = GeneticOptimizer::new(params, seed)?;

    println!(
        "Training on {board_size} board: population {population}, {generations} generations, \
         {runs} runs per individual, {} threads, seed {seed}",
        pool.num_threads()
    );
    let start = Instant::now();
    let best = optimizer
        .run(&pool, |report| {
            println!();
            println!(
                "--- Generation {}/{} ---",
                report.generation + 1,
                report.generations
            );
            println!("Generation time: {:.2?}", report.elapsed);
            println!("Best fitness (avg lines cleared): {:.2}", report.best_fitness);
            println!("Mean fitness: {:.2}", report.mean_fitness);
            println!("Best weights: {}", report.best_weights);
        })
        .copied()
        .ok_or_else(|| anyhow::anyhow!("no generation was evaluated"))?;

    println!();
    println!("Training finished in {:.2?}", start.elapsed());
    println!("Final best fitness: {:.2}", best.fitness());
    println!("Final best weights: {}", best.weights());

    if let Some(path) = output {
        let model = TrainedModel {
            name: name.clone(),
            trained_at: Utc::now(),
            final_fitness: best.fitness(),
            weights: *best.weights(),
            board_size,
            params,
        };
        model.save(path)?;
        println!();
        println!("Model saved successfully");
        println!("  Path: {}", path.display());
        println!("  Name: {}", model.name);
        println!("  Trained at: {}", model.trained_at);
    }

    Ok(())
}
