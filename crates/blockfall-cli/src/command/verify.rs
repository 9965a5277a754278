use std::{path::PathBuf, time::Instant};

use blockfall_engine::{BoardSize, GameField, LcgSequencer};
use blockfall_evaluator::{
    placement_evaluator::FeatureWeights, session_evaluator::SessionEvaluator, solver::Solver,
};

use crate::model::TrainedModel;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum WeightPreset {
    #[default]
    Trained,
    ElTetris,
}

impl WeightPreset {
    fn weights(self) -> FeatureWeights {
        match self {
            Self::Trained => FeatureWeights::TRAINED,
            Self::ElTetris => FeatureWeights::EL_TETRIS,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct VerifyArg {
    /// Maximum number of pieces to place (0 plays until game over)
    #[arg(long, default_value_t = 1_000_000)]
    limit: usize,
    /// Seed of the piece sequence
    #[arg(long, default_value_t = 12345)]
    seed: u32,
    /// Print a progress line every N pieces (0 disables)
    #[arg(long, default_value_t = 100_000)]
    report_interval: usize,
    /// Built-in weights to play with
    #[arg(long, value_enum, default_value_t = WeightPreset::default())]
    preset: WeightPreset,
    /// Play with the weights of a trained model instead of a preset
    #[arg(long, conflicts_with = "preset")]
    model: Option<PathBuf>,
}

pub(crate) fn run(arg: &VerifyArg, board_size: BoardSize) -> anyhow::Result<()> {
    let VerifyArg {
        limit,
        seed,
        report_interval,
        preset,
        model,
    } = arg;

    let weights = match model {
        Some(path) => {
            let model = TrainedModel::open(path)?;
            if model.board_size != board_size {
                tracing::warn!(
                    model = %model.board_size,
                    board = %board_size,
                    "model was trained on a different board size"
                );
            }
            model.weights
        }
        None => preset.weights(),
    };
    let placement_limit = (*limit > 0).then_some(*limit);
    match placement_limit {
        Some(limit) => println!("Running verification with {limit} pieces and seed {seed}..."),
        None => println!("Running verification until game over with seed {seed}..."),
    }
    println!("Weights: {weights}");

    let solver = Solver::with_weights(weights);
    let mut field = GameField::new(board_size, Box::new(LcgSequencer::new(*seed)));
    let session = SessionEvaluator::new(placement_limit);

    let start = Instant::now();
    let stats = session.play_session_with(&solver, &mut field, |field| {
        let stats = field.stats();
        if *report_interval > 0 && stats.placed_pieces() % report_interval == 0 {
            println!(
                "  pieces: {:>10}  lines: {:>10}  score: {:>12}  elapsed: {:.2?}",
                stats.placed_pieces(),
                stats.total_cleared_lines(),
                stats.score(),
                start.elapsed()
            );
        }
    });

    println!("Verification finished.");
    if field.is_game_over() {
        println!("Game over after {} pieces.", stats.placed_pieces());
    }
    println!(
        "Total pieces: {}, Total lines cleared: {}, Score: {}",
        stats.placed_pieces(),
        stats.total_cleared_lines(),
        stats.score()
    );
    println!("Line clears (1/2/3/4): {:?}", &stats.line_cleared_counter()[1..]);
    println!("Total time: {:.2?}", start.elapsed());
    Ok(())
}
