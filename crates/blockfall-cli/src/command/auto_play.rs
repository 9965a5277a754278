use std::{path::PathBuf, thread, time::Duration};

use anyhow::Context as _;
use blockfall_engine::{BoardSize, GameField, PieceSeed, SequencerKind};
use blockfall_evaluator::{placement_evaluator::FeatureWeights, solver::Solver};

use crate::{model::TrainedModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of pieces to place (0 plays until game over)
    #[arg(long, default_value_t = 100)]
    pieces: usize,
    /// Pause after each printed board, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
    /// Piece randomizer (uniform, bag or lcg)
    #[arg(long, default_value_t = SequencerKind::default())]
    sequencer: SequencerKind,
    /// Seed of the piece sequence (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Play with the weights of a trained model instead of the built-in ones
    #[arg(long)]
    model: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoPlayArg, board_size: BoardSize) -> anyhow::Result<()> {
    let AutoPlayArg {
        pieces,
        delay_ms,
        sequencer,
        seed,
        model,
    } = arg;

    let weights = match model {
        Some(path) => TrainedModel::open(path)?.weights,
        None => FeatureWeights::TRAINED,
    };
    let seed = seed.map_or_else(rand::random::<PieceSeed>, PieceSeed::from);
    let solver = Solver::with_weights(weights);
    let mut field = GameField::new(board_size, sequencer.build(seed));
    let delay = Duration::from_millis(*delay_ms);

    while *pieces == 0 || field.stats().placed_pieces() < *pieces {
        let Some(choice) = solver.best_placement_for(&field) else {
            break;
        };
        // the top-row start is revalidated; no path from the spawn is searched
        field
            .set_falling_piece(choice.placement().start_piece())
            .context("Solver chose a placement that does not fit")?;
        let outcome = loop {
            let outcome = field.tick();
            if outcome.locked || !outcome.active {
                break outcome;
            }
        };

        let stats = field.stats();
        println!(
            "piece {:>6}  next {}  lines {:>6}  score {:>8}",
            stats.placed_pieces(),
            field.next_piece_kind(),
            stats.total_cleared_lines(),
            stats.score()
        );
        util::print_board(field.board());
        if !outcome.active {
            break;
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    let stats = field.stats();
    if field.is_game_over() {
        println!("Game over.");
    }
    println!(
        "Placed {} pieces, cleared {} lines, score {}",
        stats.placed_pieces(),
        stats.total_cleared_lines(),
        stats.score()
    );
    Ok(())
}
