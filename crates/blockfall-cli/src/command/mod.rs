use anyhow::Context as _;
use blockfall_engine::BoardSize;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{filter::LevelFilter, prelude::*};

use self::{auto_play::AutoPlayArg, train::TrainArg, verify::VerifyArg};

mod auto_play;
mod train;
mod verify;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Board width in cells
    #[arg(long, global = true, default_value_t = BoardSize::DEFAULT.width())]
    width: usize,
    /// Board height in cells
    #[arg(long, global = true, default_value_t = BoardSize::DEFAULT.height())]
    height: usize,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve placement weights with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play a headless game with fixed weights and report progress
    Verify(#[clap(flatten)] VerifyArg),
    /// Watch the solver play, printing the board after every lock
    AutoPlay(#[clap(flatten)] AutoPlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);

    let size = BoardSize::new(args.width, args.height).context("Invalid board size")?;
    match &args.mode {
        Mode::Train(arg) => train::run(arg, size)?,
        Mode::Verify(arg) => verify::run(arg, size)?,
        Mode::AutoPlay(arg) => auto_play::run(arg, size)?,
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(level)
        .init();
}
