//! Parallel fitness evaluation.
//!
//! The optimizer turns a generation into one [`FitnessTask`] per
//! (individual × run) and hands the batch to a [`FitnessWorkerPool`]. Every
//! task plays one independent game and reports the lines it cleared. A batch
//! is a barrier: [`FitnessWorkerPool::evaluate`] returns only once every task
//! has finished, so the optimizer never observes a partial generation.
//!
//! Tasks own everything they need (`Copy` weights and a piece seed), so workers
//! share no mutable state.

use blockfall_engine::{BoardSize, PieceSeed};
use blockfall_evaluator::{
    placement_evaluator::FeatureWeights, session_evaluator::SessionEvaluator,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use crate::TrainingError;

/// One game to play for one individual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessTask {
    pub individual: usize,
    pub run: usize,
    pub weights: FeatureWeights,
    pub seed: PieceSeed,
}

/// Outcome of a [`FitnessTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitnessResult {
    pub individual: usize,
    pub run: usize,
    pub cleared_lines: usize,
}

impl FitnessTask {
    /// Plays the task's game to completion or to the placement cap.
    #[must_use]
    pub fn execute(&self, session: &SessionEvaluator, size: BoardSize) -> FitnessResult {
        FitnessResult {
            individual: self.individual,
            run: self.run,
            cleared_lines: session.cleared_lines(self.weights, size, self.seed),
        }
    }
}

/// Fixed-size pool of worker threads that play fitness games.
#[derive(Debug)]
pub struct FitnessWorkerPool {
    pool: ThreadPool,
    show_progress: bool,
}

impl FitnessWorkerPool {
    /// Spawns `threads` workers, or one per available CPU when `None`.
    pub fn new(threads: Option<usize>) -> Result<Self, TrainingError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("fitness-worker-{i}"));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(TrainingError::ThreadPool)?;
        tracing::debug!(threads = pool.current_num_threads(), "fitness worker pool started");
        Ok(Self {
            pool,
            show_progress: false,
        })
    }

    /// Displays a progress bar on stderr while a batch runs.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs every task and returns the results in task order.
    ///
    /// # Panics
    ///
    /// A task that panics propagates its panic to the caller once the batch
    /// has stopped.
    #[must_use]
    pub fn evaluate(
        &self,
        tasks: Vec<FitnessTask>,
        session: &SessionEvaluator,
        size: BoardSize,
    ) -> Vec<FitnessResult> {
        let progress = self.progress_bar(tasks.len());
        let results = self.pool.install(|| {
            tasks
                .into_par_iter()
                .map(|task| {
                    let result = task.execute(session, size);
                    progress.inc(1);
                    result
                })
                .collect()
        });
        progress.finish_and_clear();
        results
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::with_template("[{wide_bar}] {pos}/{len} [{elapsed_precise}] ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
