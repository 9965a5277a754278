//! Session evaluation: playing whole games with a solver.
//!
//! A session is one game driven entirely by a [`Solver`]: the best
//! placement of every piece is applied until the game ends or the placement
//! cap is reached. The genetic optimizer scores a weight vector by the lines
//! cleared in such sessions; the CLI uses the same loop for headless
//! verification runs.
//!
//! # Usage
//!
//! ```
//! use blockfall_engine::{BoardSize, PieceSeed};
//! use blockfall_evaluator::{
//!     placement_evaluator::FeatureWeights, session_evaluator::SessionEvaluator,
//! };
//!
//! let evaluator = SessionEvaluator::new(Some(50));
//! let lines = evaluator.cleared_lines(
//!     FeatureWeights::EL_TETRIS,
//!     BoardSize::DEFAULT,
//!     PieceSeed::from(7_u64),
//! );
//! assert!(lines <= 50 * 4 / 10);
//! ```

use blockfall_engine::{BagSequencer, BoardSize, GameField, GameStats, PieceSeed};

use crate::{placement_evaluator::FeatureWeights, solver::Solver};

/// Plays solver-driven sessions up to an optional placement cap.
#[derive(Debug, Clone, Copy)]
pub struct SessionEvaluator {
    placement_limit: Option<usize>,
}

impl SessionEvaluator {
    /// Creates a session evaluator; `None` plays until game over.
    #[must_use]
    pub fn new(placement_limit: Option<usize>) -> Self {
        Self { placement_limit }
    }

    #[must_use]
    pub fn placement_limit(&self) -> Option<usize> {
        self.placement_limit
    }

    /// Plays `field` until game over or the placement cap.
    pub fn play_session(&self, solver: &Solver<'_>, field: &mut GameField) -> GameStats {
        self.play_session_with(solver, field, |_| {})
    }

    /// Like [`Self::play_session`], calling `on_placement` after every placement.
    pub fn play_session_with<F>(
        &self,
        solver: &Solver<'_>,
        field: &mut GameField,
        mut on_placement: F,
    ) -> GameStats
    where
        F: FnMut(&GameField),
    {
        while self
            .placement_limit
            .is_none_or(|limit| field.stats().placed_pieces() < limit)
        {
            let Some(choice) = solver.best_placement_for(field) else {
                break;
            };
            let outcome = match choice.placement().apply(field) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "solver placement could not be applied");
                    break;
                }
            };
            on_placement(field);
            if !outcome.active {
                break;
            }
        }
        field.stats().clone()
    }

    /// Plays one fresh game on an empty board with its own 7-bag sequencer
    /// and returns the number of lines cleared.
    #[must_use]
    pub fn cleared_lines(&self, weights: FeatureWeights, size: BoardSize, seed: PieceSeed) -> usize {
        let solver = Solver::with_weights(weights);
        let mut field = GameField::new(size, Box::new(BagSequencer::new(seed)));
        self.play_session(&solver, &mut field).total_cleared_lines()
    }
}
