//! Move search and board evaluation for the falling-block engine.
//!
//! This crate implements a three-level evaluation architecture:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores a single piece placement
//!    by a weighted sum of six board features.
//!
//! 2. **Placement Search** ([`solver`]) - Enumerates every drop of the current piece and
//!    selects the highest-scoring one.
//!
//! 3. **Session Evaluation** ([`session_evaluator`]) - Plays whole games with a solver; the
//!    lines cleared are the fitness used for training.
//!
//! # Architecture
//!
//! ```text
//! Session Evaluation (lines cleared per game)
//!     ↓ uses
//! Solver (select best placement)
//!     ↓ uses
//! Placement Evaluation (score single placement)
//! ```
//!
//! # Supporting Modules
//!
//! - [`board_analysis`] - Lazily computed board metrics, measured as if full rows were
//!   already cleared
//! - [`board_feature`] - The six features and their value vector
//! - [`placement_analysis`] - Combines the placed piece with the board analysis
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{BitBoard, BoardSize, PieceKind};
//! use blockfall_evaluator::{placement_evaluator::FeatureWeights, solver::Solver};
//!
//! let solver = Solver::with_weights(FeatureWeights::TRAINED);
//! let board = BitBoard::new(BoardSize::DEFAULT);
//! let choice = solver.best_placement(&board, PieceKind::I).unwrap();
//! assert_eq!(choice.placement().landing_row(), 19);
//! ```

pub mod board_analysis;
pub mod board_feature;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod session_evaluator;
pub mod solver;
