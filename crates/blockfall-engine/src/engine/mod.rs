//! Game engine logic and state management.
//!
//! This module builds the stateful game on top of the core data structures:
//!
//! - [`GameField`] - Board, falling piece, preview piece and terminal flag
//! - [`GameStats`] - Placed pieces, lines cleared and score
//! - [`PieceSequencer`] - Piece sources ([`UniformSequencer`], [`BagSequencer`], [`LcgSequencer`])
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameField`] with a board size and a sequencer
//! 2. Move and rotate the falling piece, or teleport it with
//!    [`GameField::set_falling_piece`]
//! 3. Drop and lock it, either with [`GameField::tick`] or explicitly with
//!    [`GameField::hard_drop`], [`GameField::lock`] and [`GameField::clear_lines`]
//! 4. Spawn the next piece
//! 5. Repeat until game over
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{BoardSize, Direction, GameField, SequencerKind};
//! use rand::Rng as _;
//!
//! let sequencer = SequencerKind::Bag.build(rand::rng().random());
//! let mut field = GameField::new(BoardSize::DEFAULT, sequencer);
//!
//! field.try_move(Direction::Left);
//! field.try_rotate();
//!
//! field.hard_drop();
//! if field.lock() {
//!     field.clear_lines();
//!     field.spawn_next();
//! } else {
//!     println!("Game over!");
//! }
//! ```

pub use self::{game_field::*, game_stats::*, piece_sequencer::*};

mod game_field;
mod game_stats;
mod piece_sequencer;
