use std::mem;

use crate::{
    PieceCollisionError,
    core::{
        bit_board::{BitBoard, BoardSize},
        piece::{Piece, PieceKind, PiecePosition, PieceRotation},
    },
};

use super::{game_stats::GameStats, piece_sequencer::PieceSequencer};

/// Direction of a single-cell shift of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

/// Result of a single gravity step, see [`GameField::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// `false` once the field is game over.
    pub active: bool,
    /// Lines cleared by this step.
    pub cleared_lines: usize,
    /// Whether the falling piece was locked by this step.
    pub locked: bool,
}

/// A board with a falling piece, a preview piece and a piece source.
///
/// The field becomes game over when a locked piece occupies the top row or a
/// newly spawned piece collides. Game over is irreversible and every mutator
/// is a no-op afterwards.
#[derive(Debug)]
pub struct GameField {
    board: BitBoard,
    falling_piece: Piece,
    next_piece: PieceKind,
    sequencer: Box<dyn PieceSequencer>,
    stats: GameStats,
    game_over: bool,
}

impl GameField {
    /// Creates an empty field and spawns the first piece.
    #[must_use]
    pub fn new(size: BoardSize, sequencer: Box<dyn PieceSequencer>) -> Self {
        Self::with_board(BitBoard::new(size), sequencer)
    }

    /// Creates a field on top of an existing board and spawns the first piece.
    #[must_use]
    pub fn with_board(board: BitBoard, mut sequencer: Box<dyn PieceSequencer>) -> Self {
        let first = sequencer.next_piece();
        let next_piece = sequencer.next_piece();
        let mut this = Self {
            falling_piece: Piece::spawn(first, board.size()),
            board,
            next_piece,
            sequencer,
            stats: GameStats::new(),
            game_over: false,
        };
        this.spawn(first);
        this
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    #[must_use]
    pub fn size(&self) -> BoardSize {
        self.board.size()
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    #[must_use]
    pub fn current_piece_kind(&self) -> PieceKind {
        self.falling_piece.kind()
    }

    #[must_use]
    pub fn current_rotation(&self) -> PieceRotation {
        self.falling_piece.rotation()
    }

    #[must_use]
    pub fn current_position(&self) -> PiecePosition {
        self.falling_piece.position()
    }

    /// The piece that [`Self::spawn_next`] will spawn.
    #[must_use]
    pub fn next_piece_kind(&self) -> PieceKind {
        self.next_piece
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Replaces the falling piece with `kind` at the spawn position.
    ///
    /// Returns `false` if the spawned piece collides, which ends the game.
    pub fn spawn(&mut self, kind: PieceKind) -> bool {
        if self.game_over {
            return false;
        }
        self.falling_piece = Piece::spawn(kind, self.size());
        if self.board.is_colliding(self.falling_piece) {
            self.set_game_over();
        }
        !self.game_over
    }

    /// Spawns the preview piece and draws a new preview from the sequencer.
    pub fn spawn_next(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let kind = mem::replace(&mut self.next_piece, self.sequencer.next_piece());
        self.spawn(kind)
    }

    /// Shifts the falling piece by one cell if the target is free.
    pub fn try_move(&mut self, direction: Direction) -> bool {
        if self.game_over {
            return false;
        }
        let target = match direction {
            Direction::Left => self.falling_piece.left(),
            Direction::Right => self.falling_piece.right(),
            Direction::Down => self.falling_piece.down(),
        };
        self.try_replace(target)
    }

    /// Advances the falling piece to its next rotation state.
    ///
    /// The top-left corner stays fixed and no kicks are tried: if the rotated
    /// piece collides nothing changes.
    pub fn try_rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.try_replace(Some(self.falling_piece.rotated()))
    }

    fn try_replace(&mut self, target: Option<Piece>) -> bool {
        match target.filter(|piece| !self.board.is_colliding(*piece)) {
            Some(piece) => {
                self.falling_piece = piece;
                true
            }
            None => false,
        }
    }

    /// Moves the falling piece to an arbitrary free location.
    ///
    /// Fails without changes if the piece collides or the game is over.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.game_over || self.board.is_colliding(piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    /// Drops the falling piece straight down and returns the rows fallen.
    pub fn hard_drop(&mut self) -> usize {
        if self.game_over {
            return 0;
        }
        let dropped = self.falling_piece.simulate_drop_position(&self.board);
        let distance = dropped.position().y() - self.falling_piece.position().y();
        self.falling_piece = dropped;
        distance
    }

    /// Writes the falling piece into the board.
    ///
    /// Returns `false` if the game is over, either already or because the
    /// piece occupies the top row.
    pub fn lock(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.board.fill_piece(self.falling_piece);
        self.stats.record_lock();
        if self
            .falling_piece
            .occupied_positions()
            .iter()
            .any(|&(_, y)| y == 0)
        {
            self.set_game_over();
        }
        !self.game_over
    }

    /// Removes every full row and returns the number of rows removed.
    pub fn clear_lines(&mut self) -> usize {
        if self.game_over {
            return 0;
        }
        let cleared = self.board.clear_lines();
        self.stats.record_clear(cleared);
        cleared
    }

    /// Applies one step of gravity.
    ///
    /// The falling piece moves down one row; when it cannot, it is locked,
    /// full rows are cleared and the next piece spawns.
    pub fn tick(&mut self) -> TickOutcome {
        if self.game_over {
            return TickOutcome {
                active: false,
                cleared_lines: 0,
                locked: false,
            };
        }
        if self.try_move(Direction::Down) {
            return TickOutcome {
                active: true,
                cleared_lines: 0,
                locked: false,
            };
        }
        let mut cleared_lines = 0;
        if self.lock() {
            cleared_lines = self.clear_lines();
            self.spawn_next();
        }
        TickOutcome {
            active: !self.game_over,
            cleared_lines,
            locked: true,
        }
    }

    fn set_game_over(&mut self) {
        self.game_over = true;
        tracing::debug!(
            placed_pieces = self.stats.placed_pieces(),
            cleared_lines = self.stats.total_cleared_lines(),
            "game over"
        );
    }
}
