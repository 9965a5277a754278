//! Placement search: choosing where the current piece should land.
//!
//! The [`Solver`] tries every rotation state of the piece at every column,
//! drops it straight down from the top row and scores the resulting board
//! with a [`PlacementEvaluator`]. It is greedy: only the placement of the
//! current piece is considered, never the pieces after it.
//!
//! # Search Order
//!
//! Candidates are enumerated rotation-major (rotation state 0 first), then
//! by column from left to right. A candidate that already collides in the
//! top row is skipped. The first candidate with the strictly highest score
//! wins, so ties are broken by the enumeration order.
//!
//! # Scratch Board
//!
//! Each search copies the board once. Every candidate is written into the
//! copy, analysed with the line clear measured virtually and removed again,
//! which restores the copy exactly.
//!
//! # Usage
//!
//! ```
//! use blockfall_engine::{BoardSize, GameField, SequencerKind};
//! use blockfall_evaluator::{placement_evaluator::FeatureWeights, solver::Solver};
//!
//! let solver = Solver::with_weights(FeatureWeights::EL_TETRIS);
//! let mut field = GameField::new(BoardSize::DEFAULT, SequencerKind::Lcg.build(1_u64.into()));
//!
//! while field.stats().placed_pieces() < 10 {
//!     let Some(choice) = solver.best_placement_for(&field) else {
//!         break;
//!     };
//!     if !choice.placement().apply(&mut field).unwrap().active {
//!         break;
//!     }
//! }
//! assert_eq!(field.stats().placed_pieces(), 10);
//! ```

use blockfall_engine::{
    BitBoard, GameField, Piece, PieceCollisionError, PieceKind, PiecePosition, PieceRotation,
    TickOutcome,
};

use crate::{
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{
        FeatureWeights, PlacementEvaluation, PlacementEvaluator, WeightedPlacementEvaluator,
    },
};

/// Where a piece comes to rest: kind, rotation state, column and landing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    piece: Piece,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PlacementError {
    #[display("placement is for {expected} but the falling piece is {actual}")]
    #[from(ignore)]
    KindMismatch {
        expected: PieceKind,
        actual: PieceKind,
    },
    #[display("placement does not fit on the board")]
    Collision(PieceCollisionError),
}

impl Placement {
    /// The piece at its landing position.
    #[must_use]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.piece.kind()
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.piece.rotation()
    }

    /// Leftmost column of the piece's bounding box.
    #[must_use]
    pub fn column(&self) -> usize {
        self.piece.position().x()
    }

    /// Top row of the piece's bounding box after the drop.
    #[must_use]
    pub fn landing_row(&self) -> usize {
        self.piece.position().y()
    }

    /// The piece in the top row, directly above its landing position.
    ///
    /// This is the only position [`Placement::apply`] checks; the move and
    /// rotate path from the spawn position is not searched.
    #[must_use]
    pub fn start_piece(&self) -> Piece {
        self.piece.with_position(self.piece.position().with_y(0))
    }

    /// Executes the placement on a live field.
    ///
    /// The falling piece is moved to the placement's column and rotation in
    /// the top row, hard dropped, locked, full rows are cleared and the next
    /// piece spawns. Fails without changes if the falling piece has another
    /// kind or the piece no longer fits.
    ///
    /// Executable means the piece fits at [`Placement::start_piece`] when
    /// this is called. No path of moves and rotations from the spawn position
    /// is searched.
    pub fn apply(&self, field: &mut GameField) -> Result<TickOutcome, PlacementError> {
        if field.current_piece_kind() != self.kind() {
            return Err(PlacementError::KindMismatch {
                expected: self.kind(),
                actual: field.current_piece_kind(),
            });
        }
        field.set_falling_piece(self.start_piece())?;
        field.hard_drop();
        debug_assert_eq!(field.current_position().y(), self.landing_row());

        let mut cleared_lines = 0;
        if field.lock() {
            cleared_lines = field.clear_lines();
            field.spawn_next();
        }
        Ok(TickOutcome {
            active: !field.is_game_over(),
            cleared_lines,
            locked: true,
        })
    }
}

/// Best placement found by a search, with its evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PlacementChoice {
    placement: Placement,
    evaluation: PlacementEvaluation,
}

impl PlacementChoice {
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn evaluation(&self) -> &PlacementEvaluation {
        &self.evaluation
    }
}

/// Iterates over every placement of `kind` reachable by a straight drop.
///
/// Yields candidates in search order.
pub fn drop_placements(board: &BitBoard, kind: PieceKind) -> impl Iterator<Item = Placement> + '_ {
    top_row_pieces(board, kind).map(|piece| Placement {
        piece: piece.simulate_drop_position(board),
    })
}

/// Pieces at row 0 for every rotation/column pair, skipping those that collide.
fn top_row_pieces(board: &BitBoard, kind: PieceKind) -> impl Iterator<Item = Piece> + '_ {
    kind.rotations().flat_map(move |rotation| {
        let max_x = board.width() - kind.shape(rotation).width();
        (0..=max_x).filter_map(move |x| {
            let x = u8::try_from(x).ok()?;
            let piece = Piece::new(kind, rotation, PiecePosition::new(x, 0));
            (!board.is_colliding(piece)).then_some(piece)
        })
    })
}

/// Selects the best placement for a piece.
#[derive(Debug)]
pub struct Solver<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> Solver<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Creates a solver scoring placements with the linear evaluator.
    #[must_use]
    pub fn with_weights(weights: FeatureWeights) -> Self {
        Self::new(Box::new(WeightedPlacementEvaluator::new(weights)))
    }

    /// Finds the highest scoring placement of `kind` on `board`.
    ///
    /// Returns `None` only if every rotation/column pair collides in the top
    /// row. The board is not modified.
    #[must_use]
    pub fn best_placement(&self, board: &BitBoard, kind: PieceKind) -> Option<PlacementChoice> {
        let mut scratch = board.clone();
        let mut best: Option<PlacementChoice> = None;
        let mut candidates = 0;

        for start in top_row_pieces(board, kind) {
            let piece = start.simulate_drop_position(&scratch);
            scratch.fill_piece(piece);
            let evaluation = self
                .placement_evaluator
                .evaluate_placement(&PlacementAnalysis::new(&scratch, piece));
            scratch.remove_piece(piece);
            candidates += 1;

            if best.is_none_or(|b| evaluation.score > b.evaluation.score) {
                best = Some(PlacementChoice {
                    placement: Placement { piece },
                    evaluation,
                });
            }
        }
        debug_assert_eq!(&scratch, board);

        tracing::trace!(
            %kind,
            candidates,
            score = best.map(|b| b.evaluation.score),
            "placement search"
        );
        best
    }

    /// Finds the best placement of the field's falling piece.
    ///
    /// Returns `None` once the field is game over.
    #[must_use]
    pub fn best_placement_for(&self, field: &GameField) -> Option<PlacementChoice> {
        if field.is_game_over() {
            return None;
        }
        self.best_placement(field.board(), field.current_piece_kind())
    }
}
