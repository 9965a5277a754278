//! Analysis of board state after piece placement.
//!
//! [`PlacementAnalysis`] pairs the placed piece with a [`BoardAnalysis`] of
//! the board the piece was written into. The board is borrowed, not copied:
//! the solver writes a candidate into its scratch board, reads the features
//! and then removes the piece again.
//!
//! ```
//! use blockfall_engine::{BitBoard, BoardSize, Piece, PieceKind};
//! use blockfall_evaluator::placement_analysis::PlacementAnalysis;
//!
//! let mut board = BitBoard::new(BoardSize::DEFAULT);
//! let piece = Piece::spawn(PieceKind::O, board.size()).simulate_drop_position(&board);
//! board.fill_piece(piece);
//!
//! let analysis = PlacementAnalysis::new(&board, piece);
//! assert_eq!(analysis.cleared_lines(), 0);
//! assert!((analysis.landing_height() - 0.5).abs() < f32::EPSILON);
//! ```

use blockfall_engine::{BitBoard, Piece};

use crate::{board_analysis::BoardAnalysis, board_feature::FeatureValues};

#[derive(Debug)]
pub struct PlacementAnalysis<'a> {
    placement: Piece,
    board_analysis: BoardAnalysis<'a>,
}

impl<'a> PlacementAnalysis<'a> {
    /// Analyses `placement`, which must already be written into `board`.
    #[must_use]
    pub fn new(board: &'a BitBoard, placement: Piece) -> Self {
        Self {
            placement,
            board_analysis: BoardAnalysis::from_board(board),
        }
    }

    #[must_use]
    pub fn placement(&self) -> &Piece {
        &self.placement
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.board_analysis.cleared_lines()
    }

    /// Height of the middle of the piece above the floor, before the line clear.
    ///
    /// Computed as `(H - (row + h)) + (h - 1) / 2` where `row` is the top row
    /// of the piece's bounding box and `h` its height.
    #[must_use]
    pub fn landing_height(&self) -> f32 {
        let board_height = self.board_analysis.board().height();
        let piece_height = self.placement.shape().height();
        let bottom_gap = board_height - (self.placement.position().y() + piece_height);
        #[expect(clippy::cast_precision_loss)]
        let height = bottom_gap as f32 + (piece_height - 1) as f32 / 2.0;
        height
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis<'a> {
        &self.board_analysis
    }

    #[must_use]
    pub fn feature_values(&self) -> FeatureValues {
        FeatureValues::from_analysis(self)
    }
}
