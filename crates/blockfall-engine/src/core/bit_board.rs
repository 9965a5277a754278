use std::{fmt, iter};

use serde::{Deserialize, Serialize};

use crate::{BoardSizeError, core::piece::Piece};

use super::piece::PiecePosition;

/// Validated board dimensions.
///
/// Widths are limited to 64 columns so that a row fits in a `u64`, heights
/// to 255 rows so that every coordinate fits in a [`PiecePosition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoardSize")]
pub struct BoardSize {
    width: u8,
    height: u8,
}

#[derive(Deserialize)]
struct RawBoardSize {
    width: usize,
    height: usize,
}

impl TryFrom<RawBoardSize> for BoardSize {
    type Error = BoardSizeError;

    fn try_from(raw: RawBoardSize) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl BoardSize {
    pub const MIN_WIDTH: usize = 8;
    pub const MAX_WIDTH: usize = 64;
    pub const MIN_HEIGHT: usize = 8;
    pub const MAX_HEIGHT: usize = 255;

    /// The classic 10×20 playfield.
    pub const DEFAULT: Self = Self {
        width: 10,
        height: 20,
    };

    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        let err = BoardSizeError { width, height };
        if !(Self::MIN_WIDTH..=Self::MAX_WIDTH).contains(&width)
            || !(Self::MIN_HEIGHT..=Self::MAX_HEIGHT).contains(&height)
        {
            return Err(err);
        }
        Ok(Self {
            width: u8::try_from(width).map_err(|_| err)?,
            height: u8::try_from(height).map_err(|_| err)?,
        })
    }

    #[must_use]
    pub fn width(self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn height(self) -> usize {
        usize::from(self.height)
    }

    /// Top-left corner where new pieces appear: column `width / 2 - 1`, row 0.
    #[must_use]
    pub fn spawn_position(self) -> PiecePosition {
        PiecePosition::new(self.width / 2 - 1, 0)
    }

    /// Row mask with every playable column set.
    #[must_use]
    pub fn full_row_mask(self) -> u64 {
        u64::MAX >> (64 - self.width())
    }
}

/// Bit-packed occupancy grid.
///
/// Each row is a `u64` where bit `x` is column `x`; only the low `width` bits
/// are used. Row 0 is the top of the board. There are no sentinel cells:
/// [`BitBoard::is_colliding`] checks the board bounds explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBoard {
    size: BoardSize,
    rows: Vec<u64>,
}

impl BitBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            rows: vec![0; size.height()],
        }
    }

    /// Creates an empty board, validating the dimensions.
    pub fn with_dimensions(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        Ok(Self::new(BoardSize::new(width, height)?))
    }

    #[must_use]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.size.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.size.height()
    }

    /// Rows from top (index 0) to bottom.
    #[must_use]
    pub fn rows(&self) -> &[u64] {
        &self.rows
    }

    #[must_use]
    pub fn is_cell_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width() && self.rows.get(y).is_some_and(|row| (row >> x) & 1 != 0)
    }

    #[must_use]
    pub fn is_row_filled(&self, y: usize) -> bool {
        let full = self.size.full_row_mask();
        self.rows.get(y).is_some_and(|row| row & full == full)
    }

    #[must_use]
    pub fn occupied_cell_count(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum()
    }

    /// Checks if the piece leaves the board or overlaps occupied cells.
    ///
    /// Every occupied cell of the piece's rotation state placed with its
    /// top-left corner at the piece position is tested.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        let shape = piece.shape();
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        if x0 + shape.width() > self.width() || y0 + shape.height() > self.height() {
            return true;
        }
        iter::zip(shape.rows(), &self.rows[y0..]).any(|(mask, row)| row & (mask << x0) != 0)
    }

    /// Writes the piece's occupied cells into the board.
    ///
    /// The piece must be inside the board.
    pub fn fill_piece(&mut self, piece: Piece) {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (mask, row) in iter::zip(piece.shape().rows(), &mut self.rows[y0..]) {
            *row |= mask << x0;
        }
    }

    /// Clears the piece's occupied cells.
    ///
    /// This is the exact inverse of [`Self::fill_piece`] as long as the cells
    /// were empty before the fill.
    pub fn remove_piece(&mut self, piece: Piece) {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (mask, row) in iter::zip(piece.shape().rows(), &mut self.rows[y0..]) {
            *row &= !(mask << x0);
        }
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Rows are scanned bottom-up; rows above a cleared row shift down by the
    /// number of rows cleared below them and empty rows enter at the top.
    pub fn clear_lines(&mut self) -> usize {
        let full = self.size.full_row_mask();
        let mut count = 0;

        for y in (0..self.rows.len()).rev() {
            if self.rows[y] & full == full {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(0);
        count
    }

    /// Creates a board from ASCII art for tests and fixtures.
    ///
    /// `#` is an occupied cell and `.` an empty one. Blank lines are ignored;
    /// the board takes its width from the rows and its height from the row
    /// count, listed top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if rows differ in width or the dimensions are not a valid
    /// [`BoardSize`].
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<Vec<bool>> = art
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| *c == '#' || *c == '.')
                    .map(|c| c == '#')
                    .collect()
            })
            .collect();
        let width = lines.first().map_or(0, Vec::len);
        let size = match BoardSize::new(width, lines.len()) {
            Ok(size) => size,
            Err(e) => panic!("{e}"),
        };

        let mut board = Self::new(size);
        for (y, cells) in lines.iter().enumerate() {
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {y}",
                cells.len()
            );
            for (x, _) in cells.iter().enumerate().filter(|(_, c)| **c) {
                board.rows[y] |= 1 << x;
            }
        }
        board
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                let c = if self.is_cell_occupied(x, y) { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{PieceKind, PieceRotation};

    use super::*;

    fn piece_at(kind: PieceKind, rotation: usize, x: u8, y: u8) -> Piece {
        Piece::new(
            kind,
            PieceRotation::new(kind, rotation).unwrap(),
            PiecePosition::new(x, y),
        )
    }

    fn fill_row(board: &mut BitBoard, y: usize) {
        board.rows[y] = board.size.full_row_mask();
    }

    #[test]
    fn test_board_size_limits() {
        assert!(BoardSize::new(10, 20).is_ok());
        assert!(BoardSize::new(8, 8).is_ok());
        assert!(BoardSize::new(64, 255).is_ok());

        let err = BoardSize::new(7, 20).unwrap_err();
        assert_eq!(err.width, 7);
        assert!(BoardSize::new(10, 7).is_err());
        assert!(BoardSize::new(65, 20).is_err());
        assert!(BoardSize::new(10, 256).is_err());
        assert!(BitBoard::with_dimensions(0, 0).is_err());
    }

    #[test]
    fn test_board_size_serialization() {
        let serialized = serde_json::to_string(&BoardSize::DEFAULT).unwrap();
        assert_eq!(serialized, r#"{"width":10,"height":20}"#);
        let size: BoardSize = serde_json::from_str(&serialized).unwrap();
        assert_eq!(size, BoardSize::DEFAULT);

        assert!(serde_json::from_str::<BoardSize>(r#"{"width":4,"height":20}"#).is_err());
    }

    #[test]
    fn test_full_row_mask() {
        assert_eq!(BoardSize::DEFAULT.full_row_mask(), 0x3ff);
        assert_eq!(BoardSize::new(64, 20).unwrap().full_row_mask(), u64::MAX);
    }

    #[test]
    fn test_spawn_position() {
        let pos = BoardSize::DEFAULT.spawn_position();
        assert_eq!((pos.x(), pos.y()), (4, 0));
        let pos = BoardSize::new(13, 20).unwrap().spawn_position();
        assert_eq!(pos.x(), 5);
    }

    #[test]
    fn test_initial_board_is_empty() {
        let board = BitBoard::new(BoardSize::DEFAULT);
        assert_eq!(board.rows().len(), 20);
        assert_eq!(board.occupied_cell_count(), 0);
    }

    #[test]
    fn test_collision_with_bounds() {
        let board = BitBoard::new(BoardSize::DEFAULT);
        // horizontal I spans 4 columns
        assert!(!board.is_colliding(piece_at(PieceKind::I, 0, 6, 0)));
        assert!(board.is_colliding(piece_at(PieceKind::I, 0, 7, 0)));
        // vertical I spans 4 rows
        assert!(!board.is_colliding(piece_at(PieceKind::I, 1, 9, 16)));
        assert!(board.is_colliding(piece_at(PieceKind::I, 1, 9, 17)));
        assert!(board.is_colliding(piece_at(PieceKind::O, 0, 10, 0)));
    }

    #[test]
    fn test_collision_with_cells() {
        let board = BitBoard::from_ascii(
            r"
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            .#........
            ##........
            ",
        );
        assert!(board.is_colliding(piece_at(PieceKind::O, 0, 0, 18)));
        assert!(!board.is_colliding(piece_at(PieceKind::O, 0, 2, 18)));
        // downward T: its stem lands on (1, 18)
        assert!(board.is_colliding(piece_at(PieceKind::T, 2, 0, 17)));
        assert!(!board.is_colliding(piece_at(PieceKind::T, 2, 0, 16)));
    }

    #[test]
    fn test_fill_and_remove_piece() {
        let mut board = BitBoard::new(BoardSize::DEFAULT);
        let piece = piece_at(PieceKind::T, 0, 3, 18);
        board.fill_piece(piece);
        assert_eq!(board.occupied_cell_count(), 4);
        for (x, y) in piece.occupied_positions() {
            assert!(board.is_cell_occupied(x, y));
        }
        assert!(board.is_colliding(piece));

        board.remove_piece(piece);
        assert_eq!(board, BitBoard::new(BoardSize::DEFAULT));
    }

    #[test]
    fn test_clear_lines_single_line() {
        let mut board = BitBoard::new(BoardSize::DEFAULT);
        fill_row(&mut board, 19);
        board.rows[18] = 0b1;

        let cleared = board.clear_lines();
        assert_eq!(cleared, 1);
        assert_eq!(board.rows[19], 0b1);
        assert_eq!(board.rows[18], 0);
        assert_eq!(board.occupied_cell_count(), 1);
    }

    #[test]
    fn test_clear_lines_non_consecutive() {
        let mut board = BitBoard::new(BoardSize::DEFAULT);
        fill_row(&mut board, 19);
        board.rows[18] = 0b11;
        fill_row(&mut board, 17);
        board.rows[16] = 0b100;

        let cleared = board.clear_lines();
        assert_eq!(cleared, 2);
        assert_eq!(board.rows[19], 0b11);
        assert_eq!(board.rows[18], 0b100);
        assert!(board.rows[..18].iter().all(|row| *row == 0));
    }

    #[test]
    fn test_clear_lines_with_partial_lines() {
        let mut board = BitBoard::new(BoardSize::DEFAULT);
        board.rows[19] = 0x1ff;
        let before = board.clone();

        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, before);
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = BitBoard::new(BoardSize::DEFAULT);
        for y in 0..20 {
            fill_row(&mut board, y);
        }
        assert_eq!(board.clear_lines(), 20);
        assert_eq!(board.occupied_cell_count(), 0);
    }

    #[test]
    fn test_clear_lines_ignores_unused_bits() {
        let mut board = BitBoard::new(BoardSize::new(8, 8).unwrap());
        fill_row(&mut board, 7);
        assert!(board.is_row_filled(7));
        assert!(!board.is_row_filled(6));
        assert_eq!(board.clear_lines(), 1);
    }

    #[test]
    fn test_from_ascii_and_display() {
        let art = "\
            ........\n\
            ........\n\
            ........\n\
            ........\n\
            ........\n\
            ........\n\
            #.......\n\
            ##.....#\n";
        let board = BitBoard::from_ascii(art);
        assert_eq!(board.size(), BoardSize::new(8, 8).unwrap());
        assert!(board.is_cell_occupied(0, 6));
        assert!(board.is_cell_occupied(7, 7));
        assert!(!board.is_cell_occupied(8, 7));
        assert_eq!(board.to_string(), art);
    }
}
