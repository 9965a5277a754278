//! Board metrics measured on the board as it looks after line clears.
//!
//! [`BoardAnalysis`] borrows a board that may still contain full rows (the
//! solver's scratch board right after a piece was written) and measures the
//! post-clear view: full rows removed, the remaining rows shifted to the
//! bottom and empty rows entering at the top. The board itself is never
//! modified, so the caller can undo its placement exactly.
//!
//! Metrics are computed lazily and cached.

use std::cell::OnceCell;

use blockfall_engine::{BitBoard, BoardSize};

#[derive(Debug)]
pub struct BoardAnalysis<'a> {
    board: &'a BitBoard,
    full_mask: u64,
    cleared_lines: OnceCell<usize>,
    row_transitions: OnceCell<u32>,
    column_transitions: OnceCell<u32>,
    num_holes: OnceCell<u32>,
    well_sums: OnceCell<u32>,
}

impl<'a> BoardAnalysis<'a> {
    #[must_use]
    pub fn from_board(board: &'a BitBoard) -> Self {
        Self {
            board,
            full_mask: board.size().full_row_mask(),
            cleared_lines: OnceCell::new(),
            row_transitions: OnceCell::new(),
            column_transitions: OnceCell::new(),
            num_holes: OnceCell::new(),
            well_sums: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &'a BitBoard {
        self.board
    }

    /// Rows that survive the line clear, top to bottom.
    fn kept_rows(&self) -> impl Iterator<Item = u64> + '_ {
        let full = self.full_mask;
        self.board
            .rows()
            .iter()
            .copied()
            .filter(move |row| row & full != full)
    }

    /// Number of full rows removed by the line clear.
    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        *self
            .cleared_lines
            .get_or_init(|| self.board.height() - self.kept_rows().count())
    }

    /// Occupied/empty changes along every row.
    ///
    /// The left wall counts as occupied and an empty last cell adds one more
    /// transition for the right wall, so an empty row has two.
    #[must_use]
    pub fn row_transitions(&self) -> u32 {
        *self.row_transitions.get_or_init(|| {
            let last_bit = self.board.width() - 1;
            let mask = u128::from(self.full_mask);
            let kept: u32 = self
                .kept_rows()
                .map(|row| {
                    // bit 0 is the left wall, bit x + 1 is cell x
                    let cells = (u128::from(row) << 1) | 1;
                    let changes = ((cells ^ (cells >> 1)) & mask).count_ones();
                    let right_wall = u32::from((row >> last_bit) & 1 == 0);
                    changes + right_wall
                })
                .sum();
            let cleared = u32::try_from(self.cleared_lines()).unwrap_or(u32::MAX);
            kept + 2 * cleared
        })
    }

    /// Occupied/empty changes down every column.
    ///
    /// The space above the board counts as empty and an empty bottom cell
    /// adds one more transition for the floor.
    #[must_use]
    pub fn column_transitions(&self) -> u32 {
        *self.column_transitions.get_or_init(|| {
            let mut transitions = 0;
            let mut prev = 0;
            for row in self.kept_rows() {
                transitions += (prev ^ row).count_ones();
                prev = row;
            }
            transitions + (!prev & self.full_mask).count_ones()
        })
    }

    /// Empty cells lying strictly below the topmost occupied cell of their column.
    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            let mut holes = 0;
            let mut covered = 0;
            for row in self.kept_rows() {
                holes += (covered & !row).count_ones();
                covered |= row;
            }
            holes
        })
    }

    /// Sum of `n * (n + 1) / 2` over every vertical run of well cells.
    ///
    /// A well cell is empty and has an occupied cell or a wall on both sides.
    #[must_use]
    pub fn well_sums(&self) -> u32 {
        *self.well_sums.get_or_init(|| {
            let width = self.board.width();
            let right_wall = 1 << (width - 1);
            let mut depths = [0u32; BoardSize::MAX_WIDTH];
            let mut sum = 0;
            for row in self.kept_rows() {
                let left_occupied = (row << 1) | 1;
                let right_occupied = (row >> 1) | right_wall;
                let wells = !row & left_occupied & right_occupied & self.full_mask;
                for (x, depth) in depths[..width].iter_mut().enumerate() {
                    if (wells >> x) & 1 != 0 {
                        *depth += 1;
                        sum += *depth;
                    } else {
                        *depth = 0;
                    }
                }
            }
            sum
        })
    }
}
