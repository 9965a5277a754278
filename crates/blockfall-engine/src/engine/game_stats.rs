use serde::{Deserialize, Serialize};

/// Points awarded per clear, indexed by the number of rows removed at once.
///
/// Clears of
/// more than four rows (possible only with very tall pieces on custom boards,
/// never with tetrominoes) score as four.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Running totals of a single game.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut totals = GameStats::default();
/// totals.record_lock();
/// totals.record_clear(4);
/// assert_eq!((totals.placed_pieces(), totals.score()), (1, 800));
/// assert_eq!(totals.line_cleared_counter(), &[0, 0, 0, 0, 1]);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    placed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            placed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Pieces locked into the board so far.
    #[must_use]
    pub const fn placed_pieces(&self) -> usize {
        self.placed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Clear checks bucketed by rows removed.
    ///
    /// Index 0 counts checks that cleared nothing, index 4 counts clears of
    /// four or more rows.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    pub fn record_lock(&mut self) {
        self.placed_pieces += 1;
    }

    /// Updates statistics after the lines completed by a lock are cleared.
    pub fn record_clear(&mut self, cleared_lines: usize) {
        let index = cleared_lines.min(SCORE_TABLE.len() - 1);
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[index] += 1;
        self.score += SCORE_TABLE[index];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lock() {
        let mut totals = GameStats::new();
        for lines in [0, 1, 2, 3, 4, 1] {
            totals.record_lock();
            totals.record_clear(lines);
        }
        assert_eq!(totals.placed_pieces(), 6);
        assert_eq!(totals.total_cleared_lines(), 11);
        assert_eq!(totals.score(), 100 + 300 + 500 + 800 + 100);
        assert_eq!(totals.line_cleared_counter(), &[1, 2, 1, 1, 1]);
    }

    #[test]
    fn test_large_clears_score_as_four() {
        let mut stats = GameStats::default();
        stats.record_clear(6);
        assert_eq!(stats.placed_pieces(), 0);
        assert_eq!(stats.score(), 800);
        assert_eq!(stats.total_cleared_lines(), 6);
        assert_eq!(stats.line_cleared_counter()[4], 1);
    }
}
