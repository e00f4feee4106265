use serde::Serialize;

/// Points awarded for a drop, indexed by the number of rows it cleared.
pub const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Running totals for the summary line the driver prints at game over.
///
/// The move search never reads these; clears are rewarded there through
/// the evaluator instead.
///
/// ```
/// use stackbit_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(2);
/// stats.complete_piece_drop(0);
/// stats.complete_piece_drop(3);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.completed_pieces(), 3);
/// assert_eq!(stats.clears_by_size(), &[1, 0, 1, 1, 0]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    clears_by_size: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            clears_by_size: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Drop counts keyed by rows cleared; slot 0 holds drops that cleared nothing.
    #[must_use]
    pub const fn clears_by_size(&self) -> &[usize; 5] {
        &self.clears_by_size
    }

    /// Accounts for a piece that locked and took `rows` rows with it.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is above 4; no piece spans more rows than that.
    pub const fn complete_piece_drop(&mut self, rows: usize) {
        self.score += SCORE_TABLE[rows];
        self.clears_by_size[rows] += 1;
        self.total_cleared_lines += rows;
        self.completed_pieces += 1;
    }
}
