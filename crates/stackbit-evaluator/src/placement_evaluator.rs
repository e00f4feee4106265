//! Placement evaluation: scoring the board left behind by one placement.
//!
//! The [`DellacherieEvaluator`] computes a weighted sum of six features:
//!
//! ```text
//! score = w_landing · landing_height
//!       + elimination_term
//!       + w_row_transitions · row_transitions
//!       + w_column_transitions · column_transitions
//!       + w_holes · holes
//!       + w_wells · wells
//! ```
//!
//! Where:
//!
//! - `landing_height` is the centre of gravity of the piece just placed,
//!   `Σ(row span × absolute row) / 4`
//! - `elimination_term` is `w_rows · rows_eliminated`, except that a single
//!   line cleared while the stack is still low is *penalised* by `w_rows`
//!
//! Weights are real constants converted once to fixed point
//! ([`FIXED_POINT_BASE`]) so that all scores are exact `i64` sums.
//!
//! # Usage
//!
//! ```
//! use stackbit_engine::{Board, PieceKind};
//! use stackbit_evaluator::placement_evaluator::{
//!     DellacherieEvaluator, PlacementEvaluator, Score,
//! };
//!
//! let evaluator = DellacherieEvaluator::default();
//! let mut board = Board::new();
//! let outcome = board.place(PieceKind::O, 0, 4);
//!
//! let score = evaluator.evaluate_placement(&board, outcome);
//! assert!(score > Score::IMPOSSIBLE);
//! ```

use std::fmt;

use stackbit_engine::{Board, PlacementOutcome};

/// Scale applied to real-valued weights before summing.
pub const FIXED_POINT_BASE: i64 = 1_000_000;

/// Fixed-point placement score; larger is better.
///
/// [`Score::IMPOSSIBLE`] marks a rejected placement. It orders below every
/// other score and absorbs any combination it takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(i64);

impl Score {
    pub const IMPOSSIBLE: Self = Self(i64::MIN);
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn is_impossible(self) -> bool {
        self == Self::IMPOSSIBLE
    }

    /// Adds two scores; an impossible operand makes the result impossible.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        if self.is_impossible() || other.is_impossible() {
            return Self::IMPOSSIBLE;
        }
        Self(self.0.saturating_add(other.0).max(i64::MIN + 1))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_impossible() {
            return f.write_str("impossible");
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let base = FIXED_POINT_BASE.unsigned_abs();
        write!(f, "{sign}{}.{:06}", abs / base, abs % base)
    }
}

/// Real-valued feature weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub landing_height: f64,
    pub rows_eliminated: f64,
    pub row_transitions: f64,
    pub column_transitions: f64,
    pub holes: f64,
    pub wells: f64,
}

impl Weights {
    /// Pierre Dellacherie's hand-tuned weights.
    pub const DELLACHERIE: Self = Self {
        landing_height: -4.500_158_825_082_766,
        rows_eliminated: 3.418_126_810_139_269_4,
        row_transitions: -3.217_888_286_848_775_3,
        column_transitions: -9.348_695_305_445_199,
        holes: -7.899_265_427_351_652,
        wells: -3.385_597_224_726_362_6,
    };
}

impl Default for Weights {
    fn default() -> Self {
        Self::DELLACHERIE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FixedWeights {
    landing_height: i64,
    rows_eliminated: i64,
    row_transitions: i64,
    column_transitions: i64,
    holes: i64,
    wells: i64,
}

impl FixedWeights {
    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_weights(weights: &Weights) -> Self {
        let fixed = |w: f64| (w * FIXED_POINT_BASE as f64).round() as i64;
        Self {
            landing_height: fixed(weights.landing_height),
            rows_eliminated: fixed(weights.rows_eliminated),
            row_transitions: fixed(weights.row_transitions),
            column_transitions: fixed(weights.column_transitions),
            holes: fixed(weights.holes),
            wells: fixed(weights.wells),
        }
    }
}

/// Scores placements.
///
/// Both methods take the board *after* [`Board::place`] together with the
/// outcome it returned; a [`PlacementOutcome::Rejected`] outcome always
/// scores [`Score::IMPOSSIBLE`].
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Full evaluation of the placement (higher is better).
    fn evaluate_placement(&self, board: &Board, outcome: PlacementOutcome) -> Score;

    /// Landing-height contribution alone, used to credit earlier plies of a
    /// lookahead search.
    fn placement_bonus(&self, board: &Board, outcome: PlacementOutcome) -> Score;
}

/// Default stack height below which a single-line clear is penalised.
pub const DEFAULT_SINGLE_CLEAR_CEILING: usize = 4;

/// Fixed-weight Dellacherie evaluator.
///
/// # Example
///
/// ```
/// use stackbit_evaluator::placement_evaluator::{DellacherieEvaluator, Weights};
///
/// let evaluator = DellacherieEvaluator::new(&Weights::DELLACHERIE)
///     .with_single_clear_ceiling(6);
/// assert_eq!(evaluator.single_clear_ceiling(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct DellacherieEvaluator {
    weights: FixedWeights,
    single_clear_ceiling: usize,
}

impl Default for DellacherieEvaluator {
    fn default() -> Self {
        Self::new(&Weights::DELLACHERIE)
    }
}

impl DellacherieEvaluator {
    #[must_use]
    pub fn new(weights: &Weights) -> Self {
        Self {
            weights: FixedWeights::from_weights(weights),
            single_clear_ceiling: DEFAULT_SINGLE_CLEAR_CEILING,
        }
    }

    /// Sets the stack height below which clearing exactly one line is
    /// penalised instead of rewarded. `0` disables the penalty.
    #[must_use]
    pub fn with_single_clear_ceiling(mut self, ceiling: usize) -> Self {
        self.single_clear_ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn single_clear_ceiling(&self) -> usize {
        self.single_clear_ceiling
    }

    fn landing_term(&self, board: &Board) -> Option<i64> {
        let last = board.last_move()?;
        let shape = last.kind().rotation(last.rotation());
        let weighted_rows: usize = shape
            .row_runs()
            .iter()
            .enumerate()
            .map(|(dy, run)| run.span() * (last.landing_row() + dy))
            .sum();
        Some(self.weights.landing_height * to_i64(weighted_rows) / 4)
    }

    fn elimination_term(&self, board: &Board, rows_eliminated: usize) -> i64 {
        if rows_eliminated == 1 && board.max_height() < self.single_clear_ceiling {
            return -self.weights.rows_eliminated;
        }
        self.weights.rows_eliminated * to_i64(rows_eliminated)
    }
}

impl PlacementEvaluator for DellacherieEvaluator {
    fn evaluate_placement(&self, board: &Board, outcome: PlacementOutcome) -> Score {
        let PlacementOutcome::Placed {
            rows_eliminated, ..
        } = outcome
        else {
            return Score::IMPOSSIBLE;
        };
        let Some(landing) = self.landing_term(board) else {
            return Score::IMPOSSIBLE;
        };
        let w = &self.weights;
        let counters = board.counters();
        let score = landing
            + self.elimination_term(board, rows_eliminated)
            + w.row_transitions * i64::from(counters.row_transitions)
            + w.column_transitions * i64::from(counters.col_transitions)
            + w.holes * i64::from(counters.holes)
            + w.wells * i64::from(counters.wells);
        Score(score)
    }

    fn placement_bonus(&self, board: &Board, outcome: PlacementOutcome) -> Score {
        if outcome.is_rejected() {
            return Score::IMPOSSIBLE;
        }
        self.landing_term(board).map_or(Score::IMPOSSIBLE, Score)
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
