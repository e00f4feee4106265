//! Move search: choosing a `(rotation, column)` for the current piece.
//!
//! Every strategy enumerates moves in the same order (rotation ascending,
//! then column ascending), simulates each on its own [`Board`] copy and
//! compares totals with a strict `>`, so the first enumerated move wins
//! ties. Rejected placements are never candidates; when every move of the
//! current piece is rejected the search returns [`Move::default`]
//! (rotation 0, column 0) and the caller's `place` reports the game over.
//!
//! # Strategies
//!
//! - [`SearchStrategy::Greedy`] - best single placement of the current piece
//! - [`SearchStrategy::TwoPly`] - every placement of the current piece
//!   followed by the best placement of the next piece
//! - [`SearchStrategy::Beam`] - [`BEAM_WIDTH`] best placements of each of the
//!   two known pieces, then an adversarial third ply over
//!   [`ADVERSARIAL_PIECES`]
//!
//! # Usage
//!
//! ```
//! use stackbit_engine::{Board, PieceKind};
//! use stackbit_evaluator::{
//!     move_search::{Move, MoveSearch, SearchStrategy},
//!     placement_evaluator::DellacherieEvaluator,
//! };
//!
//! let search = MoveSearch::new(Box::new(DellacherieEvaluator::default()));
//! let board = Board::from_ascii("######....");
//!
//! let mv = search.select_move(SearchStrategy::Greedy, &board, PieceKind::I, None);
//! assert_eq!(mv, Move { rotation: 0, column: 6 });
//! ```

use arrayvec::ArrayVec;
use stackbit_engine::{Board, PieceKind};

use crate::placement_evaluator::{PlacementEvaluator, Score};

mod beam;
mod greedy;
mod two_ply;

/// Number of candidates the beam search keeps per ply.
pub const BEAM_WIDTH: usize = 6;

/// Pieces the beam search assumes an adversary may deal on its third ply.
pub const ADVERSARIAL_PIECES: [PieceKind; 2] = [PieceKind::S, PieceKind::Z];

/// Upper bound on `(rotation, column)` pairs for any piece.
const MAX_CANDIDATES: usize = 40;

/// A placement choice: rotation index and left column of the bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[display("rotation {rotation}, column {column}")]
pub struct Move {
    pub rotation: usize,
    pub column: usize,
}

/// Search strategy to use for one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SearchStrategy {
    #[display("greedy")]
    Greedy,
    #[display("two-ply")]
    TwoPly,
    #[display("beam")]
    Beam,
}

/// Every move of `kind` that fits horizontally, in enumeration order.
pub fn legal_moves(kind: PieceKind) -> impl Iterator<Item = Move> {
    kind.rotations()
        .iter()
        .enumerate()
        .flat_map(|(rotation, shape)| {
            (0..=Board::PLAYABLE_WIDTH - shape.width()).map(move |column| Move { rotation, column })
        })
}

/// A move simulated on its own board copy.
#[derive(Debug, Clone)]
struct Candidate {
    mv: Move,
    board: Board,
    score: Score,
    bonus: Score,
}

/// Simulates every legal move of `kind` on `board`, dropping rejected ones.
fn candidates(
    evaluator: &dyn PlacementEvaluator,
    board: &Board,
    kind: PieceKind,
) -> ArrayVec<Candidate, MAX_CANDIDATES> {
    let mut result = ArrayVec::new();
    for mv in legal_moves(kind) {
        let mut board = board.clone();
        let outcome = board.place(kind, mv.rotation, mv.column);
        if outcome.is_rejected() {
            continue;
        }
        let score = evaluator.evaluate_placement(&board, outcome);
        let bonus = evaluator.placement_bonus(&board, outcome);
        result.push(Candidate {
            mv,
            board,
            score,
            bonus,
        });
    }
    result
}

/// Best evaluation over all placements of `kind`, or
/// [`Score::IMPOSSIBLE`] when every placement is rejected.
fn best_score(evaluator: &dyn PlacementEvaluator, board: &Board, kind: PieceKind) -> Score {
    candidates(evaluator, board, kind)
        .iter()
        .map(|c| c.score)
        .max()
        .unwrap_or(Score::IMPOSSIBLE)
}

/// Keeps the first of equally good moves.
#[derive(Debug, Default)]
struct BestMove(Option<(Move, Score)>);

impl BestMove {
    fn offer(&mut self, mv: Move, score: Score) {
        if self.0.is_none_or(|(_, best)| score > best) {
            self.0 = Some((mv, score));
        }
    }

    fn into_inner(self) -> Option<(Move, Score)> {
        self.0
    }
}

/// Picks moves with any [`SearchStrategy`] using one placement evaluator.
#[derive(Debug)]
pub struct MoveSearch<'a> {
    evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> MoveSearch<'a> {
    #[must_use]
    pub fn new(evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self { evaluator }
    }

    #[must_use]
    pub fn evaluator(&self) -> &dyn PlacementEvaluator {
        self.evaluator.as_ref()
    }

    /// Chooses a move for `current` on `board`, looking at `next` when the
    /// strategy uses it. `board` is never modified.
    #[must_use]
    pub fn select_move(
        &self,
        strategy: SearchStrategy,
        board: &Board,
        current: PieceKind,
        next: Option<PieceKind>,
    ) -> Move {
        self.select_move_with_score(strategy, board, current, next)
            .map_or_else(Move::default, |(mv, _)| mv)
    }

    /// Like [`Self::select_move`], but also returns the strategy's total for
    /// the chosen move. `None` when every move of `current` is rejected.
    #[must_use]
    pub fn select_move_with_score(
        &self,
        strategy: SearchStrategy,
        board: &Board,
        current: PieceKind,
        next: Option<PieceKind>,
    ) -> Option<(Move, Score)> {
        let evaluator = self.evaluator();
        let best = match (strategy, next) {
            (SearchStrategy::Greedy, _) | (SearchStrategy::TwoPly, None) => {
                greedy::select(evaluator, board, current)
            }
            (SearchStrategy::TwoPly, Some(next)) => two_ply::select(evaluator, board, current, next),
            (SearchStrategy::Beam, next) => beam::select(evaluator, board, current, next),
        };
        if let Some((mv, score)) = best {
            tracing::trace!(%strategy, piece = %current, %mv, %score, "selected move");
        }
        best
    }
}
