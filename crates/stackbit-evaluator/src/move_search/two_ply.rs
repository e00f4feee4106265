use stackbit_engine::{Board, PieceKind};

use super::{BestMove, Move, best_score, candidates};
use crate::placement_evaluator::{PlacementEvaluator, Score};

/// Exhaustive two-ply search.
///
/// Each placement of `current` is valued by the best evaluation reachable
/// with `next` on the resulting board, plus the landing-height bonus of the
/// first placement itself.
pub(super) fn select(
    evaluator: &dyn PlacementEvaluator,
    board: &Board,
    current: PieceKind,
    next: PieceKind,
) -> Option<(Move, Score)> {
    let mut best = BestMove::default();
    for first in candidates(evaluator, board, current) {
        let total = first
            .bonus
            .combine(best_score(evaluator, &first.board, next));
        best.offer(first.mv, total);
    }
    best.into_inner()
}
