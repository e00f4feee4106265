use stackbit_engine::{Board, PieceKind};

use super::{BestMove, Move, candidates};
use crate::placement_evaluator::{PlacementEvaluator, Score};

/// One-ply search: the best evaluated placement of `current`.
pub(super) fn select(
    evaluator: &dyn PlacementEvaluator,
    board: &Board,
    current: PieceKind,
) -> Option<(Move, Score)> {
    let mut best = BestMove::default();
    for candidate in candidates(evaluator, board, current) {
        best.offer(candidate.mv, candidate.score);
    }
    best.into_inner()
}
