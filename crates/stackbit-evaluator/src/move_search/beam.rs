//! Beam search with an adversarial third ply.
//!
//! ```text
//! ply 1: current piece    keep BEAM_WIDTH best by evaluation
//! ply 2: next piece       keep BEAM_WIDTH best by evaluation
//! ply 3: S and Z          best reply to each, take the worse
//! ```
//!
//! A ply-2 node is worth its landing bonus plus the ply-3 worst case; a
//! ply-1 node is worth its landing bonus plus its best ply-2 node. Without a
//! known next piece the adversarial ply follows ply 1 directly.

use stackbit_engine::{Board, PieceKind};

use super::{ADVERSARIAL_PIECES, BEAM_WIDTH, BestMove, Candidate, Move, best_score, candidates};
use crate::{
    bounded_beam::BoundedBeam,
    placement_evaluator::{PlacementEvaluator, Score},
};

pub(super) fn select(
    evaluator: &dyn PlacementEvaluator,
    board: &Board,
    current: PieceKind,
    next: Option<PieceKind>,
) -> Option<(Move, Score)> {
    let mut best = BestMove::default();
    for (_, first) in top_candidates(evaluator, board, current) {
        let future = match next {
            Some(next) => top_candidates(evaluator, &first.board, next)
                .into_iter()
                .map(|(_, second)| second.bonus.combine(worst_case(evaluator, &second.board)))
                .max()
                .unwrap_or(Score::IMPOSSIBLE),
            None => worst_case(evaluator, &first.board),
        };
        let total = first.bonus.combine(future);
        tracing::trace!(mv = %first.mv, score = %first.score, %total, "beam candidate");
        best.offer(first.mv, total);
    }
    best.into_inner()
}

fn top_candidates(
    evaluator: &dyn PlacementEvaluator,
    board: &Board,
    kind: PieceKind,
) -> BoundedBeam<Candidate, BEAM_WIDTH> {
    let mut beam = BoundedBeam::new();
    for candidate in candidates(evaluator, board, kind) {
        beam.insert(candidate.score, candidate);
    }
    beam
}

/// Best achievable evaluation against the least favourable sampled piece.
fn worst_case(evaluator: &dyn PlacementEvaluator, board: &Board) -> Score {
    ADVERSARIAL_PIECES
        .iter()
        .map(|&kind| best_score(evaluator, board, kind))
        .min()
        .unwrap_or(Score::IMPOSSIBLE)
}
