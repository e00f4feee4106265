//! Move selection for the stackbit engine.
//!
//! This crate layers two pieces on top of [`stackbit_engine`]:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores the board left behind by a
//!    single placement with the fixed-weight Dellacherie formula.
//!
//! 2. **Move Search** ([`move_search`]) - Enumerates every `(rotation, column)` for the current
//!    piece, simulates each on a board copy, and picks a move using one of three strategies
//!    (greedy, two-ply, or beam search with adversarial sampling).
//!
//! # Architecture
//!
//! ```text
//! Move Search (pick a move, optionally looking ahead)
//!     ↓ uses
//! Placement Evaluation (score single placement)
//!     ↓ reads
//! Board counters (holes, transitions, wells, heights)
//! ```
//!
//! [`bounded_beam`] holds the fixed-capacity candidate set the beam search prunes with.
//!
//! # Example
//!
//! ```
//! use stackbit_engine::{Board, PieceKind};
//! use stackbit_evaluator::{
//!     move_search::{MoveSearch, SearchStrategy},
//!     placement_evaluator::DellacherieEvaluator,
//! };
//!
//! let search = MoveSearch::new(Box::new(DellacherieEvaluator::default()));
//! let board = Board::new();
//!
//! let mv = search.select_move(SearchStrategy::Beam, &board, PieceKind::T, Some(PieceKind::I));
//! assert!(mv.column + PieceKind::T.rotation(mv.rotation).width() <= Board::PLAYABLE_WIDTH);
//! ```
//!
//! All searches are pure functions of the input board: every branch owns its own
//! [`Board`](stackbit_engine::Board) copy and the caller's board is never mutated.

pub mod bounded_beam;
pub mod move_search;
pub mod placement_evaluator;
