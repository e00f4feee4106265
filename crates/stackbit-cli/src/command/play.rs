use std::{
    io::{self, BufRead, Write},
    time::{Duration, Instant},
};

use serde::Serialize;
use stackbit_engine::{Board, BoardCounters, GameStats, PieceGenerator};
use stackbit_evaluator::move_search::{MoveSearch, SearchStrategy};
use tracing::debug;

use crate::render;

/// Stack height below which the adaptive policy can afford two-ply search.
const ADAPTIVE_TWO_PLY_CEILING: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayMode {
    Auto,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrategyPolicy {
    Fixed(SearchStrategy),
    /// Two-ply while the stack is low, beam search once it grows.
    Adaptive,
}

impl StrategyPolicy {
    fn strategy_for(self, board: &Board) -> SearchStrategy {
        match self {
            Self::Fixed(strategy) => strategy,
            Self::Adaptive if board.max_height() < ADAPTIVE_TWO_PLY_CEILING => {
                SearchStrategy::TwoPly
            }
            Self::Adaptive => SearchStrategy::Beam,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GameConfig {
    pub(crate) mode: PlayMode,
    pub(crate) policy: StrategyPolicy,
    pub(crate) height_limit: usize,
    pub(crate) max_steps: usize,
}

/// Why the game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum GameEnd {
    #[display("stack above height limit")]
    HeightLimit,
    #[display("piece did not fit")]
    Rejected,
    #[display("step limit reached")]
    StepLimit,
    #[display("input closed")]
    InputClosed,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GameSummary {
    pub(crate) end: GameEnd,
    #[serde(flatten)]
    pub(crate) stats: GameStats,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub(crate) elapsed: Duration,
    pub(crate) final_board: Board,
    pub(crate) final_counters: BoardCounters,
}

fn serialize_secs<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl GameSummary {
    pub(crate) fn write_text<W>(&self, out: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        writeln!(out, "Game over at step {}!", self.stats.completed_pieces())?;
        writeln!(
            out,
            "Final score: {}, Total lines: {}",
            self.stats.score(),
            self.stats.total_cleared_lines()
        )?;
        writeln!(
            out,
            "Total elapsed time: {:.3} seconds",
            self.elapsed.as_secs_f64()
        )
    }
}

/// Plays one game to the end.
///
/// Interactive mode writes the planned move, the board and the score to
/// `out` before every placement and waits for a line on `input`.
pub(crate) fn play<W, R>(
    search: &MoveSearch<'_>,
    pieces: &mut PieceGenerator,
    config: &GameConfig,
    out: &mut W,
    input: &mut R,
) -> anyhow::Result<GameSummary>
where
    W: Write,
    R: BufRead,
{
    let start = Instant::now();
    let mut board = Board::new();
    let mut stats = GameStats::new();
    let mut current = pieces.pop_next();

    let end = loop {
        let next = pieces.peek_next();
        let strategy = config.policy.strategy_for(&board);
        let mv = search.select_move(strategy, &board, current, Some(next));

        if config.mode == PlayMode::Interactive {
            write!(
                out,
                "{}",
                render::pieces_side_by_side(
                    mv.column,
                    current.rotation(mv.rotation),
                    next.rotation(0)
                )
            )?;
            write!(out, "{}", render::board(&board))?;
            writeln!(
                out,
                "Current score: {}, Total lines: {}",
                stats.score(),
                stats.total_cleared_lines()
            )?;
            out.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break GameEnd::InputClosed;
            }
        }

        let Some(rows) = board.place(current, mv.rotation, mv.column).rows_eliminated() else {
            break GameEnd::Rejected;
        };
        stats.complete_piece_drop(rows);
        debug!(
            step = stats.completed_pieces(),
            piece = %current,
            %mv,
            %strategy,
            rows,
            max_height = board.max_height(),
            holes = board.holes(),
            "placed piece"
        );

        if board.max_height() > config.height_limit {
            break GameEnd::HeightLimit;
        }
        if stats.completed_pieces() >= config.max_steps {
            break GameEnd::StepLimit;
        }
        current = pieces.pop_next();
    };

    Ok(GameSummary {
        end,
        stats,
        elapsed: start.elapsed(),
        final_counters: board.counters(),
        final_board: board,
    })
}

#[cfg(test)]
mod tests {
    use stackbit_engine::PieceKind;
    use stackbit_evaluator::placement_evaluator::DellacherieEvaluator;

    use super::*;

    fn search() -> MoveSearch<'static> {
        MoveSearch::new(Box::new(DellacherieEvaluator::default()))
    }

    fn auto_config(policy: StrategyPolicy, max_steps: usize) -> GameConfig {
        GameConfig {
            mode: PlayMode::Auto,
            policy,
            height_limit: 16,
            max_steps,
        }
    }

    #[test]
    fn test_adaptive_policy_switches_on_height() {
        let low = Board::new();
        let rows = ["#########."; 7].join("\n");
        let high = Board::from_ascii(&rows);
        assert_eq!(
            StrategyPolicy::Adaptive.strategy_for(&low),
            SearchStrategy::TwoPly
        );
        assert_eq!(
            StrategyPolicy::Adaptive.strategy_for(&high),
            SearchStrategy::Beam
        );
        assert_eq!(
            StrategyPolicy::Fixed(SearchStrategy::Greedy).strategy_for(&high),
            SearchStrategy::Greedy
        );
    }

    #[test]
    fn test_auto_game_stops_at_step_limit() {
        let mut pieces = PieceGenerator::with_seed(1);
        let config = auto_config(StrategyPolicy::Adaptive, 50);
        let mut out = Vec::new();
        let summary = play(&search(), &mut pieces, &config, &mut out, &mut io::empty()).unwrap();

        assert_eq!(summary.end, GameEnd::StepLimit);
        assert_eq!(summary.stats.completed_pieces(), 50);
        assert!(summary.final_board.max_height() <= 16);
        assert_eq!(summary.final_board, summary.final_board.rescanned());
        assert!(out.is_empty());
    }

    #[test]
    fn test_o_pieces_clear_lines() {
        // Five O pieces fill two rows exactly.
        let mut pieces = PieceGenerator::from_sequence(vec![PieceKind::O]);
        let config = auto_config(StrategyPolicy::Fixed(SearchStrategy::Greedy), 5);
        let summary =
            play(&search(), &mut pieces, &config, &mut Vec::new(), &mut io::empty()).unwrap();

        assert_eq!(summary.stats.total_cleared_lines(), 2);
        assert_eq!(summary.stats.score(), 300);
        assert_eq!(summary.final_board.playable_bits(), [0; Board::PLAYABLE_HEIGHT]);
        assert_eq!(summary.final_board.counters(), Board::new().counters());
    }

    #[test]
    fn test_interactive_prints_and_waits() {
        let mut pieces = PieceGenerator::from_sequence(vec![PieceKind::I, PieceKind::T]);
        let config = GameConfig {
            mode: PlayMode::Interactive,
            ..auto_config(StrategyPolicy::Fixed(SearchStrategy::TwoPly), 10)
        };
        let mut out = Vec::new();
        let mut input = io::Cursor::new("\n\n");
        let summary = play(&search(), &mut pieces, &config, &mut out, &mut input).unwrap();

        assert_eq!(summary.end, GameEnd::InputClosed);
        assert_eq!(summary.stats.completed_pieces(), 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Current score: 0, Total lines: 0").count(), 3);
    }

    #[test]
    fn test_summary_text_and_json() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(1);
        let summary = GameSummary {
            end: GameEnd::HeightLimit,
            stats,
            elapsed: Duration::from_millis(1500),
            final_board: Board::new(),
            final_counters: Board::new().counters(),
        };

        let mut text = Vec::new();
        summary.write_text(&mut text).unwrap();
        assert_eq!(
            String::from_utf8(text).unwrap(),
            "Game over at step 1!\nFinal score: 100, Total lines: 1\nTotal elapsed time: 1.500 seconds\n"
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["end"], "height-limit");
        assert_eq!(json["score"], 100);
        assert_eq!(json["completed_pieces"], 1);
        assert_eq!(json["elapsed_secs"], 1.5);
        assert_eq!(json["clears_by_size"][1], 1);
        assert_eq!(json["final_counters"]["holes"], 0);
        assert_eq!(json["final_counters"]["row_transitions"], 40);
        assert_eq!(json["final_counters"]["col_transitions"], 10);
        assert_eq!(json["final_counters"]["wells"], 0);
    }
}
