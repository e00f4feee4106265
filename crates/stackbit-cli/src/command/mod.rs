use std::{
    io::{self, Write as _},
    str::FromStr,
};

use anyhow::Context as _;
use clap::{ArgGroup, Parser};
use rand::Rng as _;
use stackbit_engine::{ParsePieceKindError, PieceGenerator, PieceKind, parse_piece_sequence};
use stackbit_evaluator::{
    move_search::{MoveSearch, SearchStrategy},
    placement_evaluator::DellacherieEvaluator,
};
use tracing::{Level, info};

use self::play::{GameConfig, PlayMode, StrategyPolicy};
use crate::logging;

mod play;

/// Automatic Tetris player driven by a Dellacherie evaluator.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").args(["auto", "interactive"])))]
#[command(group(ArgGroup::new("strategy").args(["step", "twostep", "beam"])))]
pub struct CommandArgs {
    /// Play to the end without pausing
    #[arg(short, long)]
    auto: bool,
    /// Show every move and wait for Enter (default)
    #[arg(short, long)]
    interactive: bool,
    /// Greedy one-ply search for every piece
    #[arg(short, long)]
    step: bool,
    /// Two-ply search using the next piece for every piece
    #[arg(short, long)]
    twostep: bool,
    /// Beam search with S/Z sampling for every piece
    #[arg(short, long)]
    beam: bool,
    /// Aggression level: single-line clears are avoided while the stack is
    /// lower than `3 + level` rows
    #[arg(value_parser = clap::value_parser!(u8).range(1..=5), default_value_t = 1)]
    level: u8,
    /// Seed for the piece generator (random when omitted)
    #[arg(long, conflicts_with = "sequence")]
    seed: Option<u64>,
    /// Fixed piece sequence, repeated forever (e.g. `ITOJLSZ`)
    #[arg(long)]
    sequence: Option<PieceSequence>,
    /// Game over once the stack is taller than this
    #[arg(long, default_value_t = 16)]
    height_limit: usize,
    /// Game over after this many pieces
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: usize,
    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
    /// Log level for diagnostics on stderr
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

#[derive(Debug, Clone)]
struct PieceSequence(Vec<PieceKind>);

#[derive(Debug, derive_more::Display, derive_more::Error)]
enum ParsePieceSequenceError {
    #[display("piece sequence is empty")]
    Empty,
    #[display("{_0}")]
    InvalidPiece(#[error(source)] ParsePieceKindError),
}

impl FromStr for PieceSequence {
    type Err = ParsePieceSequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pieces = parse_piece_sequence(s).map_err(ParsePieceSequenceError::InvalidPiece)?;
        if pieces.is_empty() {
            return Err(ParsePieceSequenceError::Empty);
        }
        Ok(Self(pieces))
    }
}

impl CommandArgs {
    fn play_mode(&self) -> PlayMode {
        if self.auto {
            PlayMode::Auto
        } else {
            PlayMode::Interactive
        }
    }

    fn strategy_policy(&self) -> StrategyPolicy {
        if self.step {
            StrategyPolicy::Fixed(SearchStrategy::Greedy)
        } else if self.twostep {
            StrategyPolicy::Fixed(SearchStrategy::TwoPly)
        } else if self.beam {
            StrategyPolicy::Fixed(SearchStrategy::Beam)
        } else {
            StrategyPolicy::Adaptive
        }
    }

    fn piece_generator(&self) -> PieceGenerator {
        if let Some(PieceSequence(pieces)) = &self.sequence {
            info!(length = pieces.len(), "using fixed piece sequence");
            return PieceGenerator::from_sequence(pieces.clone());
        }
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, "using random pieces");
        PieceGenerator::with_seed(seed)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.log_level)?;

    let evaluator =
        DellacherieEvaluator::default().with_single_clear_ceiling(3 + usize::from(args.level));
    let search = MoveSearch::new(Box::new(evaluator));
    let mut pieces = args.piece_generator();
    let config = GameConfig {
        mode: args.play_mode(),
        policy: args.strategy_policy(),
        height_limit: args.height_limit,
        max_steps: args.max_steps,
    };
    info!(?config, level = args.level, "starting game");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let summary = play::play(&search, &mut pieces, &config, &mut out, &mut input)?;
    info!(end = %summary.end, steps = summary.stats.completed_pieces(), "game over");

    if args.json {
        serde_json::to_writer_pretty(&mut out, &summary)
            .context("Failed to write JSON summary to stdout")?;
        writeln!(out)?;
    } else {
        summary.write_text(&mut out)?;
    }
    Ok(())
}
