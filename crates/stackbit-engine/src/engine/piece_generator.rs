use std::collections::VecDeque;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{ParsePieceKindError, PieceKind};

/// Produces the piece stream for a game.
///
/// Two sources are supported:
///
/// - uniform random draws over the 7 kinds from a seeded [`Pcg32`]
/// - a fixed sequence that repeats forever
///
/// One piece of lookahead is buffered so the driver can show the next piece
/// before it is drawn.
///
/// # Example
///
/// ```
/// use stackbit_engine::{PieceGenerator, PieceKind};
///
/// let mut pieces = PieceGenerator::from_sequence(vec![PieceKind::I, PieceKind::O]);
/// assert_eq!(pieces.peek_next(), PieceKind::I);
/// assert_eq!(pieces.pop_next(), PieceKind::I);
/// assert_eq!(pieces.pop_next(), PieceKind::O);
/// assert_eq!(pieces.pop_next(), PieceKind::I);
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    source: PieceSource,
    queue: VecDeque<PieceKind>,
}

#[derive(Debug, Clone)]
enum PieceSource {
    Random(Pcg32),
    Sequence { pieces: Vec<PieceKind>, cursor: usize },
}

impl PieceSource {
    fn draw(&mut self) -> PieceKind {
        match self {
            Self::Random(rng) => rng.random(),
            Self::Sequence { pieces, cursor } => {
                let kind = pieces[*cursor];
                *cursor = (*cursor + 1) % pieces.len();
                kind
            }
        }
    }
}

impl PieceGenerator {
    /// Uniform random pieces, reproducible for a given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_source(PieceSource::Random(Pcg32::seed_from_u64(seed)))
    }

    /// Cycles through `pieces` in order.
    ///
    /// # Panics
    ///
    /// Panics if `pieces` is empty.
    #[must_use]
    pub fn from_sequence(pieces: Vec<PieceKind>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self::with_source(PieceSource::Sequence { pieces, cursor: 0 })
    }

    fn with_source(mut source: PieceSource) -> Self {
        let queue = VecDeque::from([source.draw()]);
        Self { source, queue }
    }

    fn fill_queue(&mut self) {
        while self.queue.len() < 2 {
            let kind = self.source.draw();
            self.queue.push_back(kind);
        }
    }

    /// Returns the piece the next [`Self::pop_next`] call will yield.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.queue[0]
    }

    /// Draws the next piece.
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_queue();
        let kind = self.queue[0];
        self.queue.pop_front();
        kind
    }
}

impl Iterator for PieceGenerator {
    type Item = PieceKind;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.pop_next())
    }
}

/// Parses a piece sequence such as `"ITOJLSZ"`.
///
/// Whitespace and commas between letters are ignored; letters are
/// case-insensitive.
///
/// ```
/// use stackbit_engine::{PieceKind, parse_piece_sequence};
///
/// let seq = parse_piece_sequence("i, o s").unwrap();
/// assert_eq!(seq, [PieceKind::I, PieceKind::O, PieceKind::S]);
/// ```
pub fn parse_piece_sequence(s: &str) -> Result<Vec<PieceKind>, ParsePieceKindError> {
    s.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .map(|ch| {
            PieceKind::from_char(ch.to_ascii_uppercase()).ok_or_else(|| ParsePieceKindError {
                text: ch.to_string(),
            })
        })
        .collect()
}
