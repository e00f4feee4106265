use std::str::FromStr;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Largest bounding box side of any piece rotation.
pub const MAX_PIECE_SIZE: usize = 4;

/// Contiguous run of occupied cells inside a rotation's bounding box.
///
/// Row runs are horizontal (`start..end` are columns), column runs are vertical
/// (`start..end` are rows, counted bottom-up). Runs are always derived from the
/// rotation's shape bitmask, never written by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Run {
    start: u8,
    end: u8,
}

impl Run {
    const EMPTY: Self = Self { start: 0, end: 0 };

    /// Skips the leading zero bits to find `start`, then the following one bits to find `end`.
    #[expect(clippy::cast_possible_truncation)]
    const fn scan(bits: u16) -> Self {
        if bits == 0 {
            return Self::EMPTY;
        }
        let start = bits.trailing_zeros();
        let end = start + (bits >> start).trailing_ones();
        assert!(
            end >= u16::BITS || bits >> end == 0,
            "piece cells must form one contiguous run"
        );
        Self {
            start: start as u8,
            end: end as u8,
        }
    }

    #[must_use]
    pub const fn start(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub const fn end(self) -> usize {
        self.end as usize
    }

    #[must_use]
    pub const fn span(self) -> usize {
        (self.end - self.start) as usize
    }
}

/// One orientation of a piece.
///
/// `shape[y]` holds the occupied columns of row `y` of the bounding box, rows
/// ordered bottom to top, bit `x` set for column `x`.
///
/// # Example
///
/// ```
/// use stackbit_engine::PieceKind;
///
/// // T pointing up: ###
/// //                .#.
/// let t = PieceKind::T.rotation(0);
/// assert_eq!((t.width(), t.height()), (3, 2));
/// assert_eq!(t.column_runs()[1].start(), 0);
/// assert_eq!(t.column_runs()[1].end(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    width: u8,
    height: u8,
    shape: [u16; MAX_PIECE_SIZE],
    row_runs: [Run; MAX_PIECE_SIZE],
    column_runs: [Run; MAX_PIECE_SIZE],
}

impl Rotation {
    const EMPTY: Self = Self {
        width: 0,
        height: 0,
        shape: [0; MAX_PIECE_SIZE],
        row_runs: [Run::EMPTY; MAX_PIECE_SIZE],
        column_runs: [Run::EMPTY; MAX_PIECE_SIZE],
    };

    /// One-time derivation of the bounding box and all runs from a shape bitmask.
    #[expect(clippy::cast_possible_truncation)]
    const fn from_shape(shape: [u16; MAX_PIECE_SIZE]) -> Self {
        let mut height = 0;
        while height < MAX_PIECE_SIZE && shape[height] != 0 {
            height += 1;
        }

        let mut width = 0;
        let mut row_runs = [Run::EMPTY; MAX_PIECE_SIZE];
        let mut y = 0;
        while y < height {
            let row_width = (u16::BITS - shape[y].leading_zeros()) as usize;
            if row_width > width {
                width = row_width;
            }
            row_runs[y] = Run::scan(shape[y]);
            y += 1;
        }
        assert!(width <= MAX_PIECE_SIZE);

        let mut column_runs = [Run::EMPTY; MAX_PIECE_SIZE];
        let mut x = 0;
        while x < width {
            let mut bits = 0;
            let mut y = 0;
            while y < height {
                if shape[y] & (1 << x) != 0 {
                    bits |= 1 << y;
                }
                y += 1;
            }
            column_runs[x] = Run::scan(bits);
            x += 1;
        }

        Self {
            width: width as u8,
            height: height as u8,
            shape,
            row_runs,
            column_runs,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Row bitmasks of the bounding box, bottom to top.
    #[must_use]
    pub fn shape(&self) -> &[u16] {
        &self.shape[..self.height()]
    }

    /// Horizontal run of each row, bottom to top.
    #[must_use]
    pub fn row_runs(&self) -> &[Run] {
        &self.row_runs[..self.height()]
    }

    /// Vertical run of each column, left to right.
    #[must_use]
    pub fn column_runs(&self) -> &[Run] {
        &self.column_runs[..self.width()]
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        y < self.height() && self.shape[y] & (1 << x) != 0
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// T-piece.
    T = 1,
    /// O-piece.
    O = 2,
    /// J-piece.
    J = 3,
    /// L-piece.
    L = 4,
    /// S-piece.
    S = 5,
    /// Z-piece.
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::T,
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::S,
        PieceKind::Z,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Returns every distinct rotation of this piece, in catalog order.
    #[must_use]
    pub fn rotations(self) -> &'static [Rotation] {
        PieceCatalog::standard().rotations(self)
    }

    /// Returns one rotation of this piece.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `self.rotations().len()`.
    #[must_use]
    pub fn rotation(self, index: usize) -> &'static Rotation {
        &self.rotations()[index]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackbit_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::T => 'T',
            PieceKind::O => 'O',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackbit_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'T' => Some(PieceKind::T),
            'O' => Some(PieceKind::O),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece kind: {text:?}")]
pub struct ParsePieceKindError {
    pub(crate) text: String,
}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c.to_ascii_uppercase()),
            _ => None,
        };
        kind.ok_or_else(|| ParsePieceKindError { text: s.to_owned() })
    }
}

/// Label of the piece type at `index`, or `'?'` when no such type exists.
///
/// ```
/// use stackbit_engine::piece_name;
///
/// assert_eq!(piece_name(0), 'I');
/// assert_eq!(piece_name(7), '?');
/// ```
#[must_use]
pub fn piece_name(index: usize) -> char {
    PieceKind::from_index(index).map_or('?', PieceCatalog::label_of)
}

#[derive(Debug)]
struct PieceEntry {
    label: char,
    len: usize,
    rotations: [Rotation; MAX_PIECE_SIZE],
}

impl PieceEntry {
    const fn new(kind: PieceKind, shapes: &[[u16; MAX_PIECE_SIZE]]) -> Self {
        let mut rotations = [Rotation::EMPTY; MAX_PIECE_SIZE];
        let mut i = 0;
        while i < shapes.len() {
            rotations[i] = Rotation::from_shape(shapes[i]);
            i += 1;
        }
        Self {
            label: kind.as_char(),
            len: shapes.len(),
            rotations,
        }
    }
}

/// Immutable per-rotation geometry of the seven pieces.
///
/// Built once at compile time and shared by reference; nothing mutates it,
/// so concurrent readers need no synchronization.
#[derive(Debug)]
pub struct PieceCatalog {
    pieces: [PieceEntry; PieceKind::LEN],
}

static STANDARD_CATALOG: PieceCatalog = PieceCatalog::build();

impl PieceCatalog {
    const fn build() -> Self {
        Self {
            pieces: [
                PieceEntry::new(PieceKind::I, &[[0b1111, 0, 0, 0], [0b1, 0b1, 0b1, 0b1]]),
                PieceEntry::new(
                    PieceKind::T,
                    &[
                        [0b111, 0b010, 0, 0],
                        [0b01, 0b11, 0b01, 0],
                        [0b010, 0b111, 0, 0],
                        [0b10, 0b11, 0b10, 0],
                    ],
                ),
                PieceEntry::new(PieceKind::O, &[[0b11, 0b11, 0, 0]]),
                PieceEntry::new(
                    PieceKind::J,
                    &[
                        [0b111, 0b001, 0, 0],
                        [0b01, 0b01, 0b11, 0],
                        [0b100, 0b111, 0, 0],
                        [0b11, 0b10, 0b10, 0],
                    ],
                ),
                PieceEntry::new(
                    PieceKind::L,
                    &[
                        [0b111, 0b100, 0, 0],
                        [0b11, 0b01, 0b01, 0],
                        [0b001, 0b111, 0, 0],
                        [0b10, 0b10, 0b11, 0],
                    ],
                ),
                PieceEntry::new(
                    PieceKind::S,
                    &[[0b011, 0b110, 0, 0], [0b10, 0b11, 0b01, 0]],
                ),
                PieceEntry::new(
                    PieceKind::Z,
                    &[[0b110, 0b011, 0, 0], [0b01, 0b11, 0b10, 0]],
                ),
            ],
        }
    }

    /// Returns the process-wide catalog of the seven standard pieces.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_CATALOG
    }

    #[must_use]
    pub fn rotations(&self, kind: PieceKind) -> &[Rotation] {
        let entry = &self.pieces[kind.index()];
        &entry.rotations[..entry.len]
    }

    #[must_use]
    pub fn label(&self, kind: PieceKind) -> char {
        self.pieces[kind.index()].label
    }

    fn label_of(kind: PieceKind) -> char {
        Self::standard().label(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_counts() {
        let counts: Vec<_> = PieceKind::ALL
            .iter()
            .map(|kind| kind.rotations().len())
            .collect();
        assert_eq!(counts, [2, 4, 1, 4, 4, 2, 2]);
    }

    #[test]
    fn test_every_rotation_has_four_cells() {
        for kind in PieceKind::ALL {
            for (i, rotation) in kind.rotations().iter().enumerate() {
                let cells: u32 = rotation.shape().iter().map(|row| row.count_ones()).sum();
                assert_eq!(cells, 4, "{kind:?} rotation {i}");
            }
        }
    }

    #[test]
    fn test_runs_match_shape() {
        for kind in PieceKind::ALL {
            for rotation in kind.rotations() {
                for (y, run) in rotation.row_runs().iter().enumerate() {
                    assert_eq!(run.span(), run.end() - run.start());
                    for x in 0..rotation.width() {
                        assert_eq!(
                            rotation.is_occupied(x, y),
                            (run.start()..run.end()).contains(&x),
                            "{kind:?} row {y} col {x}"
                        );
                    }
                }
                for (x, run) in rotation.column_runs().iter().enumerate() {
                    assert_eq!(run.span(), run.end() - run.start());
                    for y in 0..rotation.height() {
                        assert_eq!(
                            rotation.is_occupied(x, y),
                            (run.start()..run.end()).contains(&y),
                            "{kind:?} row {y} col {x}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_derived_geometry() {
        // S flat:  .##
        //          ##.
        let s = PieceKind::S.rotation(0);
        assert_eq!((s.width(), s.height()), (3, 2));
        let rows: Vec<_> = s.row_runs().iter().map(|r| (r.start(), r.end())).collect();
        assert_eq!(rows, [(0, 2), (1, 3)]);
        let cols: Vec<_> = s
            .column_runs()
            .iter()
            .map(|r| (r.start(), r.end()))
            .collect();
        assert_eq!(cols, [(0, 1), (0, 2), (1, 2)]);

        let i = PieceKind::I.rotation(1);
        assert_eq!((i.width(), i.height()), (1, 4));
        assert_eq!(i.column_runs()[0].span(), 4);
        assert!(i.row_runs().iter().all(|r| r.span() == 1));
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for (i, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(PieceKind::from_index(i), Some(kind));
            assert_eq!(piece_name(i), kind.as_char());
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_index(PieceKind::LEN), None);
        assert_eq!(piece_name(usize::MAX), '?');
    }

    #[test]
    fn test_piece_kind_from_str() {
        assert_eq!("z".parse::<PieceKind>(), Ok(PieceKind::Z));
        assert_eq!("L".parse::<PieceKind>(), Ok(PieceKind::L));
        let err = "IT".parse::<PieceKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid piece kind: \"IT\"");
        assert!("".parse::<PieceKind>().is_err());
    }
}
