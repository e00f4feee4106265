use std::{fmt::Write as _, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    PLAYABLE_HEIGHT, PLAYABLE_WIDTH, SENTINEL_MARGIN_BOTTOM, SENTINEL_MARGIN_LEFT, TOTAL_HEIGHT,
    TOTAL_WIDTH, piece::PieceKind, to_u8, to_u32,
};

const _: () = assert!(TOTAL_WIDTH == u16::BITS as usize);

// Full row (all cells occupied)
const FULL_ROW_MASK: u16 = u16::MAX;
// Playable area mask: bits 2-11
const PLAYABLE_MASK: u16 = ((1 << PLAYABLE_WIDTH) - 1) << SENTINEL_MARGIN_LEFT;
// Walls: bits 0-1 and 12-15
const SENTINEL_MASK: u16 = FULL_ROW_MASK & !PLAYABLE_MASK;
// Horizontal pairs from (left wall, column 0) to (column 9, right wall);
// bit k stands for the pair (k, k + 1)
const PAIR_MASK: u16 = ((1 << (PLAYABLE_WIDTH + 1)) - 1) << (SENTINEL_MARGIN_LEFT - 1);

/// Single row in the bit board representation.
///
/// # Bit Layout (LSB to MSB)
///
/// - Bits 0-1: Left sentinel (walls)
/// - Bits 2-11: Playable area (columns 0-9)
/// - Bits 12-15: Right sentinel (walls)
///
/// Sentinel bits are always set, so looking two cells past either end of a
/// playfield run never needs a bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self {
        bits: SENTINEL_MASK,
    };
    pub const FULL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    /// Builds a row from playfield bits (bit `x` set for column `x`).
    #[must_use]
    pub const fn from_playable_bits(bits: u16) -> Self {
        Self {
            bits: SENTINEL_MASK | ((bits << SENTINEL_MARGIN_LEFT) & PLAYABLE_MASK),
        }
    }

    /// Raw bits including the sentinel walls.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    /// Playfield bits only, bit `x` set when column `x` is occupied.
    #[must_use]
    pub const fn playable_bits(self) -> u16 {
        (self.bits & PLAYABLE_MASK) >> SENTINEL_MARGIN_LEFT
    }

    /// Checks if the playable area is completely filled.
    #[inline]
    #[must_use]
    pub const fn is_filled(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    /// Checks if the playable area has no occupied cell.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits & PLAYABLE_MASK == 0
    }

    /// Checks if playfield column `x` is occupied.
    #[inline]
    #[must_use]
    pub const fn is_cell_occupied(self, x: usize) -> bool {
        self.bits & (1 << (x + SENTINEL_MARGIN_LEFT)) != 0
    }

    /// Sets cells in the given mask (shifted to playfield column `x0`) as occupied.
    #[inline]
    pub(crate) fn occupy_cells(&mut self, x0: usize, mask: u16) {
        self.bits |= mask << (x0 + SENTINEL_MARGIN_LEFT);
    }

    /// Horizontally adjacent pairs with differing occupancy, walls included.
    ///
    /// An empty row counts its two wall edges; a full row counts zero.
    #[inline]
    #[must_use]
    pub const fn transitions(self) -> u32 {
        ((self.bits ^ (self.bits >> 1)) & PAIR_MASK).count_ones()
    }

    /// Empty cells whose left and right neighbours are both occupied.
    ///
    /// This is a per-row property: a flanked cell counts even when it is
    /// covered from above, in which case it is a hole as well.
    #[inline]
    #[must_use]
    pub const fn wells(self) -> u32 {
        (!self.bits & (self.bits << 1) & (self.bits >> 1) & PLAYABLE_MASK).count_ones()
    }
}

/// Structural counters maintained incrementally by [`Board::place`].
///
/// The walls and the floor count as occupied, so an empty board has
/// 2 transitions per row and 1 per column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardCounters {
    /// Empty cells below the top of their column.
    pub holes: u32,
    /// Horizontal occupancy changes over all rows, walls included.
    pub row_transitions: u32,
    /// Vertical occupancy changes over all columns, from the floor up to row 19.
    pub col_transitions: u32,
    /// Empty cells flanked by occupied cells (or walls) on both sides.
    pub wells: u32,
}

/// Bookkeeping of the most recent successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub(crate) kind: PieceKind,
    pub(crate) rotation: u8,
    pub(crate) landing_row: u8,
    pub(crate) rows_eliminated: u8,
}

impl LastMove {
    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> usize {
        usize::from(self.rotation)
    }

    /// Row the bottom of the piece's bounding box settled on, before any line clear.
    #[must_use]
    pub fn landing_row(&self) -> usize {
        usize::from(self.landing_row)
    }

    #[must_use]
    pub fn rows_eliminated(&self) -> usize {
        usize::from(self.rows_eliminated)
    }
}

/// Bit-encoded playfield with incrementally maintained structural counters.
///
/// Rows are indexed bottom-up: playfield row 0 is the floor row, row 19 the top.
/// Internally a fully set sentinel row sits below row 0, so the cell under
/// any playfield cell can be read without a bounds check.
///
/// The board is a plain owned value. Search branches clone it and mutate
/// their own copy; nothing is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) rows: [BitRow; TOTAL_HEIGHT],
    pub(crate) column_heights: [u8; PLAYABLE_WIDTH],
    pub(crate) max_height: u8,
    pub(crate) counters: BoardCounters,
    pub(crate) last_move: Option<LastMove>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const PLAYABLE_WIDTH: usize = PLAYABLE_WIDTH;
    pub const PLAYABLE_HEIGHT: usize = PLAYABLE_HEIGHT;

    #[expect(clippy::cast_possible_truncation)]
    pub const INITIAL: Self = {
        let mut rows = [BitRow::EMPTY; TOTAL_HEIGHT];
        rows[0] = BitRow::FULL;
        Self {
            rows,
            column_heights: [0; PLAYABLE_WIDTH],
            max_height: 0,
            counters: BoardCounters {
                holes: 0,
                row_transitions: 2 * PLAYABLE_HEIGHT as u32,
                col_transitions: PLAYABLE_WIDTH as u32,
                wells: 0,
            },
            last_move: None,
        }
    };

    /// Returns an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self::INITIAL
    }

    /// Rebuilds a board from playfield rows (bottom to top, bit `x` set for
    /// column `x`), deriving heights and every counter by full rescan.
    ///
    /// Full rows are kept as given; only [`Board::place`] clears lines.
    #[must_use]
    pub fn from_rows(rows: [u16; PLAYABLE_HEIGHT]) -> Self {
        let mut board = Self::INITIAL;
        for (y, bits) in rows.into_iter().enumerate() {
            board.rows[y + SENTINEL_MARGIN_BOTTOM] = BitRow::from_playable_bits(bits);
        }

        let mut counters = BoardCounters::default();
        for x in 0..PLAYABLE_WIDTH {
            let height = (0..PLAYABLE_HEIGHT)
                .rev()
                .find(|&y| board.is_occupied(x, y))
                .map_or(0, |y| y + 1);
            board.column_heights[x] = to_u8(height);

            let mut below_occupied = true;
            for y in 0..PLAYABLE_HEIGHT {
                let occupied = board.is_occupied(x, y);
                if !occupied && y < height {
                    counters.holes += 1;
                }
                if occupied != below_occupied {
                    counters.col_transitions += 1;
                }
                below_occupied = occupied;
            }
        }

        for y in 0..PLAYABLE_HEIGHT {
            let mut cells = [true; PLAYABLE_WIDTH + 2];
            for x in 0..PLAYABLE_WIDTH {
                cells[x + 1] = board.is_occupied(x, y);
            }
            counters.row_transitions += count(cells.windows(2).filter(|w| w[0] != w[1]));
            counters.wells += count(
                cells
                    .windows(3)
                    .filter(|w| !w[1] && w[0] && w[2]),
            );
        }

        board.counters = counters;
        board.max_height = board.column_heights.iter().copied().max().unwrap_or(0);
        board
    }

    /// Returns a copy of this board whose heights and counters were derived
    /// from scratch. Comparing it with `self` checks the incremental updates.
    #[must_use]
    pub fn rescanned(&self) -> Self {
        let mut board = Self::from_rows(self.playable_bits());
        board.last_move = self.last_move;
        board
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `#` is an occupied cell and `.` an empty one. Lines are given top to
    /// bottom; the last line is playfield row 0.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= PLAYABLE_HEIGHT,
            "at most {PLAYABLE_HEIGHT} rows allowed, got {}",
            lines.len()
        );

        let mut rows = [0; PLAYABLE_HEIGHT];
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                PLAYABLE_WIDTH,
                "each row must have exactly {PLAYABLE_WIDTH} cells, got {} at line {i}",
                cells.len(),
            );
            let y = lines.len() - 1 - i;
            for (x, &c) in cells.iter().enumerate() {
                if c == '#' {
                    rows[y] |= 1 << x;
                }
            }
        }
        Self::from_rows(rows)
    }

    /// Returns playfield row `y`.
    #[must_use]
    pub fn row(&self, y: usize) -> BitRow {
        self.rows[y + SENTINEL_MARGIN_BOTTOM]
    }

    /// Iterates over the playfield rows, bottom to top.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = BitRow> + '_ {
        self.rows[SENTINEL_MARGIN_BOTTOM..].iter().copied()
    }

    #[must_use]
    pub fn playable_bits(&self) -> [u16; PLAYABLE_HEIGHT] {
        let mut bits = [0; PLAYABLE_HEIGHT];
        for (dst, row) in bits.iter_mut().zip(self.rows()) {
            *dst = row.playable_bits();
        }
        bits
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.row(y).is_cell_occupied(x)
    }

    /// One above the topmost occupied row of column `x`, or 0 when empty.
    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        usize::from(self.column_heights[x])
    }

    #[must_use]
    pub fn column_heights(&self) -> [usize; PLAYABLE_WIDTH] {
        self.column_heights.map(usize::from)
    }

    /// One above the highest occupied row over all columns.
    #[must_use]
    pub fn max_height(&self) -> usize {
        usize::from(self.max_height)
    }

    #[must_use]
    pub fn counters(&self) -> BoardCounters {
        self.counters
    }

    #[must_use]
    pub fn holes(&self) -> u32 {
        self.counters.holes
    }

    #[must_use]
    pub fn row_transitions(&self) -> u32 {
        self.counters.row_transitions
    }

    #[must_use]
    pub fn col_transitions(&self) -> u32 {
        self.counters.col_transitions
    }

    #[must_use]
    pub fn wells(&self) -> u32 {
        self.counters.wells
    }

    #[must_use]
    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// Formats the rows as comma-separated hex values, bottom to top.
    ///
    /// ```
    /// use stackbit_engine::Board;
    ///
    /// let hex = Board::new().to_hex();
    /// assert!(hex.starts_with("f003,f003,"));
    /// assert_eq!(hex.parse::<Board>().unwrap(), Board::new());
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(PLAYABLE_HEIGHT * 5);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                hex.push(',');
            }
            write!(&mut hex, "{:04x}", row.bits).unwrap();
        }
        hex
    }
}

fn count<I: Iterator>(iter: I) -> u32 {
    to_u32(iter.count())
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("expected {PLAYABLE_HEIGHT} comma-separated hex rows, got {found}")]
    RowCount { found: usize },
    #[display("invalid hex at row {row}: {text:?}")]
    InvalidHex { row: usize, text: String },
    #[display("sentinel bits missing at row {row}")]
    MissingSentinel { row: usize },
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != PLAYABLE_HEIGHT {
            return Err(ParseBoardError::RowCount { found: parts.len() });
        }

        let mut rows = [0; PLAYABLE_HEIGHT];
        for (row, text) in parts.into_iter().enumerate() {
            let bits = u16::from_str_radix(text, 16).map_err(|_| ParseBoardError::InvalidHex {
                row,
                text: text.to_owned(),
            })?;
            if bits & SENTINEL_MASK != SENTINEL_MASK {
                return Err(ParseBoardError::MissingSentinel { row });
            }
            rows[row] = BitRow { bits }.playable_bits();
        }
        Ok(Self::from_rows(rows))
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
