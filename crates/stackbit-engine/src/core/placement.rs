//! Dropping a piece onto a [`Board`].
//!
//! Every counter is updated locally at the site of the mutation:
//!
//! - stamping a piece row re-derives that row's transitions and wells in O(1)
//!   (xor/popcount over one `u16`)
//! - raising a column seals the gap between the old column top and the
//!   bottom of the piece, adding holes and two column transitions; a column
//!   that reaches the ceiling loses the edge above its top cell
//! - removing a full row shifts the rows above it down, adds the fresh empty
//!   top row's two wall edges, and repairs each column where the removed
//!   cell either was the top or separated two gaps
//!
//! No step rescans the board. [`Board::rescanned`] is the reference the
//! incremental results are tested against.

use super::{
    PLAYABLE_HEIGHT, PLAYABLE_WIDTH, SENTINEL_MARGIN_BOTTOM, TOTAL_HEIGHT,
    bit_board::{BitRow, Board, LastMove},
    piece::{PieceKind, Rotation},
    to_u8, to_u32,
};

/// Result of [`Board::place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PlacementOutcome {
    /// The piece settled and the board was updated.
    Placed {
        /// Row of the bottom of the piece's bounding box, before line clears.
        landing_row: usize,
        rows_eliminated: usize,
    },
    /// The piece would stick out above the playfield; the board is unchanged.
    Rejected,
}

impl PlacementOutcome {
    #[must_use]
    pub fn rows_eliminated(self) -> Option<usize> {
        match self {
            Self::Placed {
                rows_eliminated, ..
            } => Some(rows_eliminated),
            Self::Rejected => None,
        }
    }
}

impl Board {
    /// Row the piece's bounding box comes to rest on when dropped at `column`.
    ///
    /// Each piece column rests on its board column; the highest such row wins.
    #[must_use]
    pub fn landing_row(&self, rotation: &Rotation, column: usize) -> usize {
        rotation
            .column_runs()
            .iter()
            .enumerate()
            .map(|(dx, run)| self.column_height(column + dx).saturating_sub(run.start()))
            .max()
            .unwrap_or(0)
    }

    /// Drops rotation `rotation` of `kind` with its left edge at playfield `column`.
    ///
    /// Stamps the piece, updates heights and counters, clears completed rows
    /// and records the move for the evaluator. A piece that would extend
    /// above the playfield is [`PlacementOutcome::Rejected`] and leaves the
    /// board untouched.
    ///
    /// # Panics
    ///
    /// Panics if `rotation` is not a rotation of `kind` or if the piece does
    /// not fit horizontally at `column`. Both are caller bugs.
    pub fn place(&mut self, kind: PieceKind, rotation: usize, column: usize) -> PlacementOutcome {
        let rotations = kind.rotations();
        assert!(
            rotation < rotations.len(),
            "{kind:?} has {} rotations, got rotation {rotation}",
            rotations.len()
        );
        let shape = &rotations[rotation];
        assert!(
            column + shape.width() <= PLAYABLE_WIDTH,
            "{kind:?} rotation {rotation} (width {}) does not fit at column {column}",
            shape.width()
        );

        let landing_row = self.landing_row(shape, column);
        if landing_row + shape.height() > PLAYABLE_HEIGHT {
            return PlacementOutcome::Rejected;
        }

        self.stamp_rows(shape, column, landing_row);
        self.raise_columns(shape, column, landing_row);
        let rows_eliminated = self.clear_lines(landing_row, shape.height());

        self.last_move = Some(LastMove {
            kind,
            rotation: to_u8(rotation),
            landing_row: to_u8(landing_row),
            rows_eliminated: to_u8(rows_eliminated),
        });
        PlacementOutcome::Placed {
            landing_row,
            rows_eliminated,
        }
    }

    fn stamp_rows(&mut self, shape: &Rotation, column: usize, landing_row: usize) {
        for (dy, &mask) in shape.shape().iter().enumerate() {
            let row = &mut self.rows[landing_row + dy + SENTINEL_MARGIN_BOTTOM];
            let before = *row;
            row.occupy_cells(column, mask);
            let after = *row;

            let counters = &mut self.counters;
            counters.row_transitions =
                counters.row_transitions + after.transitions() - before.transitions();
            counters.wells = counters.wells + after.wells() - before.wells();
        }
    }

    fn raise_columns(&mut self, shape: &Rotation, column: usize, landing_row: usize) {
        for (dx, run) in shape.column_runs().iter().enumerate() {
            let x = column + dx;
            // Cells between the old top and the piece are empty by the height invariant.
            let sealed = landing_row + run.start() - self.column_height(x);
            if sealed > 0 {
                self.counters.holes += to_u32(sealed);
                self.counters.col_transitions += 2;
            }

            let top = to_u8(landing_row + run.end());
            if usize::from(top) == PLAYABLE_HEIGHT {
                self.counters.col_transitions -= 1;
            }
            self.column_heights[x] = top;
            self.max_height = self.max_height.max(top);
        }
    }

    /// Removes completed rows among those the piece spans, top to bottom.
    fn clear_lines(&mut self, landing_row: usize, height: usize) -> usize {
        let mut cleared = 0;
        for y in (landing_row..landing_row + height).rev() {
            if self.row(y).is_filled() {
                self.remove_row(y);
                cleared += 1;
            }
        }
        cleared
    }

    fn remove_row(&mut self, y: usize) {
        // rows[y] is the row just below playfield row y (the floor sentinel when y == 0)
        for x in 0..PLAYABLE_WIDTH {
            let height = self.column_height(x);
            debug_assert!(height > y);
            if height == PLAYABLE_HEIGHT {
                // The top cell gets an empty cell above it again.
                self.counters.col_transitions += 1;
            }

            if height == y + 1 {
                // The removed cell was the column top: the empty run below it
                // is no longer covered.
                let mut top = y;
                while !self.rows[top].is_cell_occupied(x) {
                    top -= 1;
                }
                let exposed = y - top;
                if exposed > 0 {
                    self.counters.holes -= to_u32(exposed);
                    self.counters.col_transitions -= 2;
                }
                self.column_heights[x] = to_u8(top);
            } else {
                // Two gaps separated only by the removed cell merge into one.
                let below_empty = !self.rows[y].is_cell_occupied(x);
                let above_empty = !self.is_occupied(x, y + 1);
                if below_empty && above_empty {
                    self.counters.col_transitions -= 2;
                }
                self.column_heights[x] -= 1;
            }
        }

        // The full row had no transitions and no wells; the empty row
        // entering at the top has its two wall edges.
        let start = y + SENTINEL_MARGIN_BOTTOM;
        self.rows.copy_within(start + 1.., start);
        self.rows[TOTAL_HEIGHT - 1] = BitRow::EMPTY;
        self.counters.row_transitions += BitRow::EMPTY.transitions();
        self.max_height = self.column_heights.iter().copied().max().unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn placed(landing_row: usize, rows_eliminated: usize) -> PlacementOutcome {
        PlacementOutcome::Placed {
            landing_row,
            rows_eliminated,
        }
    }

    /// Counts row and column transitions cell by cell over a grid whose
    /// walls and floor are occupied.
    fn count_transitions_by_cell(board: &Board) -> (u32, u32) {
        // (0, _) and (11, _) are the walls, (_, 0) the floor
        let occupied = |gx: usize, gy: usize| {
            gx == 0 || gx == PLAYABLE_WIDTH + 1 || gy == 0 || board.is_occupied(gx - 1, gy - 1)
        };
        let mut row_transitions = 0;
        for gy in 1..=PLAYABLE_HEIGHT {
            for gx in 0..=PLAYABLE_WIDTH {
                if occupied(gx, gy) != occupied(gx + 1, gy) {
                    row_transitions += 1;
                }
            }
        }
        let mut col_transitions = 0;
        for gx in 1..=PLAYABLE_WIDTH {
            for gy in 0..PLAYABLE_HEIGHT {
                if occupied(gx, gy) != occupied(gx, gy + 1) {
                    col_transitions += 1;
                }
            }
        }
        (row_transitions, col_transitions)
    }

    fn assert_consistent(board: &Board) {
        let rescanned = board.rescanned();
        assert_eq!(board.column_heights(), rescanned.column_heights());
        assert_eq!(board.max_height(), rescanned.max_height());
        assert_eq!(board.counters(), rescanned.counters());
        assert_eq!(
            (board.row_transitions(), board.col_transitions()),
            count_transitions_by_cell(board)
        );
    }

    #[test]
    fn test_empty_board_counts_boundary_edges() {
        let board = Board::new();
        assert_eq!(board.row_transitions(), 40);
        assert_eq!(board.col_transitions(), 10);
        assert_eq!(count_transitions_by_cell(&board), (40, 10));
    }

    #[test]
    fn test_place_flat_i_on_empty_board() {
        let mut board = Board::new();
        assert_eq!(board.place(PieceKind::I, 0, 0), placed(0, 0));

        assert_eq!(board.column_heights(), [1, 1, 1, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(board.max_height(), 1);
        assert_eq!(board.holes(), 0);
        assert_eq!(board.wells(), 0);
        // row 0 trades its left wall edge for the one after the I
        assert_eq!(board.row_transitions(), 40);
        assert_eq!(board.col_transitions(), 10);
        assert_eq!(board.row(0).playable_bits(), 0b1111);

        let last = board.last_move().unwrap();
        assert_eq!(last.kind(), PieceKind::I);
        assert_eq!(last.landing_row(), 0);
        assert_eq!(last.rows_eliminated(), 0);
        assert_consistent(&board);
    }

    #[test]
    fn test_landing_row_uses_column_runs() {
        let board = Board::from_ascii(
            r"
            ##........
            ",
        );
        // ###
        // ..#  hangs over the two-cell step
        let j = PieceKind::J.rotation(2);
        assert_eq!(board.landing_row(j, 0), 0);
        // ###  flat bottom rests on the step
        let t = PieceKind::T.rotation(0);
        assert_eq!(board.landing_row(t, 0), 1);
    }

    #[test]
    fn test_sealing_gap_creates_holes() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ",
        );
        let before = board.counters();

        assert_eq!(board.place(PieceKind::I, 0, 0), placed(1, 0));

        assert_eq!(board.holes(), before.holes + 3);
        assert_eq!(board.col_transitions(), before.col_transitions + 6);
        assert_eq!(board.column_heights()[..4], [2, 2, 2, 2]);
        assert_consistent(&board);
    }

    #[test]
    fn test_snug_placement_creates_no_holes() {
        let mut board = Board::from_ascii(
            r"
            ##........
            ",
        );
        assert_eq!(board.place(PieceKind::J, 2, 0), placed(0, 0));
        assert_eq!(board.holes(), 0);
        assert_eq!(board.col_transitions(), 10);
        assert_eq!(board.column_heights()[..3], [2, 2, 2]);
        assert_consistent(&board);
    }

    #[test]
    fn test_single_line_clear() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ########..
            ",
        );

        assert_eq!(board.place(PieceKind::O, 0, 8), placed(0, 1));

        // The old second row (with the upper half of the O) is now the bottom row
        assert_eq!(board.row(0).playable_bits(), 0b11_0000_0001);
        assert!(board.row(1).is_empty());
        assert_eq!(board.max_height(), 1);
        assert_eq!(board.last_move().unwrap().rows_eliminated(), 1);
        assert_consistent(&board);
    }

    #[test]
    fn test_multi_line_clears_shift_rows_verbatim() {
        for k in 1..=4 {
            let mut rows = [0; PLAYABLE_HEIGHT];
            rows[..k].fill(0b01_1111_1111);
            rows[k] = 0b1;
            let mut board = Board::from_rows(rows);

            // Vertical I in the last column covers rows 0-3
            let mut stamped = board.playable_bits();
            for row in &mut stamped[..4] {
                *row |= 1 << 9;
            }
            let stamped_max_height = (k + 1).max(4);

            assert_eq!(board.place(PieceKind::I, 1, 9), placed(0, k), "k = {k}");

            let mut expected = [0; PLAYABLE_HEIGHT];
            expected[..PLAYABLE_HEIGHT - k].copy_from_slice(&stamped[k..]);
            assert_eq!(board.playable_bits(), expected, "k = {k}");
            assert_eq!(board.max_height(), stamped_max_height - k, "k = {k}");
            assert_consistent(&board);
        }
    }

    #[test]
    fn test_clear_uncovers_holes() {
        let mut board = Board::from_ascii(
            r"
            #########.
            .#########
            ",
        );
        assert_eq!(board.holes(), 1);

        assert_eq!(board.place(PieceKind::I, 1, 9), placed(1, 1));

        assert_eq!(board.holes(), 0);
        assert_eq!(board.column_height(0), 0);
        assert_eq!(board.row(0).playable_bits(), 0b11_1111_1110);
        assert_consistent(&board);
    }

    #[test]
    fn test_clear_merges_gaps() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ..........
            #########.
            .#########
            ",
        );
        assert_eq!(board.holes(), 2);
        assert_eq!(board.col_transitions(), 14);

        assert_eq!(board.place(PieceKind::I, 1, 9), placed(1, 1));

        assert_eq!(board.holes(), 2);
        assert_eq!(board.col_transitions(), 12);
        assert_eq!(board.column_height(0), 3);
        assert_consistent(&board);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut rows = [0; PLAYABLE_HEIGHT];
        rows[..19].fill(0b1);
        let mut board = Board::from_rows(rows);
        let snapshot = board.clone();

        assert_eq!(board.place(PieceKind::I, 1, 0), PlacementOutcome::Rejected);
        assert_eq!(board.place(PieceKind::O, 0, 0), PlacementOutcome::Rejected);
        assert_eq!(board, snapshot);
        assert!(PlacementOutcome::Rejected.rows_eliminated().is_none());

        // A flat I still fits in the last row
        assert_eq!(board.place(PieceKind::I, 0, 0), placed(19, 0));
        assert_eq!(board.max_height(), PLAYABLE_HEIGHT);
        // column 0 is solid, columns 1-3 seal a gap and lose their top edge
        assert_eq!(board.col_transitions(), 3 * 2 + 6);
        assert_consistent(&board);
    }

    #[test]
    fn test_clear_reopens_full_height_column() {
        let mut rows = [0b1; PLAYABLE_HEIGHT];
        rows[0] = 0b01_1111_1111;
        let mut board = Board::from_rows(rows);
        assert_eq!(board.column_height(0), PLAYABLE_HEIGHT);
        assert_eq!(board.col_transitions(), 9);

        assert_eq!(board.place(PieceKind::I, 1, 9), placed(0, 1));

        assert_eq!(board.column_height(0), PLAYABLE_HEIGHT - 1);
        assert_eq!(board.col_transitions(), 10);
        assert_eq!(board.row_transitions(), 40);
        assert_consistent(&board);
    }

    #[test]
    #[should_panic(expected = "does not fit at column 7")]
    fn test_out_of_range_column_panics() {
        let mut board = Board::new();
        let _ = board.place(PieceKind::I, 0, 7);
    }

    #[test]
    #[should_panic(expected = "has 1 rotations")]
    fn test_out_of_range_rotation_panics() {
        let mut board = Board::new();
        let _ = board.place(PieceKind::O, 1, 0);
    }

    fn random_move(rng: &mut Pcg32) -> (PieceKind, usize, usize) {
        let kind: PieceKind = rng.random();
        let rotation = rng.random_range(0..kind.rotations().len());
        let width = kind.rotation(rotation).width();
        let column = rng.random_range(0..=PLAYABLE_WIDTH - width);
        (kind, rotation, column)
    }

    /// Picks the placement with the fewest holes, then the lowest stack.
    fn flat_move(board: &Board, kind: PieceKind) -> (PieceKind, usize, usize) {
        let mut best = None;
        for (rotation, shape) in kind.rotations().iter().enumerate() {
            for column in 0..=PLAYABLE_WIDTH - shape.width() {
                let mut trial = board.clone();
                if trial.place(kind, rotation, column).is_rejected() {
                    continue;
                }
                let key = (trial.holes(), trial.max_height());
                if best.is_none_or(|(best_key, _)| key < best_key) {
                    best = Some((key, (kind, rotation, column)));
                }
            }
        }
        best.map_or((kind, 0, 0), |(_, mv)| mv)
    }

    #[test]
    fn test_counters_match_rescan_after_every_placement() {
        let mut total_cleared = 0;
        for (seed, random_ratio) in [(1, 0.0), (2, 0.3), (3, 1.0)] {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut board = Board::new();
            for _ in 0..2000 {
                let (kind, rotation, column) = if rng.random_bool(random_ratio) {
                    random_move(&mut rng)
                } else {
                    let kind = rng.random();
                    flat_move(&board, kind)
                };

                let snapshot = board.clone();
                let stamped_max_height = match board.place(kind, rotation, column) {
                    PlacementOutcome::Rejected => {
                        assert_eq!(board, snapshot);
                        board = Board::new();
                        continue;
                    }
                    PlacementOutcome::Placed {
                        landing_row,
                        rows_eliminated,
                    } => {
                        total_cleared += rows_eliminated;
                        let top = landing_row + kind.rotation(rotation).height();
                        snapshot.max_height().max(top) - rows_eliminated
                    }
                };
                assert_consistent(&board);
                assert!(board.max_height() <= stamped_max_height);
            }
        }
        assert!(total_cleared > 0);
    }
}
