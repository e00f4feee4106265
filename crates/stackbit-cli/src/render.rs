//! Plain-text rendering for the interactive mode.

use std::fmt::Write as _;

use stackbit_engine::{Board, MAX_PIECE_SIZE, Rotation};

const FILLED: char = 'X';
const EMPTY: char = '.';
const PIECE_GAP: &str = "    ";

/// Board rows top to bottom, one character per cell, followed by a blank line.
pub(crate) fn board(board: &Board) -> String {
    let mut out = String::with_capacity((Board::PLAYABLE_WIDTH + 1) * (Board::PLAYABLE_HEIGHT + 1));
    for y in (0..Board::PLAYABLE_HEIGHT).rev() {
        for x in 0..Board::PLAYABLE_WIDTH {
            out.push(if board.is_occupied(x, y) { FILLED } else { EMPTY });
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

/// The chosen rotation of the current piece indented to its column, and
/// the next piece beside it, in a 4-row strip.
pub(crate) fn pieces_side_by_side(column: usize, current: &Rotation, next: &Rotation) -> String {
    let mut out = String::new();
    for y in (0..MAX_PIECE_SIZE).rev() {
        let mut line = " ".repeat(column);
        push_piece_row(&mut line, current, y);
        line.push_str(PIECE_GAP);
        push_piece_row(&mut line, next, y);
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn push_piece_row(line: &mut String, rotation: &Rotation, y: usize) {
    for x in 0..MAX_PIECE_SIZE {
        let occupied = x < rotation.width() && y < rotation.height() && rotation.is_occupied(x, y);
        line.push(if occupied { FILLED } else { ' ' });
    }
}
