pub use self::{bit_board::*, piece::*, placement::*};

pub(crate) mod bit_board;
pub(crate) mod piece;
pub(crate) mod placement;

// Playfield dimensions
pub(crate) const PLAYABLE_WIDTH: usize = 10;
pub(crate) const PLAYABLE_HEIGHT: usize = 20;

// Sentinel layout
pub(crate) const SENTINEL_MARGIN_LEFT: usize = 2;
pub(crate) const SENTINEL_MARGIN_BOTTOM: usize = 1;
pub(crate) const TOTAL_WIDTH: usize = 16;
pub(crate) const TOTAL_HEIGHT: usize = PLAYABLE_HEIGHT + SENTINEL_MARGIN_BOTTOM;

pub(crate) fn to_u8(n: usize) -> u8 {
    u8::try_from(n).unwrap()
}

pub(crate) fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap()
}
