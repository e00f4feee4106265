//! Driver-side bookkeeping that sits around the core.
//!
//! - [`GameStats`] - score table, line totals and clear histogram
//! - [`PieceGenerator`] - seeded random or fixed cyclic piece supply
//!
//! Neither type is consulted by the move search; the game loop owns them.

pub use self::{game_stats::*, piece_generator::*};

mod game_stats;
mod piece_generator;
