//! Board simulation for the stackbit move-selection engine.
//!
//! - [`core`] - piece geometry, the bit-encoded [`Board`] and its placement engine
//! - [`engine`] - driver-side helpers: [`GameStats`] and [`PieceGenerator`]
//!
//! # Example
//!
//! ```
//! use stackbit_engine::{Board, PieceKind, PlacementOutcome};
//!
//! let mut board = Board::new();
//! let outcome = board.place(PieceKind::I, 0, 0);
//!
//! assert_eq!(
//!     outcome,
//!     PlacementOutcome::Placed {
//!         landing_row: 0,
//!         rows_eliminated: 0
//!     }
//! );
//! assert_eq!(board.column_height(0), 1);
//! assert_eq!(board.max_height(), 1);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
