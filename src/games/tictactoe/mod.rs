//! N×N tic-tac-toe: board types and rules.

pub mod rules;
mod types;

pub use rules::{check_draw, check_win};
pub use types::{Board, Cell, Mark, PlaceError};
