//! Game rules for N×N tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board). Rules are kept apart
//! from board storage so the session can compose them after each move.

pub mod draw;
pub mod win;

pub use draw::{check_draw, is_full};
pub use win::check_win;
