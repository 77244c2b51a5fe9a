//! Draw detection for N×N tic-tac-toe.

use super::super::Board;
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// Checks for a draw.
///
/// Only meaningful after [`check_win`](super::check_win) has returned
/// false for the last move: a full board with no completed line.
#[instrument(skip(board), fields(size = board.size()))]
pub fn check_draw(board: &Board) -> bool {
    is_full(board)
}
