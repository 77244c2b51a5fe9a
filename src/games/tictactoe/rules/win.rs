//! Win detection for the lines through the last move.

use super::super::{Board, Cell};
use tracing::instrument;

/// Checks whether the mark at `(row, col)` completes a line.
///
/// Only the lines through the given cell are examined: its row, its
/// column, the main diagonal when `row == col`, and the anti-diagonal
/// when `row + col == size - 1`. A line wins only if every cell on it
/// holds the same mark as `(row, col)`. An empty or out-of-range cell
/// never wins.
#[instrument(skip(board), fields(size = board.size()))]
pub fn check_win(board: &Board, row: usize, col: usize) -> bool {
    let mark = match board.get(row, col) {
        Some(Cell::Occupied(mark)) => mark,
        _ => return false,
    };
    let size = board.size();
    let owned = |r: usize, c: usize| board.get(r, c) == Some(Cell::Occupied(mark));

    if (0..size).all(|c| owned(row, c)) {
        return true;
    }

    if (0..size).all(|r| owned(r, col)) {
        return true;
    }

    if row == col && (0..size).all(|i| owned(i, i)) {
        return true;
    }

    row + col + 1 == size && (0..size).all(|i| owned(i, size - 1 - i))
}
