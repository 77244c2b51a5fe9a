//! Cursor movement for keyboard navigation.

use crossterm::event::KeyCode;

/// A cell on the board as `(row, col)`.
pub type Cursor = (usize, usize);

/// Moves the cursor with the arrow keys, stopping at the board edges.
pub fn move_cursor(cursor: Cursor, key: KeyCode, size: usize) -> Cursor {
    let (row, col) = cursor;
    let last = size.saturating_sub(1);

    match key {
        KeyCode::Up => (row.saturating_sub(1), col),
        KeyCode::Down => ((row + 1).min(last), col),
        KeyCode::Left => (row, col.saturating_sub(1)),
        KeyCode::Right => (row, (col + 1).min(last)),
        _ => cursor,
    }
}
