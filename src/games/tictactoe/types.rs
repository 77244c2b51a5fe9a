//! Core domain types for N×N tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A player's mark.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Mark {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Mark {
    /// Returns the opponent's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }
}

/// Why a placement was rejected.
///
/// A rejected placement never mutates the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PlaceError {
    /// The coordinates fall outside the board.
    #[display("Cell ({}, {}) is outside a {}x{} board", row, col, size, size)]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Board size.
        size: usize,
    },

    /// The cell already holds a mark.
    #[display("Cell ({}, {}) is already occupied", row, col)]
    Occupied {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}

impl std::error::Error for PlaceError {}

/// Square board of `size × size` cells in row-major order.
///
/// The size never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an all-empty board.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Returns the side length.
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size && col < self.size).then(|| row * self.size + col)
    }

    /// Gets the cell at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Checks if the cell at `(row, col)` exists and is empty.
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Cell::Empty))
    }

    /// Places `mark` at `(row, col)`.
    ///
    /// Only an in-range empty cell accepts a mark; anything else is
    /// rejected and leaves the board as it was.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), PlaceError> {
        let idx = self.index(row, col).ok_or(PlaceError::OutOfBounds {
            row,
            col,
            size: self.size,
        })?;

        if self.cells[idx] != Cell::Empty {
            return Err(PlaceError::Occupied { row, col });
        }

        self.cells[idx] = Cell::Occupied(mark);
        Ok(())
    }

    /// True iff no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates over the rows of the board.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks(0) panics, and a zero-sized board has no rows anyway
        self.cells.chunks(self.size.max(1))
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let separator = vec!["-"; self.size].join("+");
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Empty => ".",
                        Cell::Occupied(Mark::X) => "X",
                        Cell::Occupied(Mark::O) => "O",
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join(&format!("\n{}\n", separator))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        for size in 1..=6 {
            let board = Board::new(size);
            assert_eq!(board.cells().len(), size * size);
            assert!(board.cells().iter().all(|c| *c == Cell::Empty));
            assert!(!board.is_full());
        }
    }

    #[test]
    fn test_zero_sized_board_is_full() {
        let board = Board::new(0);
        assert!(board.cells().is_empty());
        assert!(board.is_full());
        assert_eq!(board.rows().count(), 0);
    }

    #[test]
    fn test_place_sets_single_cell() {
        let mut board = Board::new(4);
        board.place(1, 2, Mark::O).unwrap();

        assert_eq!(board.get(1, 2), Some(Cell::Occupied(Mark::O)));
        let occupied = board.cells().iter().filter(|c| **c != Cell::Empty).count();
        assert_eq!(occupied, 1);
    }

    #[test]
    fn test_place_rejects_occupied() {
        let mut board = Board::new(3);
        board.place(0, 0, Mark::X).unwrap();
        let before = board.clone();

        let result = board.place(0, 0, Mark::O);
        assert_eq!(result, Err(PlaceError::Occupied { row: 0, col: 0 }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_place_rejects_out_of_bounds() {
        let mut board = Board::new(3);
        let before = board.clone();

        assert!(matches!(
            board.place(3, 0, Mark::X),
            Err(PlaceError::OutOfBounds { .. })
        ));
        assert!(matches!(
            board.place(0, 7, Mark::X),
            Err(PlaceError::OutOfBounds { .. })
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(3);
        board.place(0, 0, Mark::X).unwrap();
        board.place(1, 1, Mark::O).unwrap();
        assert_eq!(board.display(), "X|.|.\n-+-+-\n.|O|.\n-+-+-\n.|.|.");
    }
}
