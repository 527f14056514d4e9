//! Game board representation and collision detection

use crate::piece::Piece;
use crate::tetromino::PieceKind;
use std::fmt;

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled by a settled piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// A merge hit a cell that was already filled (or off the grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockCollision {
    pub row: i32,
    pub col: i32,
}

impl fmt::Display for LockCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock collision at row {}, col {}", self.row, self.col)
    }
}

impl std::error::Error for LockCollision {}

/// Emitted once per cleared row while clearing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClearEvent {
    /// Row index that was full when it was removed
    pub row: usize,
    /// Rows cleared so far in this call, including this one
    pub running_count: usize,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major, row 0 is the top
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board with the standard dimensions
    pub fn new() -> Self {
        Self::with_size(BOARD_WIDTH, BOARD_HEIGHT)
    }

    /// Create a new empty board. Dimensions are fixed for its lifetime
    /// and are at least 1; a zero width or height is raised to 1.
    pub fn with_size(width: usize, height: usize) -> Self {
        if width == 0 || height == 0 {
            tracing::warn!("Board size {}x{} raised to at least 1x1", width, height);
        }
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(row * self.width + col)
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// In bounds and empty
    pub fn is_free(&self, row: i32, col: i32) -> bool {
        matches!(self.get(row, col), Some(Cell::Empty))
    }

    /// Whether the piece fits after shifting by (dx, dy)
    pub fn can_move(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece
            .cells_in_board_coords()
            .iter()
            .all(|&(row, col)| self.is_free(row + dy, col + dx))
    }

    /// Whether `candidate` offsets are acceptable at the piece's current origin.
    ///
    /// Each cell must be inside the side walls and either empty or one of the
    /// piece's own current cells. No alternate origins are tried.
    pub fn can_rotate(&self, piece: &Piece, candidate: &[(i32, i32); 4]) -> bool {
        let current = piece.cells_in_board_coords();
        piece
            .to_board_coords(candidate)
            .iter()
            .all(|&(row, col)| {
                if col < 0 || col >= self.width as i32 {
                    return false;
                }
                current.contains(&(row, col)) || self.is_free(row, col)
            })
    }

    /// How far the piece can fall straight down
    pub fn drop_distance(&self, piece: &Piece) -> u32 {
        let mut distance = 0;
        while self.can_move(piece, 0, distance as i32 + 1) {
            distance += 1;
        }
        distance
    }

    /// Write the piece into the grid.
    ///
    /// Every in-bounds empty target is filled even when another target
    /// collides, so the final board shows where the stack overflowed.
    pub fn merge(&mut self, piece: &Piece) -> Result<(), LockCollision> {
        let mut collision = None;
        for (row, col) in piece.cells_in_board_coords() {
            if self.is_free(row, col) {
                self.set(row, col, Cell::Filled(piece.kind));
            } else if collision.is_none() {
                collision = Some(LockCollision { row, col });
            }
        }
        match collision {
            Some(collision) => Err(collision),
            None => Ok(()),
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        self.row(row).iter().all(Cell::is_filled)
    }

    /// Indices of all full rows, bottom to top
    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.height).rev().filter(|&row| self.is_row_full(row)).collect()
    }

    /// Clear completed rows and return how many were removed
    pub fn clear_full_rows(&mut self) -> usize {
        self.clear_full_rows_with(|_| {})
    }

    /// Clear completed rows, reporting each one as it is removed.
    ///
    /// Scans bottom to top. After a row is removed the rows above shift down
    /// and the same index is examined again.
    pub fn clear_full_rows_with<F>(&mut self, mut on_clear: F) -> usize
    where
        F: FnMut(LineClearEvent),
    {
        let mut cleared = 0;
        let mut row = self.height;
        while row > 0 {
            if self.is_row_full(row - 1) {
                cleared += 1;
                on_clear(LineClearEvent {
                    row: row - 1,
                    running_count: cleared,
                });
                self.shift_down_onto(row - 1);
            } else {
                row -= 1;
            }
        }
        cleared
    }

    /// Drop every row above `row` by one, discarding `row`, and blank row 0
    fn shift_down_onto(&mut self, row: usize) {
        let w = self.width;
        self.cells.copy_within(0..row * w, w);
        self.cells[..w].fill(Cell::Empty);
    }

    /// A single row as a slice
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}
