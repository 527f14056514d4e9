//! Read-only views of the engine for renderers

use crate::board::{Board, Cell};
use crate::tetromino::PieceKind;

/// What a renderer should draw in one grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotCell {
    #[default]
    Empty,
    /// Part of the settled stack
    Settled(PieceKind),
    /// Part of the falling piece
    Active(PieceKind),
    /// Landing preview of the falling piece
    Ghost(PieceKind),
}

impl SnapshotCell {
    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            SnapshotCell::Empty => None,
            SnapshotCell::Settled(kind) | SnapshotCell::Active(kind) | SnapshotCell::Ghost(kind) => {
                Some(*kind)
            }
        }
    }
}

/// Settled cells with the active piece composited on top.
/// Row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: usize,
    height: usize,
    cells: Vec<SnapshotCell>,
}

impl Snapshot {
    pub fn from_board(board: &Board) -> Self {
        let cells = board
            .rows()
            .flatten()
            .map(|cell| match cell {
                Cell::Empty => SnapshotCell::Empty,
                Cell::Filled(kind) => SnapshotCell::Settled(*kind),
            })
            .collect();
        Self {
            width: board.width(),
            height: board.height(),
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> Option<SnapshotCell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// Overwrite a cell; out-of-bounds positions are ignored
    pub(crate) fn set(&mut self, row: i32, col: i32, cell: SnapshotCell) {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return;
        }
        self.cells[row as usize * self.width + col as usize] = cell;
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[SnapshotCell]> {
        self.cells.chunks(self.width)
    }

    /// Compact text form, one line per row: `.` empty, `#` settled,
    /// the kind letter for the active piece, `:` ghost
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.rows() {
            for cell in row {
                match cell {
                    SnapshotCell::Empty => out.push('.'),
                    SnapshotCell::Settled(_) => out.push('#'),
                    SnapshotCell::Active(kind) => out.push_str(kind.name()),
                    SnapshotCell::Ghost(_) => out.push(':'),
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Scalar game state for renderers and persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStatus {
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
    pub held: Option<PieceKind>,
    pub next: PieceKind,
    pub is_paused: bool,
    pub is_over: bool,
    /// Whether a hold is still allowed before the next lock
    pub hold_available: bool,
    /// Label of the most recent clear, until the next lock
    pub message: Option<&'static str>,
}
