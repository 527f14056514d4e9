//! Piece kinds and their canonical shapes
//!
//! Each kind lives in a square bounding box. Offsets are `(row, col)` inside
//! that box with row 0 at the top, matching the board's orientation.

/// The 7 piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    J,
    L,
}

/// Display color tag, mapped to real colors by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

impl PieceKind {
    /// All kinds, in bag-refill order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Get the color tag for this kind
    pub fn color(&self) -> ColorTag {
        match self {
            PieceKind::I => ColorTag::Cyan,
            PieceKind::O => ColorTag::Yellow,
            PieceKind::T => ColorTag::Purple,
            PieceKind::S => ColorTag::Green,
            PieceKind::Z => ColorTag::Red,
            PieceKind::J => ColorTag::Blue,
            PieceKind::L => ColorTag::Orange,
        }
    }

    /// Side length of the bounding box
    pub fn size(&self) -> i32 {
        match self {
            PieceKind::O => 2,
            PieceKind::T | PieceKind::S | PieceKind::Z | PieceKind::J | PieceKind::L => 3,
            PieceKind::I => 4,
        }
    }

    /// Spawn orientation as (row, col) offsets inside the bounding box
    //
    // I:  ....   O: OO   T: .T.   S: .SS   Z: ZZ.   J: J..   L: ..L
    //     IIII      OO      TTT      SS.      .ZZ      JJJ      LLL
    pub fn offsets(&self) -> [(i32, i32); 4] {
        match self {
            PieceKind::I => [(1, 0), (1, 1), (1, 2), (1, 3)],
            PieceKind::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
            PieceKind::T => [(1, 0), (0, 1), (1, 1), (1, 2)],
            PieceKind::S => [(1, 0), (1, 1), (0, 1), (0, 2)],
            PieceKind::Z => [(0, 0), (1, 1), (0, 1), (1, 2)],
            PieceKind::J => [(0, 0), (1, 0), (1, 1), (1, 2)],
            PieceKind::L => [(1, 0), (1, 1), (1, 2), (0, 2)],
        }
    }

    /// Spawn origin (x, y) of the bounding box on a board of the given width.
    /// Top row, horizontally centered (rounded right for odd slack).
    pub fn spawn_origin(&self, board_width: usize) -> (i32, i32) {
        let x = (board_width as i32 - self.size() + 1) / 2;
        (x.max(0), 0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}
