//! Active falling piece geometry
//!
//! A piece knows nothing about the board. Moves and rotations are always
//! legal at this level; the board decides whether to accept them.

use crate::tetromino::{PieceKind, RotationDirection};

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The kind of piece
    pub kind: PieceKind,
    /// Column of the bounding box's left edge
    pub x: i32,
    /// Row of the bounding box's top edge (row 0 is the top of the board)
    pub y: i32,
    /// (row, col) offsets inside the bounding box
    cells: [(i32, i32); 4],
}

impl Piece {
    /// Create a piece in spawn orientation at an explicit origin
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            cells: kind.offsets(),
        }
    }

    /// Create a piece at its spawn origin for a board of the given width
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let (x, y) = kind.spawn_origin(board_width);
        Self::new(kind, x, y)
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Current offsets inside the bounding box
    pub fn cells(&self) -> &[(i32, i32); 4] {
        &self.cells
    }

    /// Shift the origin
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Offsets after a 90° clockwise turn about the bounding-box center
    pub fn rotated_clockwise(&self) -> [(i32, i32); 4] {
        let last = self.kind.size() - 1;
        self.cells.map(|(row, col)| (col, last - row))
    }

    /// Offsets after a 90° anticlockwise turn about the bounding-box center
    pub fn rotated_anticlockwise(&self) -> [(i32, i32); 4] {
        let last = self.kind.size() - 1;
        self.cells.map(|(row, col)| (last - col, row))
    }

    pub fn rotated(&self, direction: RotationDirection) -> [(i32, i32); 4] {
        match direction {
            RotationDirection::Clockwise => self.rotated_clockwise(),
            RotationDirection::CounterClockwise => self.rotated_anticlockwise(),
        }
    }

    /// Accept a rotation candidate previously checked by the board
    pub fn set_cells(&mut self, cells: [(i32, i32); 4]) {
        self.cells = cells;
    }

    /// Absolute (row, col) board positions of all 4 blocks
    pub fn cells_in_board_coords(&self) -> [(i32, i32); 4] {
        self.to_board_coords(&self.cells)
    }

    /// Map arbitrary offsets to board positions at this piece's origin
    pub fn to_board_coords(&self, cells: &[(i32, i32); 4]) -> [(i32, i32); 4] {
        cells.map(|(row, col)| (self.y + row, self.x + col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(mut cells: [(i32, i32); 4]) -> [(i32, i32); 4] {
        cells.sort();
        cells
    }

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(PieceKind::T, 10);
        assert_eq!(piece.origin(), (4, 0));
        assert_eq!(piece.cells(), &PieceKind::T.offsets());
    }

    #[test]
    fn test_board_coords_add_origin() {
        let piece = Piece::new(PieceKind::O, 3, 5);
        assert_eq!(
            sorted(piece.cells_in_board_coords()),
            [(5, 3), (5, 4), (6, 3), (6, 4)]
        );
    }

    #[test]
    fn test_translate() {
        let mut piece = Piece::new(PieceKind::L, 4, 0);
        piece.translate(-1, 2);
        assert_eq!(piece.origin(), (3, 2));
    }

    #[test]
    fn test_t_rotates_clockwise_to_pointing_right() {
        // .T.    .T.
        // TTT -> .TT
        // ...    .T.
        let piece = Piece::new(PieceKind::T, 0, 0);
        assert_eq!(
            sorted(piece.rotated_clockwise()),
            [(0, 1), (1, 1), (1, 2), (2, 1)]
        );
    }

    #[test]
    fn test_rotation_does_not_mutate() {
        let piece = Piece::new(PieceKind::S, 2, 2);
        let _ = piece.rotated_clockwise();
        let _ = piece.rotated_anticlockwise();
        assert_eq!(piece.cells(), &PieceKind::S.offsets());
    }

    #[test]
    fn test_o_rotation_keeps_same_cells() {
        let piece = Piece::new(PieceKind::O, 0, 0);
        assert_eq!(sorted(piece.rotated_clockwise()), sorted(*piece.cells()));
    }

    #[test]
    fn test_clockwise_then_anticlockwise_is_identity() {
        for kind in PieceKind::ALL {
            let mut piece = Piece::new(kind, 0, 0);
            piece.set_cells(piece.rotated_clockwise());
            piece.set_cells(piece.rotated_anticlockwise());
            assert_eq!(piece.cells(), &kind.offsets(), "{kind:?}");
        }
    }

    #[test]
    fn test_rotations_stay_in_bounding_box() {
        for kind in PieceKind::ALL {
            let mut piece = Piece::new(kind, 0, 0);
            for _ in 0..4 {
                piece.set_cells(piece.rotated_clockwise());
                for (row, col) in piece.cells() {
                    assert!((0..kind.size()).contains(row));
                    assert!((0..kind.size()).contains(col));
                }
            }
        }
    }

    fn any_kind() -> impl Strategy<Value = PieceKind> {
        prop::sample::select(PieceKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn four_turns_are_identity(kind in any_kind(), clockwise in any::<bool>(), x in -5i32..15, y in -5i32..25) {
            let mut piece = Piece::new(kind, x, y);
            let direction = if clockwise {
                RotationDirection::Clockwise
            } else {
                RotationDirection::CounterClockwise
            };
            for _ in 0..4 {
                piece.set_cells(piece.rotated(direction));
            }
            prop_assert_eq!(piece.cells(), &kind.offsets());
            prop_assert_eq!(piece.origin(), (x, y));
        }
    }
}
