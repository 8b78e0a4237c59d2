//! Active falling piece logic
//!
//! The active piece lives on the board: its cells (and those of its shadow,
//! when enabled) are drawn into the grid between operations. Every operation
//! lifts the piece off the board, tests the candidate position, commits or
//! reverts, and puts the piece back, so the grid always shows the committed
//! position when control returns to the caller.

use crate::board::Board;
use crate::tetromino::{NUM_BLOCKS, Shape, ShapeKind};

/// Anchor where every new piece appears
pub const SPAWN_X: i32 = 5;
pub const SPAWN_Y: i32 = 1;

/// Board position of a piece anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub const SPAWN: Anchor = Anchor {
        x: SPAWN_X,
        y: SPAWN_Y,
    };
}

/// An active falling piece
#[derive(Debug, Clone)]
pub struct Piece {
    /// Working copy of the catalog shape; rotation mutates it
    pub shape: Shape,
    pub anchor: Anchor,
    /// Landing projection, present when shadow mode is on
    pub shadow: Option<Anchor>,
}

impl Piece {
    /// Create a new piece at the spawn anchor. Nothing is drawn yet.
    pub fn new(kind: ShapeKind, with_shadow: bool) -> Self {
        Self {
            shape: kind.template(),
            anchor: Anchor::SPAWN,
            shadow: with_shadow.then_some(Anchor::SPAWN),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind
    }

    /// Get the absolute positions of all 4 blocks
    pub fn cells(&self) -> [(i32, i32); NUM_BLOCKS] {
        self.shape.cells_at(self.anchor.x, self.anchor.y)
    }

    /// Absolute positions of the shadow blocks, if shadow mode is on
    pub fn shadow_cells(&self) -> Option<[(i32, i32); NUM_BLOCKS]> {
        self.shadow.map(|s| self.shape.cells_at(s.x, s.y))
    }

    /// Whether the piece fits at its current anchor (used right after spawning)
    pub fn fits(&self, board: &Board) -> bool {
        board.allowed(&self.shape, self.anchor.x, self.anchor.y)
    }

    /// Put a freshly spawned piece on the board, shadow first
    pub fn place(&mut self, board: &mut Board) {
        if self.shadow.is_some() {
            self.project_shadow(board);
        }
        self.draw(board);
    }

    /// Try to move left, returns true if successful
    pub fn move_left(&mut self, board: &mut Board) -> bool {
        self.lifted(board, |piece, board| piece.shift(board, -1, 0))
    }

    /// Try to move right, returns true if successful
    pub fn move_right(&mut self, board: &mut Board) -> bool {
        self.lifted(board, |piece, board| piece.shift(board, 1, 0))
    }

    /// Try to move down one row, returns true if successful
    pub fn move_down(&mut self, board: &mut Board) -> bool {
        self.lifted(board, |piece, board| piece.shift(board, 0, 1))
    }

    /// Try to rotate in place, returns true if successful.
    /// A blocked rotation leaves the shape untouched.
    pub fn rotate(&mut self, board: &mut Board) -> bool {
        self.lifted(board, |piece, board| {
            let candidate = piece.shape.rotated();
            if !board.allowed(&candidate, piece.anchor.x, piece.anchor.y) {
                return false;
            }
            piece.shape = candidate;
            piece.project_shadow(board);
            true
        })
    }

    /// Check whether the piece can no longer move down
    pub fn is_resting(&mut self, board: &mut Board) -> bool {
        self.lifted(board, |piece, board| {
            !board.allowed(&piece.shape, piece.anchor.x, piece.anchor.y + 1)
        })
    }

    /// Hard drop - move down as far as possible and return rows travelled.
    ///
    /// With a shadow the piece jumps straight to the projected anchor,
    /// otherwise it steps down until blocked.
    pub fn hard_drop(&mut self, board: &mut Board) -> u32 {
        self.lifted(board, |piece, board| {
            let start = piece.anchor.y;
            match piece.shadow {
                Some(shadow) => piece.anchor.y = shadow.y,
                None => {
                    while board.allowed(&piece.shape, piece.anchor.x, piece.anchor.y + 1) {
                        piece.anchor.y += 1;
                    }
                }
            }
            debug_assert!(piece.anchor.y >= start, "hard drop moved the piece up");
            (piece.anchor.y - start) as u32
        })
    }

    /// Take the piece (and shadow) off the board, run `op`, then draw it back
    fn lifted<T>(&mut self, board: &mut Board, op: impl FnOnce(&mut Self, &Board) -> T) -> T {
        self.erase(board);
        let result = op(&mut *self, &*board);
        self.draw(board);
        result
    }

    fn shift(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        let (x, y) = (self.anchor.x + dx, self.anchor.y + dy);
        if !board.allowed(&self.shape, x, y) {
            return false;
        }
        self.anchor = Anchor { x, y };
        self.project_shadow(board);
        true
    }

    /// Recompute the shadow: same column, lowest legal row.
    /// Must run while the piece is lifted.
    fn project_shadow(&mut self, board: &Board) {
        if self.shadow.is_none() {
            return;
        }
        let mut y = self.anchor.y;
        while board.allowed(&self.shape, self.anchor.x, y + 1) {
            y += 1;
        }
        self.shadow = Some(Anchor {
            x: self.anchor.x,
            y,
        });
    }

    fn erase(&self, board: &mut Board) {
        board.erase(&self.shape, self.anchor.x, self.anchor.y);
        if let Some(shadow) = self.shadow {
            board.erase(&self.shape, shadow.x, shadow.y);
        }
    }

    fn draw(&self, board: &mut Board) {
        if let Some(shadow) = self.shadow {
            board.draw(&self.shape, shadow.x, shadow.y);
        }
        board.draw(&self.shape, self.anchor.x, self.anchor.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, LAST_PLAY_ROW};
    use crate::tetromino::BlockColor;

    fn spawned(kind: ShapeKind, shadow: bool) -> (Board, Piece) {
        let mut board = Board::new();
        let mut piece = Piece::new(kind, shadow);
        piece.place(&mut board);
        (board, piece)
    }

    #[test]
    fn test_spawn_position() {
        let (board, piece) = spawned(ShapeKind::T, false);
        assert_eq!(piece.anchor, Anchor { x: 5, y: 1 });
        assert_eq!(board.occupied_interior(), 4);
    }

    #[test]
    fn test_move_left_and_right() {
        let (mut board, mut piece) = spawned(ShapeKind::O, false);
        assert!(piece.move_left(&mut board));
        assert_eq!(piece.anchor.x, 4);
        assert!(piece.move_right(&mut board));
        assert!(piece.move_right(&mut board));
        assert_eq!(piece.anchor.x, 6);
        assert_eq!(board.occupied_interior(), 4);
    }

    #[test]
    fn test_wall_stops_movement() {
        let (mut board, mut piece) = spawned(ShapeKind::O, false);
        let mut moves = 0;
        while piece.move_left(&mut board) {
            moves += 1;
        }
        // Square spans dx -1..=0, so its anchor stops at column 2
        assert_eq!(piece.anchor.x, 2);
        assert_eq!(moves, 3);
        assert!(!piece.move_left(&mut board));
        assert_eq!(board.occupied_interior(), 4);
        assert!(board.walls_intact());
    }

    #[test]
    fn test_move_down_until_resting() {
        let (mut board, mut piece) = spawned(ShapeKind::T, false);
        assert!(!piece.is_resting(&mut board));
        while piece.move_down(&mut board) {}
        assert!(piece.is_resting(&mut board));
        // T spans dy 0..=1
        assert_eq!(piece.anchor.y, LAST_PLAY_ROW as i32 - 1);
        assert_eq!(board.occupied_interior(), 4);
    }

    #[test]
    fn test_blocked_rotation_leaves_shape() {
        let (mut board, mut piece) = spawned(ShapeKind::I, false);
        // Block the cell the vertical bar would need below the anchor
        board.set(5, 2, Cell::Filled(BlockColor::Blue));
        let before = piece.shape;
        assert!(!piece.rotate(&mut board));
        assert_eq!(piece.shape, before);
        assert_eq!(board.occupied_interior(), 5);
    }

    #[test]
    fn test_rotation_commits_when_free() {
        let (mut board, mut piece) = spawned(ShapeKind::I, false);
        piece.move_down(&mut board);
        assert!(piece.rotate(&mut board));
        assert!(piece.shape.flipped);
        for (x, y) in piece.cells() {
            assert_eq!(board.get(x, y), Some(Cell::Filled(BlockColor::Red)));
        }
    }

    #[test]
    fn test_hard_drop_without_shadow_counts_rows() {
        let (mut board, mut piece) = spawned(ShapeKind::I, false);
        let start = piece.anchor.y;
        let distance = piece.hard_drop(&mut board);
        assert_eq!(distance as i32, piece.anchor.y - start);
        assert_eq!(piece.anchor.y, LAST_PLAY_ROW as i32);
        assert!(piece.is_resting(&mut board));
    }

    #[test]
    fn test_shadow_tracks_landing_row() {
        let (mut board, mut piece) = spawned(ShapeKind::I, true);
        let shadow = piece.shadow.expect("shadow enabled");
        assert_eq!(shadow, Anchor { x: 5, y: LAST_PLAY_ROW as i32 });
        // Active piece plus its shadow
        assert_eq!(board.occupied_interior(), 8);

        // A block under column 8 raises the landing row after moving right
        board.set(8, LAST_PLAY_ROW as i32, Cell::Filled(BlockColor::Green));
        assert!(piece.move_right(&mut board));
        assert_eq!(piece.shadow, Some(Anchor { x: 6, y: LAST_PLAY_ROW as i32 - 1 }));
    }

    #[test]
    fn test_hard_drop_with_shadow_jumps_to_shadow() {
        let (mut board, mut piece) = spawned(ShapeKind::T, true);
        let target = piece.shadow.expect("shadow enabled");
        let distance = piece.hard_drop(&mut board);
        assert_eq!(piece.anchor, target);
        assert_eq!(distance as i32, target.y - SPAWN_Y);
        // Piece and shadow now overlap
        assert_eq!(board.occupied_interior(), 4);
    }

    #[test]
    fn test_shadow_does_not_block_descent() {
        let (mut board, mut piece) = spawned(ShapeKind::O, true);
        let mut steps = 0;
        while piece.move_down(&mut board) {
            steps += 1;
        }
        assert_eq!(piece.anchor, piece.shadow.expect("shadow enabled"));
        assert_eq!(steps, LAST_PLAY_ROW as i32 - SPAWN_Y);
    }
}
