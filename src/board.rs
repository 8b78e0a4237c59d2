//! Game board representation and collision detection
//!
//! The grid carries its own walls: the leftmost column, the two rightmost
//! columns and the two bottom rows hold a [`Cell::Wall`] sentinel for the whole
//! game. Row 0 sits above the visible field and is where pieces spawn.

use crate::tetromino::{BlockColor, Shape};

/// Board dimensions, walls included
pub const COLS: usize = 13;
pub const ROWS: usize = 23;

/// Grid code of a wall cell. Arbitrary, but distinct from every color id.
pub const WALL: u8 = 16;

/// First and last column a piece may occupy
pub const FIRST_PLAY_COL: usize = 1;
pub const LAST_PLAY_COL: usize = COLS - 3;
/// Lowest row a piece may occupy
pub const LAST_PLAY_ROW: usize = ROWS - 3;
/// First row shown to the player; row 0 is the hidden spawn row
pub const FIRST_VISIBLE_ROW: usize = 1;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(BlockColor),
    Wall,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// Grid code: 0 for empty, the color id for blocks, [`WALL`] for walls
    pub fn code(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Filled(color) => color.code(),
            Cell::Wall => WALL,
        }
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top
    cells: [[Cell; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board surrounded by its walls
    pub fn new() -> Self {
        let mut cells = [[Cell::Empty; COLS]; ROWS];
        for row in cells.iter_mut() {
            row[0] = Cell::Wall;
            row[COLS - 2] = Cell::Wall;
            row[COLS - 1] = Cell::Wall;
        }
        cells[ROWS - 2] = [Cell::Wall; COLS];
        cells[ROWS - 1] = [Cell::Wall; COLS];
        Self { cells }
    }

    /// Whether (x, y) is a permanent wall position
    pub fn is_wall_position(x: usize, y: usize) -> bool {
        x == 0 || x >= COLS - 2 || y >= ROWS - 2
    }

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < COLS && y < ROWS).then_some((x, y))
    }

    /// Get the cell at (x, y).
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|(x, y)| self.cells[y][x])
    }

    /// Grid code at (x, y), see [`Cell::code`]
    pub fn code(&self, x: i32, y: i32) -> Option<u8> {
        self.get(x, y).map(|cell| cell.code())
    }

    /// Set a play cell. Walls are permanent: writing to a wall position is a bug.
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        let Some((col, row)) = Self::index(x, y) else {
            return false;
        };
        debug_assert!(
            !Self::is_wall_position(col, row),
            "attempt to overwrite wall at ({col}, {row})"
        );
        debug_assert!(cell != Cell::Wall, "walls are fixed at construction");
        self.cells[row][col] = cell;
        true
    }

    /// Check if `shape` may sit with its anchor at (x, y): all four cells
    /// must be on the grid and empty
    pub fn allowed(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape
            .cells_at(x, y)
            .iter()
            .all(|&(cx, cy)| matches!(self.get(cx, cy), Some(Cell::Empty)))
    }

    /// Write the shape's color into its four cells
    pub fn draw(&mut self, shape: &Shape, x: i32, y: i32) {
        let color = shape.color();
        for (cx, cy) in shape.cells_at(x, y) {
            let in_bounds = self.set(cx, cy, Cell::Filled(color));
            debug_assert!(in_bounds, "shape drawn off the grid at ({cx}, {cy})");
        }
    }

    /// Clear the shape's four cells
    pub fn erase(&mut self, shape: &Shape, x: i32, y: i32) {
        for (cx, cy) in shape.cells_at(x, y) {
            let in_bounds = self.set(cx, cy, Cell::Empty);
            debug_assert!(in_bounds, "shape erased off the grid at ({cx}, {cy})");
        }
    }

    /// Remove every full row and return how many were removed.
    ///
    /// Rows are rebuilt into a fresh walled grid from the bottom up, so the
    /// surviving rows keep their order and the cleared space reappears at the
    /// top. The hidden spawn row is never kept.
    pub fn clear_lines(&mut self) -> usize {
        let mut fresh = Board::new();
        let mut write_row = LAST_PLAY_ROW;
        let mut lines_cleared = 0;

        for read_row in (FIRST_VISIBLE_ROW..=LAST_PLAY_ROW).rev() {
            if self.is_line_full(read_row) {
                lines_cleared += 1;
                continue;
            }
            fresh.cells[write_row][FIRST_PLAY_COL..=LAST_PLAY_COL]
                .copy_from_slice(&self.cells[read_row][FIRST_PLAY_COL..=LAST_PLAY_COL]);
            write_row -= 1;
        }

        *self = fresh;
        lines_cleared
    }

    /// Check if every play cell of a row is filled
    pub fn is_line_full(&self, row: usize) -> bool {
        self.cells[row][FIRST_PLAY_COL..=LAST_PLAY_COL]
            .iter()
            .all(|cell| !cell.is_empty())
    }

    /// Number of filled play cells
    pub fn occupied_interior(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_filled())
            .count()
    }

    /// Whether every wall cell is still in place
    pub fn walls_intact(&self) -> bool {
        self.cells.iter().enumerate().all(|(y, row)| {
            row.iter()
                .enumerate()
                .all(|(x, cell)| Self::is_wall_position(x, y) == matches!(cell, Cell::Wall))
        })
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Cell; COLS])> {
        self.cells.iter().enumerate()
    }
}
