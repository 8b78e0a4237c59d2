//! Shape catalog and rotation rules
//!
//! The seven piece families, their colors and block layouts. Rotation is not a
//! plain 90° turn for every family: some alternate direction on each turn, some
//! always turn counter-clockwise and the square never turns at all.

/// Number of piece families
pub const NUM_SHAPES: usize = 7;
/// Number of blocks in every shape
pub const NUM_BLOCKS: usize = 4;

/// Block colors, numbered like the classic 8-color terminal palette.
/// Black (0) is reserved for empty cells and never used by a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl BlockColor {
    /// Numeric color id (1..=7) as stored in the board grid
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// The 7 piece families, in catalog order (family id 0..=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Z, // Cyan
    S, // Green
    T, // Yellow
    O, // Blue - square
    L, // Magenta
    J, // White
    I, // Red - long bar
}

/// How a family reacts to the rotate action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationClass {
    /// Counter-clockwise first, then clockwise, alternating
    AlternateCcwFirst,
    /// Clockwise first, then counter-clockwise, alternating
    AlternateCwFirst,
    /// Always counter-clockwise
    CounterClockwise,
    /// Never rotates
    Fixed,
}

impl ShapeKind {
    /// Get all families in catalog order
    pub fn all() -> [ShapeKind; NUM_SHAPES] {
        [
            ShapeKind::Z,
            ShapeKind::S,
            ShapeKind::T,
            ShapeKind::O,
            ShapeKind::L,
            ShapeKind::J,
            ShapeKind::I,
        ]
    }

    /// Family id (0..=6)
    pub fn id(self) -> usize {
        self as usize
    }

    /// Look up a family by id
    pub fn from_id(id: usize) -> Option<ShapeKind> {
        Self::all().get(id).copied()
    }

    pub fn color(self) -> BlockColor {
        match self {
            ShapeKind::Z => BlockColor::Cyan,
            ShapeKind::S => BlockColor::Green,
            ShapeKind::T => BlockColor::Yellow,
            ShapeKind::O => BlockColor::Blue,
            ShapeKind::L => BlockColor::Magenta,
            ShapeKind::J => BlockColor::White,
            ShapeKind::I => BlockColor::Red,
        }
    }

    pub fn rotation_class(self) -> RotationClass {
        match self {
            ShapeKind::Z => RotationClass::AlternateCcwFirst,
            ShapeKind::S | ShapeKind::I => RotationClass::AlternateCwFirst,
            ShapeKind::T | ShapeKind::L | ShapeKind::J => RotationClass::CounterClockwise,
            ShapeKind::O => RotationClass::Fixed,
        }
    }

    /// Spawn layout as (dx, dy) offsets; x grows rightward, y grows downward
    pub fn offsets(self) -> [Offset; NUM_BLOCKS] {
        let raw: [(i32, i32); NUM_BLOCKS] = match self {
            ShapeKind::Z => [(1, 0), (0, 0), (0, -1), (-1, -1)],
            ShapeKind::S => [(1, -1), (0, -1), (0, 0), (-1, 0)],
            ShapeKind::T => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            ShapeKind::O => [(-1, -1), (0, -1), (-1, 0), (0, 0)],
            ShapeKind::L => [(-1, 1), (-1, 0), (0, 0), (1, 0)],
            ShapeKind::J => [(1, 1), (1, 0), (0, 0), (-1, 0)],
            ShapeKind::I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
        };
        raw.map(|(dx, dy)| Offset { dx, dy })
    }

    /// Fresh working copy of this family's catalog template
    pub fn template(self) -> Shape {
        Shape {
            kind: self,
            flipped: false,
            blocks: self.offsets(),
        }
    }
}

/// A block position relative to the piece anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    /// (x, y) → (−y, x)
    fn clockwise(self) -> Offset {
        Offset {
            dx: -self.dy,
            dy: self.dx,
        }
    }

    /// (x, y) → (y, −x)
    fn counter_clockwise(self) -> Offset {
        Offset {
            dx: self.dy,
            dy: -self.dx,
        }
    }
}

/// A working shape: family, alternation state and the four block offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub kind: ShapeKind,
    /// Tracks the alternating direction of the asymmetric families
    pub flipped: bool,
    pub blocks: [Offset; NUM_BLOCKS],
}

impl Shape {
    pub fn color(&self) -> BlockColor {
        self.kind.color()
    }

    /// Absolute cells of this shape anchored at (x, y)
    pub fn cells_at(&self, x: i32, y: i32) -> [(i32, i32); NUM_BLOCKS] {
        self.blocks.map(|b| (x + b.dx, y + b.dy))
    }

    /// The shape after one rotate action, following its family's rules.
    /// Returns a new copy; callers decide whether to commit it.
    pub fn rotated(&self) -> Shape {
        let clockwise = match self.kind.rotation_class() {
            RotationClass::AlternateCcwFirst => self.flipped,
            RotationClass::AlternateCwFirst => !self.flipped,
            RotationClass::CounterClockwise => false,
            RotationClass::Fixed => return *self,
        };
        let mut next = *self;
        next.blocks = self.blocks.map(|b| {
            if clockwise {
                b.clockwise()
            } else {
                b.counter_clockwise()
            }
        });
        if self.kind.rotation_class() != RotationClass::CounterClockwise {
            next.flipped = !self.flipped;
        }
        next
    }
}
