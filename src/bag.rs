//! 7-bag randomizer for piece generation
//!
//! All 7 families are shuffled into a bag and dealt out in order. Just before
//! the last piece of a bag is dealt, the bag is reshuffled so the following
//! cycle is a fresh permutation. Every 7 consecutive draws aligned to a cycle
//! boundary therefore contain each family exactly once.

use crate::tetromino::{NUM_SHAPES, ShapeKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag<R = ChaCha8Rng> {
    order: [ShapeKind; NUM_SHAPES],
    /// Draw number of the current piece
    index: usize,
    /// Current piece, captured before any reshuffle
    current: ShapeKind,
    rng: R,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag seeded from OS entropy
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a bag with a fixed seed (reproducible games and tests)
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Bag<R> {
    /// Create a bag drawing its randomness from `rng`, and deal the first piece
    pub fn from_rng(mut rng: R) -> Self {
        let mut order = ShapeKind::all();
        shuffle(&mut order, &mut rng);
        Self {
            order,
            index: 0,
            current: order[0],
            rng,
        }
    }

    /// The piece dealt by the latest draw
    pub fn current(&self) -> ShapeKind {
        self.current
    }

    /// The piece the next draw will deal
    pub fn peek(&self) -> ShapeKind {
        self.order[(self.index + 1) % NUM_SHAPES]
    }

    /// Number of draws made so far (0 for the very first piece)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Deal the next piece and return it
    pub fn advance(&mut self) -> ShapeKind {
        self.index += 1;
        self.current = self.order[self.index % NUM_SHAPES];
        // Reshuffle before the first slot would be dealt again
        if (self.index + 1).is_multiple_of(NUM_SHAPES) {
            shuffle(&mut self.order, &mut self.rng);
            tracing::trace!(draw = self.index, order = ?self.order, "bag reshuffled");
        }
        self.current
    }
}

/// Forward Fisher-Yates: each position from the first to the second-last
/// swaps with a uniformly chosen position at or after it
fn shuffle<R: Rng>(order: &mut [ShapeKind; NUM_SHAPES], rng: &mut R) {
    for i in 0..NUM_SHAPES - 1 {
        let j = i + rng.gen_range(0..NUM_SHAPES - i);
        order.swap(i, j);
    }
}
