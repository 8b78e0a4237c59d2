//! Scoring and per-piece statistics
//!
//! The engine counts what happened to each piece (moves, rotations, rows
//! dropped, lines cleared) in a [`Status`] block. At every lock it hands that
//! block to a [`ScoringStrategy`], then folds the same numbers into the
//! running efficiency metric.

use crate::piece::SPAWN_X;

/// Stored score is multiplied by this to avoid losing precision on halving
pub const SCORE_FACTOR: u64 = 2;

/// Accumulated score, kept at [`SCORE_FACTOR`] scale.
/// Only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Score(u64);

impl Score {
    pub fn new() -> Self {
        Self(0)
    }

    /// Add an already scaled amount
    pub fn add(&mut self, scaled: u64) {
        self.0 = self.0.saturating_add(scaled);
    }

    /// Stored (scaled) value
    pub fn scaled(&self) -> u64 {
        self.0
    }

    /// Value shown to the player
    pub fn points(&self) -> u64 {
        self.0 / SCORE_FACTOR
    }
}

/// Scale a raw amount to stored score units
pub fn scaled(points: u64) -> u64 {
    SCORE_FACTOR * points
}

/// Statistics for the current piece and the game so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    /// Successful sideways and down moves of the current piece
    pub moves: u32,
    /// Successful rotations of the current piece
    pub rotations: u32,
    /// Rows skipped by hard drops of the current piece
    pub drop_count: u32,
    /// Running efficiency metric
    pub efficiency: i32,
    /// Lines cleared over the whole game
    pub dropped_lines: u32,
    /// Lines cleared by the latest lock
    pub current_dropped_lines: u32,
}

impl Status {
    /// Fold the locked piece into the efficiency metric.
    ///
    /// Rotations beyond four cost a point each, fewer earn nothing. Rows
    /// dropped add, and horizontal distance from spawn minus moves made
    /// rewards direct placement. The total is then halved so older pieces
    /// fade out.
    pub fn update_efficiency(&mut self, lock_x: i32) {
        let spawn_offset = (lock_x - SPAWN_X).abs();
        let rotations = 4 - self.rotations as i32;
        let rotations = if rotations > 0 { 0 } else { rotations };
        self.efficiency +=
            self.drop_count as i32 + rotations + (spawn_offset - self.moves as i32);
        self.efficiency >>= 1;
    }

    /// Reset the per-piece counters for the next piece
    pub fn reset_piece(&mut self) {
        self.moves = 0;
        self.rotations = 0;
        self.drop_count = 0;
    }
}

/// Computes the score for a locked piece.
///
/// Called exactly once per lock, after line-clear counters are updated and
/// before the per-piece counters are reset.
pub trait ScoringStrategy {
    fn on_lock(&mut self, status: &Status, score: &mut Score);
}

/// Classic tint scoring: points grow with the level, with rows
/// hard-dropped, and with the square of the lines cleared. Each gameplay
/// assist that is switched on halves the award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicScoring {
    pub level: u32,
    pub show_next: bool,
    pub dotted_lines: bool,
}

impl ClassicScoring {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            show_next: false,
            dotted_lines: false,
        }
    }

    /// Scaled award for one lock
    pub fn award(&self, status: &Status) -> u64 {
        let level = self.level as u64;
        let lines = status.current_dropped_lines as u64;
        let mut award = scaled(level * (status.drop_count as u64 + 1));
        award += scaled((level + 10) * lines * lines);
        if self.show_next {
            award /= 2;
        }
        if self.dotted_lines {
            award /= 2;
        }
        award
    }
}

impl ScoringStrategy for ClassicScoring {
    fn on_lock(&mut self, status: &Status, score: &mut Score) {
        score.add(self.award(status));
    }
}
