//! Game level and fall speed

use std::time::Duration;

/// Current game level, always within [`Level::MIN`]..=[`Level::MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level(u32);

impl Default for Level {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl Level {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 9;

    /// Lines to clear per level
    const LINES_PER_LEVEL: u32 = 10;

    /// Returns None if `value` is out of range
    pub fn new(value: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        self.0 >= Self::MAX
    }

    /// Time between gravity steps: one second divided by (level + 2)
    pub fn delay(&self) -> Duration {
        Duration::from_micros(1_000_000 / (self.0 as u64 + 2))
    }

    /// Go up one level if enough lines were cleared.
    /// Returns true if the level changed.
    pub fn maybe_advance(&mut self, dropped_lines: u32) -> bool {
        if !self.is_max() && dropped_lines / Self::LINES_PER_LEVEL > self.0 {
            self.0 += 1;
            return true;
        }
        false
    }

    /// Go up one level on request. Returns false at the top level.
    pub fn speed_up(&mut self) -> bool {
        if self.is_max() {
            return false;
        }
        self.0 += 1;
        true
    }
}
