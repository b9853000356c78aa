//! Direction of a move along a coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation of an arithmetic move.
///
/// `Forward` increments counters and rotates blocks toward the most
/// significant bit; `Backward` undoes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Increment / rotate toward the MSB.
    Forward,
    /// Decrement / rotate toward the LSB.
    Backward,
}

impl Direction {
    /// The opposite orientation.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Polarity the lower bits must have for a ripple step to flip the next
    /// bit: all ones when counting up, all zeros when counting down.
    pub fn carry_polarity(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}
