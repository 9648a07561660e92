//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Every slot is occupied.
    Full {
        /// Total slots in the arena.
        capacity: usize,
    },
    /// An arena must have at least one slot.
    ZeroCapacity,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "all {capacity} slots are occupied"),
            Self::ZeroCapacity => write!(f, "arena capacity must be at least 1"),
        }
    }
}

impl Error for ArenaError {}
