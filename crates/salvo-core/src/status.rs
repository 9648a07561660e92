//! Invader status as tracked by the coordinator.

use std::fmt;

/// Lifecycle of an invader.
///
/// `Active → Disabled` on a kill, `Active | Disabled → Terminated` at
/// game end. `Terminated` is absorbing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InvaderStatus {
    /// Alive: reports, may fire, can be targeted.
    #[default]
    Active,
    /// Destroyed during play.
    Disabled,
    /// Acknowledged the game-over broadcast.
    Terminated,
}

impl InvaderStatus {
    /// Single-letter code used by the console grid: `A`, `D` or `X`.
    pub fn letter(self) -> char {
        match self {
            Self::Active => 'A',
            Self::Disabled => 'D',
            Self::Terminated => 'X',
        }
    }

    /// Whether the invader is still in play.
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for InvaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The coordinator's authoritative record of one invader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvaderRecord {
    /// Current status.
    pub status: InvaderStatus,
    /// Last value received in a `Report` (or a `Disable` acknowledgement).
    pub last_value: i32,
}
