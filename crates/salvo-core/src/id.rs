//! Strongly-typed identifiers for processes and ticks.

use std::fmt;

/// Identity of a worker process (one invader) within a game.
///
/// Ranks are dense and row-major over the invader grid:
/// `rank = row * cols + col`. The coordinator has no rank of its own;
/// it is addressed implicitly as the destination of every worker message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u32);

impl Rank {
    /// The rank as a `usize` index into per-worker tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Rank {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing game clock.
///
/// The coordinator is the sole timekeeper: it increments the tick at the
/// start of every round and broadcasts it to all workers. The first
/// played tick is `TickId(1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this tick falls on a multiple of `period`.
    ///
    /// Workers report (and may fire) only on ticks that are multiples of
    /// their reporting period.
    pub fn is_multiple_of(self, period: u64) -> bool {
        period != 0 && self.0 % period == 0
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// One process taking part in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Participant {
    /// The single coordinator (defender-side authority).
    Coordinator,
    /// The worker driving one invader.
    Worker(Rank),
}

impl Participant {
    /// Per-process offset mixed into a shared seed so that every process
    /// draws a decorrelated random sequence.
    pub fn seed_salt(self) -> u64 {
        match self {
            Self::Worker(rank) => u64::from(rank.0),
            Self::Coordinator => u64::from(u32::MAX) + 1,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinator => write!(f, "coordinator"),
            Self::Worker(rank) => write!(f, "invader-{rank}"),
        }
    }
}
