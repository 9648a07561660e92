//! Slot handles.

use std::fmt;

/// Index of a slot within a [`SlotArena`](crate::SlotArena).
///
/// Handles are plain indices; a handle to a released slot may later
/// refer to a different occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct SlotId(pub(crate) u32);

impl SlotId {
    /// The slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}
