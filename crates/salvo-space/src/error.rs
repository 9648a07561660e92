//! Error types for grid construction.

use std::fmt;

/// Errors arising from grid construction or coordinate lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// The requested shape does not hold exactly one cell per worker.
    ShapeMismatch {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
        /// Number of workers available.
        workers: u32,
    },
    /// A grid with zero workers, rows or columns.
    EmptySpace,
    /// A rank outside `[0, workers)`.
    RankOutOfBounds {
        /// The offending rank.
        rank: u32,
        /// Number of cells in the grid.
        cells: u32,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                rows,
                cols,
                workers,
            } => write!(
                f,
                "grid {rows}x{cols} = {} invaders, but {workers} worker(s) are available",
                u64::from(*rows) * u64::from(*cols)
            ),
            Self::EmptySpace => write!(f, "grid must have at least one cell"),
            Self::RankOutOfBounds { rank, cells } => {
                write!(f, "rank {rank} out of bounds for a grid of {cells} cell(s)")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
