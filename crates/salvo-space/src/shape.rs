//! Grid shape selection.

use crate::error::SpaceError;

/// Row/column dimensions of an invader grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dims {
    /// Number of rows. The last row is the one nearest the defender.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
}

impl Dims {
    /// Total number of cells.
    pub fn cells(&self) -> u32 {
        self.rows * self.cols
    }
}

/// How the grid shape is chosen for a given worker count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GridShape {
    /// Pick the most nearly square factorisation.
    #[default]
    Auto,
    /// Use exactly this shape; it must hold one cell per worker.
    Explicit {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
    },
}

impl GridShape {
    /// Resolve to concrete dimensions for `workers` workers.
    ///
    /// `Auto` picks the largest divisor of `workers` not exceeding its
    /// square root as the column count, so rows are never fewer than
    /// columns and a perfect square yields a square grid.
    ///
    /// # Errors
    ///
    /// [`SpaceError::EmptySpace`] for zero workers or a zero-length axis,
    /// [`SpaceError::ShapeMismatch`] when `rows * cols != workers`.
    ///
    /// # Examples
    ///
    /// ```
    /// use salvo_space::{Dims, GridShape};
    ///
    /// assert_eq!(GridShape::Auto.resolve(9).unwrap(), Dims { rows: 3, cols: 3 });
    /// assert_eq!(GridShape::Auto.resolve(6).unwrap(), Dims { rows: 3, cols: 2 });
    /// assert!(GridShape::Explicit { rows: 2, cols: 2 }.resolve(5).is_err());
    /// ```
    pub fn resolve(self, workers: u32) -> Result<Dims, SpaceError> {
        if workers == 0 {
            return Err(SpaceError::EmptySpace);
        }
        match self {
            Self::Auto => {
                let cols = (1..=workers)
                    .take_while(|d| u64::from(*d) * u64::from(*d) <= u64::from(workers))
                    .filter(|d| workers % d == 0)
                    .last()
                    .unwrap_or(1);
                Ok(Dims {
                    rows: workers / cols,
                    cols,
                })
            }
            Self::Explicit { rows, cols } => {
                if rows == 0 || cols == 0 {
                    return Err(SpaceError::EmptySpace);
                }
                if u64::from(rows) * u64::from(cols) != u64::from(workers) {
                    return Err(SpaceError::ShapeMismatch {
                        rows,
                        cols,
                        workers,
                    });
                }
                Ok(Dims { rows, cols })
            }
        }
    }
}
