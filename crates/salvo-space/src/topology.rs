//! Row-major grid topology with a 4-connected neighbourhood.

use salvo_core::Rank;
use smallvec::SmallVec;

use crate::direction::Direction;
use crate::edge::{resolve_axis, EdgeBehavior};
use crate::error::SpaceError;
use crate::shape::{Dims, GridShape};

/// A worker's position on the grid. Assigned once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCoord {
    /// Row; higher rows are nearer the defender.
    pub row: u32,
    /// Column.
    pub col: u32,
}

/// The four neighbours of one cell, indexed by [`Direction::slot`].
///
/// `None` is the "no neighbour" sentinel for a shift that leaves a
/// bounded grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbours([Option<Rank>; 4]);

impl Neighbours {
    /// The neighbour in `dir`, if any.
    pub fn get(&self, dir: Direction) -> Option<Rank> {
        self.0[dir.slot()]
    }

    /// Number of present neighbours.
    pub fn count(&self) -> usize {
        self.0.iter().flatten().count()
    }
}

/// A grid of `rows * cols` workers with ranks assigned row-major.
///
/// # Examples
///
/// ```
/// use salvo_core::Rank;
/// use salvo_space::{Direction, EdgeBehavior, GridShape, GridTopology};
///
/// let grid = GridTopology::new(9, GridShape::Auto, EdgeBehavior::Absorb).unwrap();
/// let corner = grid.neighbours(Rank(0)).unwrap();
/// assert_eq!(corner.count(), 2);
/// assert_eq!(corner.get(Direction::Down), Some(Rank(3)));
/// assert_eq!(corner.get(Direction::Right), Some(Rank(1)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridTopology {
    dims: Dims,
    edge: EdgeBehavior,
}

impl GridTopology {
    /// Build the topology for `workers` workers.
    ///
    /// # Errors
    ///
    /// Propagates [`GridShape::resolve`] failures.
    pub fn new(workers: u32, shape: GridShape, edge: EdgeBehavior) -> Result<Self, SpaceError> {
        let dims = shape.resolve(workers)?;
        Ok(Self { dims, edge })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.dims.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.dims.cols
    }

    /// Number of cells (= workers).
    pub fn cell_count(&self) -> usize {
        self.dims.cells() as usize
    }

    /// All ranks in row-major order.
    pub fn ranks(&self) -> impl Iterator<Item = Rank> {
        (0..self.dims.cells()).map(Rank)
    }

    /// Coordinates of `rank`.
    ///
    /// # Errors
    ///
    /// [`SpaceError::RankOutOfBounds`] for a rank outside the grid.
    pub fn coord(&self, rank: Rank) -> Result<GridCoord, SpaceError> {
        self.check(rank)?;
        Ok(GridCoord {
            row: rank.0 / self.dims.cols,
            col: rank.0 % self.dims.cols,
        })
    }

    /// Rank at `(row, col)`, or `None` outside the grid.
    pub fn rank_at(&self, row: u32, col: u32) -> Option<Rank> {
        (row < self.dims.rows && col < self.dims.cols).then(|| Rank(row * self.dims.cols + col))
    }

    /// The neighbour of `rank` one step in `dir`, or `None` at a bounded edge.
    ///
    /// Ranks outside the grid have no neighbours.
    pub fn neighbour(&self, rank: Rank, dir: Direction) -> Option<Rank> {
        let here = self.coord(rank).ok()?;
        let (dr, dc) = dir.offset();
        let row = resolve_axis(i64::from(here.row) + dr, self.dims.rows, self.edge)?;
        let col = resolve_axis(i64::from(here.col) + dc, self.dims.cols, self.edge)?;
        self.rank_at(row, col)
    }

    /// All four neighbours of `rank`.
    ///
    /// # Errors
    ///
    /// [`SpaceError::RankOutOfBounds`] for a rank outside the grid.
    pub fn neighbours(&self, rank: Rank) -> Result<Neighbours, SpaceError> {
        self.check(rank)?;
        Ok(Neighbours(Direction::ALL.map(|d| self.neighbour(rank, d))))
    }

    /// Ranks in `col`, ordered from the row nearest the defender upwards.
    pub fn column_bottom_up(&self, col: u32) -> SmallVec<[Rank; 16]> {
        (0..self.dims.rows)
            .rev()
            .filter_map(|row| self.rank_at(row, col))
            .collect()
    }

    /// Whether `rank` sits in the row nearest the defender.
    pub fn is_front_row(&self, rank: Rank) -> bool {
        self.coord(rank)
            .map(|c| c.row + 1 == self.dims.rows)
            .unwrap_or(false)
    }

    fn check(&self, rank: Rank) -> Result<(), SpaceError> {
        if rank.0 >= self.dims.cells() {
            return Err(SpaceError::RankOutOfBounds {
                rank: rank.0,
                cells: self.dims.cells(),
            });
        }
        Ok(())
    }
}
