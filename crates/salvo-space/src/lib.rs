//! Grid topology for Salvo battle simulations.
//!
//! Workers are laid out on a 2D row/column grid. This crate chooses the
//! grid shape for a given worker count, assigns each worker its
//! coordinates, and derives its four cardinal neighbours.
//!
//! The battlefield is bounded: with [`EdgeBehavior::Absorb`] a shift that
//! leaves the grid yields no neighbour rather than wrapping around, so
//! corner workers have two neighbours and edge workers three.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod edge;
pub mod error;
pub mod shape;
pub mod topology;

pub use direction::Direction;
pub use edge::EdgeBehavior;
pub use error::SpaceError;
pub use shape::{Dims, GridShape};
pub use topology::{GridCoord, GridTopology, Neighbours};
