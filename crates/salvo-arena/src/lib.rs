//! Fixed-capacity slot arenas for Salvo simulations.
//!
//! Projectiles in flight are kept in pools of a fixed number of slots.
//! Allocation takes the first free slot; a slot is released when its
//! occupant resolves and is then available to the next allocation. No
//! memory is allocated after construction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod slots;

pub use error::ArenaError;
pub use handle::SlotId;
pub use slots::SlotArena;
