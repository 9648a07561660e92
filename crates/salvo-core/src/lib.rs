//! Core types and traits for the Salvo battle simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every process in a game: identifiers,
//! invader status, the tagged wire protocol exchanged between the
//! coordinator and its workers, error types, and the randomness trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod protocol;
pub mod status;
pub mod traits;

pub use error::ProtocolError;
pub use id::{Participant, Rank, TickId};
pub use protocol::{Frame, Message, Tag};
pub use status::{InvaderRecord, InvaderStatus};
pub use traits::{Dice, DiceFactory, RngDice};
