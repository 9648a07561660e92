//! Salvo: a distributed space-invaders battle run as lockstep message
//! passing between one coordinator and a grid of invader workers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Salvo sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use salvo::prelude::*;
//!
//! let config = GameConfig {
//!     worker_count: 4,
//!     tick_duration: Duration::from_millis(2),
//!     seed: Some(11),
//!     shutdown_timeout: Some(Duration::from_secs(10)),
//!     render: false,
//!     ..GameConfig::default()
//! };
//! let report = Game::new(config).unwrap().run().unwrap();
//! assert!(report.shutdown.is_clean());
//! assert_eq!(report.invaders.len(), 4);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `salvo-core` | IDs, invader status, wire protocol, dice |
//! | [`space`] | `salvo-space` | Grid shapes, directions, neighbourhoods |
//! | [`arena`] | `salvo-arena` | Fixed-capacity projectile pools |
//! | [`engine`] | `salvo-engine` | Fabric, worker, coordinator, game launcher |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, wire protocol and the dice trait (`salvo-core`).
pub use salvo_core as types;

/// Grid layout and neighbour discovery (`salvo-space`).
pub use salvo_space as space;

/// First-free-slot arenas (`salvo-arena`).
pub use salvo_arena as arena;

/// The coordinator/worker engine (`salvo-engine`).
///
/// [`engine::Game`] is the usual entry point; [`engine::Battlefield`]
/// exposes the combat rules without any threads.
pub use salvo_engine as engine;

/// Common imports for running and inspecting games.
///
/// ```rust
/// use salvo::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use salvo_core::{
        Dice, DiceFactory, InvaderRecord, InvaderStatus, Message, Participant, Rank, RngDice,
        TickId,
    };

    // Space
    pub use salvo_space::{Direction, GridShape, GridTopology};

    // Engine
    pub use salvo_engine::{
        Battlefield, CombatOutcome, ConfigError, GameConfig, Game, GameMetrics, GameReport,
        Outcome, ShutdownReport,
    };
}
