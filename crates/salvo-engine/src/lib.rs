//! Tick-synchronised coordinator/worker engine for Salvo.
//!
//! A game runs one coordinator and one worker per invader, each on its
//! own thread, sharing no memory: every interaction goes through the
//! channel [`fabric`]. The coordinator is the sole timekeeper and the
//! single source of truth for which invaders are alive.
//!
//! ```text
//! Coordinator (caller thread)              Worker r (salvo-invader-r)
//!     |                                        |
//!     |--TickSignal::Advance(n)--------------->| wait_tick()   (barrier)
//!     | move player, auto-fire                 | try_command() (one per tick)
//!     | try_recv() one inbound frame           | exchange()    (4 neighbours, bounded wait)
//!     | resolve player shots --Disable(1)----->| report / fire every 4th tick
//!     | resolve invader shots                  |
//!     | victory / defeat?                      |
//!     |--Terminate(3), TickSignal::Halt------->| ack Terminate(3), exit
//!     |<-------------------------------acks----|
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod battlefield;
pub mod config;
pub mod coordinator;
pub mod exchange;
pub mod fabric;
pub mod game;
pub mod metrics;
pub mod render;
pub mod rules;
pub mod worker;

pub use battlefield::{Battlefield, PlayerMove, Projectile, Shooter};
pub use config::{ConfigError, GameConfig};
pub use coordinator::{Coordinator, CoordinatorReport, Outcome, ShutdownReport};
pub use exchange::{sensor_mean, ExchangeOutcome};
pub use fabric::{CoordinatorLink, Envelope, LinkError, TickSignal, WorkerLink};
pub use game::{seeded_dice, Game, GameReport};
pub use metrics::GameMetrics;
pub use rules::CombatOutcome;
pub use worker::{WorkerAgent, WorkerExit};
