//! Game launcher: one thread per worker, coordinator on the caller.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use salvo_core::{Dice, DiceFactory, InvaderRecord, Participant, RngDice, TickId};
use salvo_space::GridTopology;
use tracing::{debug, warn};

use crate::battlefield::Battlefield;
use crate::config::{ConfigError, GameConfig};
use crate::coordinator::{Coordinator, Outcome, ShutdownReport};
use crate::fabric;
use crate::metrics::GameMetrics;
use crate::worker::{WorkerAgent, WorkerExit};

/// Everything known about a finished game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameReport {
    /// Victory or defeat.
    pub outcome: Outcome,
    /// The tick the game ended on.
    pub ticks: TickId,
    /// Coordinator counters.
    pub metrics: GameMetrics,
    /// Final invader records, in rank order.
    pub invaders: Vec<InvaderRecord>,
    /// Terminate handshake result.
    pub shutdown: ShutdownReport,
    /// Exit summaries of the workers that joined, in rank order.
    pub workers: Vec<WorkerExit>,
}

/// Per-process dice seeded from `seed`, or from the clock when `None`.
///
/// Every process mixes its own salt into the base seed, so no two
/// processes share a random sequence.
pub fn seeded_dice(seed: Option<u64>) -> DiceFactory {
    let base = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    });
    Arc::new(move |who: Participant| -> Box<dyn Dice> {
        let rng = ChaCha8Rng::seed_from_u64(base.wrapping_add(who.seed_salt()));
        Box::new(RngDice::new(rng))
    })
}

/// A validated game, ready to run.
pub struct Game {
    config: GameConfig,
    topology: GridTopology,
    dice: DiceFactory,
}

impl Game {
    /// Validate `config` and prepare a game with seeded dice.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`GameConfig::validate`].
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let dice = seeded_dice(config.seed);
        Self::with_dice(config, dice)
    }

    /// Validate `config` and prepare a game drawing from `dice`.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`GameConfig::validate`].
    pub fn with_dice(config: GameConfig, dice: DiceFactory) -> Result<Self, ConfigError> {
        let topology = config.validate()?;
        Ok(Self {
            config,
            topology,
            dice,
        })
    }

    /// The grid this game will be played on.
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// Play the game to completion.
    ///
    /// Blocks the calling thread, which acts as the coordinator.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThreadSpawnFailed`] if a worker thread cannot be
    /// started; workers already running are stopped and joined first.
    pub fn run(self) -> Result<GameReport, ConfigError> {
        let (link, worker_links) = fabric::build(&self.topology);
        let window = self.config.tick_duration;

        let mut handles: Vec<JoinHandle<WorkerExit>> = Vec::with_capacity(worker_links.len());
        for wl in worker_links {
            let rank = wl.rank();
            let dice = (self.dice)(Participant::Worker(rank));
            let agent = WorkerAgent::new(wl, &self.topology, dice, window)?;
            let spawned = thread::Builder::new()
                .name(format!("salvo-invader-{rank}"))
                .spawn(move || agent.run());
            match spawned {
                Ok(h) => handles.push(h),
                Err(e) => {
                    // Dropping the link releases every running worker.
                    drop(link);
                    join_all(handles);
                    return Err(ConfigError::ThreadSpawnFailed {
                        reason: e.to_string(),
                    });
                }
            }
        }
        debug!(workers = handles.len(), "workers spawned");

        let field = Battlefield::new(self.topology.clone(), self.config.pool_capacity)?;
        let dice = (self.dice)(Participant::Coordinator);
        let report = Coordinator::new(link, field, dice, &self.config).run();

        let workers = join_all(handles);
        let mut shutdown = report.shutdown;
        shutdown.workers_joined = workers.len();

        Ok(GameReport {
            outcome: report.outcome,
            ticks: report.last_tick,
            metrics: report.metrics,
            invaders: report.invaders,
            shutdown,
            workers,
        })
    }
}

fn join_all(handles: Vec<JoinHandle<WorkerExit>>) -> Vec<WorkerExit> {
    handles
        .into_iter()
        .filter_map(|h| {
            let name = h.thread().name().map(str::to_owned);
            match h.join() {
                Ok(exit) => Some(exit),
                Err(_) => {
                    warn!(thread = ?name, "worker thread panicked");
                    None
                }
            }
        })
        .collect()
}
