//! The coordinator's tick loop and shutdown handshake.
//!
//! The coordinator is the only timekeeper. Each tick it broadcasts the
//! tick number, moves and fires for the player, takes at most one inbound
//! frame, resolves projectiles, and decides whether play continues. Game
//! state lives in [`Battlefield`]; this module only drives it over the
//! fabric.

use std::thread;
use std::time::{Duration, Instant};

use salvo_core::{Dice, InvaderRecord, InvaderStatus, Message, Rank, TickId};
use tracing::{debug, info, warn};

use crate::battlefield::{Battlefield, PlayerMove};
use crate::config::GameConfig;
use crate::fabric::{CoordinatorLink, Envelope, LinkError, TickSignal};
use crate::metrics::GameMetrics;
use crate::render;

/// Upper bound on a single wait while collecting acknowledgements.
const ACK_POLL: Duration = Duration::from_millis(50);

/// How a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every invader was destroyed.
    Victory,
    /// An invader projectile landed on the player.
    Defeat,
}

/// Result of the terminate handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that acknowledged `Terminate`.
    pub acknowledged: usize,
    /// Workers that did not, in rank order.
    pub unacknowledged: Vec<Rank>,
    /// Worker threads joined cleanly; filled in by the game launcher.
    pub workers_joined: usize,
    /// Time spent waiting for acknowledgements, in milliseconds.
    pub wait_ms: u64,
}

impl ShutdownReport {
    /// Whether every worker acknowledged.
    pub fn is_clean(&self) -> bool {
        self.unacknowledged.is_empty()
    }
}

/// What the coordinator hands back when its loop ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorReport {
    /// Victory or defeat.
    pub outcome: Outcome,
    /// The tick on which the game ended.
    pub last_tick: TickId,
    /// Final invader records, in rank order.
    pub invaders: Vec<InvaderRecord>,
    /// Game counters.
    pub metrics: GameMetrics,
    /// Terminate handshake result.
    pub shutdown: ShutdownReport,
}

/// Drives a game from the coordinator's side.
pub struct Coordinator<D> {
    link: CoordinatorLink,
    field: Battlefield,
    dice: D,
    tick: TickId,
    tick_duration: Duration,
    shutdown_timeout: Option<Duration>,
    render: bool,
    workers_gone: bool,
}

impl<D: Dice> Coordinator<D> {
    /// Bind a coordinator to its link and a fresh battlefield.
    pub fn new(link: CoordinatorLink, field: Battlefield, dice: D, config: &GameConfig) -> Self {
        Self {
            link,
            field,
            dice,
            tick: TickId::default(),
            tick_duration: config.tick_duration,
            shutdown_timeout: config.shutdown_timeout,
            render: config.render,
            workers_gone: false,
        }
    }

    /// Current battlefield.
    pub fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    /// Play until victory or defeat, then shut every worker down.
    pub fn run(mut self) -> CoordinatorReport {
        let topo = self.field.topology();
        info!(
            rows = topo.rows(),
            cols = topo.cols(),
            invaders = topo.cell_count(),
            "game start"
        );
        if self.render {
            println!("{}", render::banner(topo, self.field.player_col()));
            println!("{}", render::grid(&self.field));
        }

        let outcome = loop {
            if let Some(outcome) = self.play_tick() {
                break outcome;
            }
            if self.render {
                println!("{}", render::frame(&self.field));
            }
            thread::sleep(self.tick_duration);
        };
        info!(tick = %self.tick, ?outcome, "game over");

        if self.render {
            if outcome == Outcome::Victory {
                println!("{}", render::frame(&self.field));
            }
            println!("{}", render::outcome(outcome));
        }

        let shutdown = self.shutdown();

        let summary = render::summary(outcome, self.field.metrics());
        info!("{summary}");
        if self.render {
            if outcome == Outcome::Defeat {
                println!("\nFinal Grid State:\n{}", render::grid(&self.field));
            }
            println!("{summary}");
            println!("Simulation Complete - All processes terminated");
        }

        CoordinatorReport {
            outcome,
            last_tick: self.tick,
            invaders: self.field.invaders().to_vec(),
            metrics: self.field.metrics().clone(),
            shutdown,
        }
    }

    /// One tick. Returns the outcome if the game ended on it.
    fn play_tick(&mut self) -> Option<Outcome> {
        let started = Instant::now();
        self.tick = self.tick.next();
        let tick = self.tick;
        self.link.broadcast(TickSignal::Advance(tick));

        let col = self.field.player_col();
        match self.field.advance_player() {
            PlayerMove::NoTarget => info!(%tick, col, "no targets"),
            PlayerMove::Stay => info!(%tick, col, "player stays"),
            mv => info!(%tick, ?mv, col = self.field.player_col(), "player moves"),
        }
        self.field.auto_fire();

        self.receive_one();

        for rank in self.field.resolve_player_shots(&mut self.dice) {
            if let Err(err) = self.link.send(rank, Message::kill()) {
                warn!(%rank, %err, "kill notification not delivered");
            }
        }
        let player_hit = self.field.resolve_invader_shots();

        self.field.metrics_mut().record_tick(started.elapsed());

        if player_hit {
            Some(Outcome::Defeat)
        } else if self.field.live() == 0 {
            Some(Outcome::Victory)
        } else {
            None
        }
    }

    /// Take at most one frame off the inbox and apply it.
    fn receive_one(&mut self) {
        match self.link.try_recv() {
            Ok(Some(env)) => {
                self.field.metrics_mut().messages_processed += 1;
                self.dispatch(env, false);
            }
            Ok(None) => {}
            Err(LinkError::Disconnected) => {
                if !self.workers_gone {
                    self.workers_gone = true;
                    warn!(tick = %self.tick, "every worker has disconnected");
                }
            }
        }
    }

    /// Decode and apply one frame. While shutting down only status
    /// changes are applied.
    fn dispatch(&mut self, env: Envelope, shutting_down: bool) {
        let source = env.source;
        let msg = match Message::decode(&env.frame) {
            Ok(msg) => msg,
            Err(err) => {
                self.field.metrics_mut().rejected_frames += 1;
                warn!(%source, %err, "frame discarded");
                return;
            }
        };
        debug!(%source, ?msg, "inbound");
        let status_change = matches!(msg, Message::Disable { .. } | Message::Terminate { .. });
        if shutting_down && !status_change {
            debug!(%source, tag = ?msg.tag(), "ignored during shutdown");
            return;
        }
        self.field.apply(source, msg);
    }

    /// Send `Terminate` to every worker, release them from the tick
    /// barrier and collect acknowledgements.
    fn shutdown(&mut self) -> ShutdownReport {
        let started = Instant::now();
        let ranks: Vec<Rank> = self.field.topology().ranks().collect();
        for &rank in &ranks {
            if self.link.send(rank, Message::terminate()).is_err() {
                debug!(%rank, "worker already gone");
            }
        }
        let woken = self.link.broadcast(TickSignal::Halt);
        debug!(woken, "halt broadcast");

        let deadline = self.shutdown_timeout.map(|t| started + t);
        let total = self.link.worker_count();
        while self.field.terminate_acks() < total {
            let wait = match deadline {
                Some(d) => {
                    let left = d.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        warn!(
                            acks = self.field.terminate_acks(),
                            total, "shutdown timed out"
                        );
                        break;
                    }
                    left.min(ACK_POLL)
                }
                None => ACK_POLL,
            };
            match self.link.recv_timeout(wait) {
                Ok(Some(env)) => self.dispatch(env, true),
                Ok(None) => {}
                Err(LinkError::Disconnected) => {
                    warn!(
                        acks = self.field.terminate_acks(),
                        total, "workers gone before acknowledging"
                    );
                    break;
                }
            }
        }

        let unacknowledged: Vec<Rank> = ranks
            .into_iter()
            .filter(|r| self.field.status(*r) != InvaderStatus::Terminated)
            .collect();
        let wait_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            acknowledged = self.field.terminate_acks(),
            missing = unacknowledged.len(),
            wait_ms,
            "shutdown complete"
        );
        ShutdownReport {
            acknowledged: self.field.terminate_acks(),
            unacknowledged,
            workers_joined: 0,
            wait_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::{self, WorkerLink};
    use salvo_space::{EdgeBehavior, GridShape, GridTopology};

    struct Fixed(u32);

    impl Dice for Fixed {
        fn roll(&mut self, upper: u32) -> u32 {
            self.0.min(upper - 1)
        }
    }

    fn setup(rows: u32, cols: u32, timeout: Option<Duration>) -> (Coordinator<Fixed>, Vec<WorkerLink>) {
        let topo = GridTopology::new(
            rows * cols,
            GridShape::Explicit { rows, cols },
            EdgeBehavior::Absorb,
        )
        .unwrap();
        let (link, workers) = fabric::build(&topo);
        let field = Battlefield::new(topo, 8).unwrap();
        let config = GameConfig {
            tick_duration: Duration::from_millis(1),
            shutdown_timeout: timeout,
            render: false,
            ..GameConfig::default()
        };
        (Coordinator::new(link, field, Fixed(99), &config), workers)
    }

    #[test]
    fn victory_without_workers_answering_times_out() {
        let (coord, workers) = setup(1, 1, Some(Duration::from_millis(20)));
        let report = coord.run();
        assert_eq!(report.outcome, Outcome::Victory);
        assert_eq!(report.last_tick, TickId(2));
        assert_eq!(report.shutdown.acknowledged, 0);
        assert_eq!(report.shutdown.unacknowledged, vec![Rank(0)]);
        // The worker was told to stop and released from the barrier.
        assert_eq!(workers[0].try_command().unwrap(), Some(Message::kill().encode()));
        assert_eq!(
            workers[0].try_command().unwrap(),
            Some(Message::terminate().encode())
        );
    }

    #[test]
    fn shutdown_ends_when_all_workers_disconnect() {
        let (coord, workers) = setup(1, 2, None);
        drop(workers);
        let report = coord.run();
        assert_eq!(report.outcome, Outcome::Victory);
        assert_eq!(report.shutdown.unacknowledged.len(), 2);
    }

    #[test]
    fn acknowledgements_are_collected() {
        let (mut coord, workers) = setup(1, 2, None);
        for w in &workers {
            w.send(Message::terminate()).unwrap();
        }
        let report = coord.shutdown();
        assert!(report.is_clean());
        assert_eq!(report.acknowledged, 2);
    }

    #[test]
    fn late_fire_is_ignored_during_shutdown() {
        let (mut coord, workers) = setup(1, 1, None);
        workers[0]
            .send(Message::FireAtDefender {
                travel_time: 2,
                column: 0,
            })
            .unwrap();
        workers[0].send(Message::terminate()).unwrap();
        coord.shutdown();
        assert_eq!(coord.battlefield().invader_projectiles().count(), 0);
    }

    #[test]
    fn one_frame_per_tick() {
        let (mut coord, workers) = setup(2, 2, None);
        workers[0].send(Message::Report { value: 5 }).unwrap();
        workers[1].send(Message::Report { value: 6 }).unwrap();
        coord.receive_one();
        assert_eq!(coord.battlefield().invaders()[0].last_value, 5);
        assert_eq!(coord.battlefield().invaders()[1].last_value, 0);
        coord.receive_one();
        assert_eq!(coord.battlefield().invaders()[1].last_value, 6);
    }

    #[test]
    fn garbage_frame_is_counted_not_fatal() {
        let (mut coord, workers) = setup(1, 1, None);
        workers[0]
            .send_frame(salvo_core::Frame::new(9, &[0]))
            .unwrap();
        coord.receive_one();
        assert_eq!(coord.battlefield().metrics().rejected_frames, 1);
        assert_eq!(coord.battlefield().metrics().messages_processed, 1);
    }
}
