//! The per-invader worker loop.
//!
//! A worker owns nothing but its own scratch state: its place in the grid,
//! a local `disabled` cache and whatever neighbour values arrived this
//! tick. The coordinator's record is authoritative; the worker only
//! changes status when told to.

use std::time::Duration;

use salvo_core::{Dice, InvaderStatus, Message, Rank, TickId};
use salvo_space::{GridCoord, GridTopology, SpaceError};
use tracing::{debug, trace, warn};

use crate::fabric::{LinkError, TickSignal, WorkerLink};
use crate::rules::{self, DRAW_RANGE, FIRE_CHANCE_PERCENT, REPORT_PERIOD, SENSOR_RANGE};

/// Summary returned by a worker thread when its loop ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerExit {
    /// The worker's rank.
    pub rank: Rank,
    /// Tick signals observed, including a final `Halt`.
    pub ticks_seen: u64,
    /// Local status at exit.
    pub final_state: InvaderStatus,
    /// Reports sent to the coordinator.
    pub reports_sent: u64,
    /// Fire messages sent to the coordinator.
    pub shots_fired: u64,
    /// Neighbour sends and receives abandoned at the exchange deadline.
    pub cancelled_exchanges: u64,
}

/// What the command check decided for the rest of this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// One invader.
pub struct WorkerAgent<D> {
    link: WorkerLink,
    dice: D,
    coord: GridCoord,
    rows: u32,
    front_row: bool,
    window: Duration,
    status: InvaderStatus,
    exit: WorkerExit,
}

impl<D: Dice> WorkerAgent<D> {
    /// Bind a worker to its link.
    ///
    /// `window` bounds each tick's neighbour exchange.
    ///
    /// # Errors
    ///
    /// [`SpaceError::RankOutOfBounds`] if the link's rank is not in
    /// `topology`.
    pub fn new(
        link: WorkerLink,
        topology: &GridTopology,
        dice: D,
        window: Duration,
    ) -> Result<Self, SpaceError> {
        let rank = link.rank();
        let coord = topology.coord(rank)?;
        Ok(Self {
            link,
            dice,
            coord,
            rows: topology.rows(),
            front_row: topology.is_front_row(rank),
            window,
            status: InvaderStatus::Active,
            exit: WorkerExit {
                rank,
                ticks_seen: 0,
                final_state: InvaderStatus::Active,
                reports_sent: 0,
                shots_fired: 0,
                cancelled_exchanges: 0,
            },
        })
    }

    /// Run until terminated or disconnected.
    pub fn run(mut self) -> WorkerExit {
        let rank = self.exit.rank;
        loop {
            let tick = match self.link.wait_tick() {
                Ok(TickSignal::Advance(tick)) => tick,
                Ok(TickSignal::Halt) => {
                    self.exit.ticks_seen += 1;
                    self.drain_until_terminate();
                    break;
                }
                Err(LinkError::Disconnected) => {
                    warn!(%rank, "coordinator link lost, stopping");
                    break;
                }
            };
            self.exit.ticks_seen += 1;

            match self.check_command() {
                Ok(Step::Continue) => {}
                Ok(Step::Stop) => break,
                Err(LinkError::Disconnected) => {
                    warn!(%rank, "coordinator link lost, stopping");
                    break;
                }
            }

            if let Err(LinkError::Disconnected) = self.play_tick(tick) {
                warn!(%rank, "coordinator link lost, stopping");
                break;
            }
        }
        self.exit.final_state = self.status;
        debug!(%rank, status = %self.status, ticks = self.exit.ticks_seen, "worker exiting");
        self.exit
    }

    /// Exchange, then report and maybe fire on reporting ticks.
    fn play_tick(&mut self, tick: TickId) -> Result<(), LinkError> {
        let rank = self.exit.rank;
        let sensor = self.dice.roll(SENSOR_RANGE) as i32;
        let outcome = self.link.exchange(tick, sensor, self.window);
        if outcome.cancelled() > 0 {
            self.exit.cancelled_exchanges += u64::from(outcome.cancelled());
            debug!(
                %rank,
                %tick,
                sends = outcome.cancelled_sends,
                recvs = outcome.cancelled_recvs,
                "neighbour exchange cancelled"
            );
        }

        if self.status.is_active() && tick.is_multiple_of(REPORT_PERIOD) {
            let value = outcome.mean();
            self.link.send(Message::Report { value })?;
            self.exit.reports_sent += 1;
            trace!(%rank, %tick, value, "report sent");

            if self.front_row && self.dice.roll(DRAW_RANGE) < FIRE_CHANCE_PERCENT {
                self.fire(tick)?;
            }
        }
        Ok(())
    }

    /// Send a shot at the defender's column.
    fn fire(&mut self, tick: TickId) -> Result<(), LinkError> {
        let rank = self.exit.rank;
        let Some(msg) = fire_message(self.rows, self.coord) else {
            warn!(
                %rank,
                %tick,
                row = self.coord.row,
                col = self.coord.col,
                "shot does not fit the wire format, skipped"
            );
            return Ok(());
        };
        self.link.send(msg)?;
        self.exit.shots_fired += 1;
        debug!(%rank, %tick, ?msg, "invader fired");
        Ok(())
    }

    /// Handle at most one pending command.
    fn check_command(&mut self) -> Result<Step, LinkError> {
        match self.link.try_command()? {
            Some(frame) => self.handle(&frame),
            None => Ok(Step::Continue),
        }
    }

    /// Process commands in order, blocking, until `Terminate` arrives.
    fn drain_until_terminate(&mut self) {
        loop {
            let step = self
                .link
                .recv_command()
                .and_then(|frame| self.handle(&frame));
            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Stop) => return,
                Err(LinkError::Disconnected) => {
                    warn!(rank = %self.exit.rank, "command link closed before terminate");
                    return;
                }
            }
        }
    }

    fn handle(&mut self, frame: &salvo_core::Frame) -> Result<Step, LinkError> {
        let rank = self.exit.rank;
        match Message::decode(frame) {
            Ok(Message::Disable { .. }) => {
                if self.status.is_active() {
                    self.status = InvaderStatus::Disabled;
                }
                self.link.send(Message::disable_ack())?;
                debug!(%rank, "disabled");
                Ok(Step::Continue)
            }
            Ok(Message::Terminate { .. }) => {
                self.status = InvaderStatus::Terminated;
                self.link.send(Message::terminate())?;
                debug!(%rank, "terminate acknowledged");
                Ok(Step::Stop)
            }
            Ok(other) => {
                warn!(%rank, tag = ?other.tag(), "unexpected command discarded");
                Ok(Step::Continue)
            }
            Err(err) => {
                warn!(%rank, %err, "undecodable command discarded");
                Ok(Step::Continue)
            }
        }
    }
}

/// The fire message for an invader at `coord`, or `None` when a field
/// overflows the `i32` payload.
fn fire_message(rows: u32, coord: GridCoord) -> Option<Message> {
    let travel_time = i32::try_from(rules::travel_time(rows, coord.row)).ok()?;
    let column = i32::try_from(coord.col).ok()?;
    Some(Message::FireAtDefender {
        travel_time,
        column,
    })
}
