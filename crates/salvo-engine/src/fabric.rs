//! Process-to-process channel fabric.
//!
//! Every participant owns the receiving ends of its channels; nothing
//! else is shared. The fabric provides exactly the primitives the game
//! protocol needs:
//!
//! - a per-worker tick channel the coordinator broadcasts on and workers
//!   block on (the only barrier in the system);
//! - a per-worker command channel (coordinator → worker, FIFO);
//! - one inbox (workers → coordinator, FIFO per sender) with a
//!   non-blocking [`try_recv`](CoordinatorLink::try_recv) probe;
//! - a per-worker neighbour channel for the bounded-wait four-neighbour
//!   exchange (see [`exchange`](crate::exchange)).
//!
//! All channels are unbounded: a send never blocks, matching buffered
//! point-to-point sends between processes.

use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use salvo_core::{Frame, Message, Rank, TickId};
use salvo_space::{Direction, GridTopology};

use crate::exchange::{ExchangeOutcome, NeighbourValue, PendingExchange};

// ── Error types ──────────────────────────────────────────────────

/// The other end of a link has gone away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// Every peer that could send on (or receive from) this channel is gone.
    Disconnected,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "peer disconnected"),
        }
    }
}

impl std::error::Error for LinkError {}

// ── Wire types ───────────────────────────────────────────────────

/// Value pushed on the tick channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickSignal {
    /// Start the given tick.
    Advance(TickId),
    /// No further ticks will be broadcast; finish pending commands.
    Halt,
}

/// An inbound frame and the worker it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Sending worker.
    pub source: Rank,
    /// The raw frame.
    pub frame: Frame,
}

// ── Construction ─────────────────────────────────────────────────

/// Wire up a coordinator and one worker per grid cell.
///
/// Worker links are returned in rank order.
pub fn build(topology: &GridTopology) -> (CoordinatorLink, Vec<WorkerLink>) {
    let n = topology.cell_count();
    let (inbox_tx, inbox_rx) = unbounded();

    let mut tick_txs = Vec::with_capacity(n);
    let mut tick_rxs = Vec::with_capacity(n);
    let mut cmd_txs = Vec::with_capacity(n);
    let mut cmd_rxs = Vec::with_capacity(n);
    let mut nb_txs = Vec::with_capacity(n);
    let mut nb_rxs = Vec::with_capacity(n);
    for _ in 0..n {
        let (t_tx, t_rx) = unbounded();
        tick_txs.push(t_tx);
        tick_rxs.push(t_rx);
        let (c_tx, c_rx) = unbounded();
        cmd_txs.push(c_tx);
        cmd_rxs.push(c_rx);
        let (n_tx, n_rx) = unbounded();
        nb_txs.push(n_tx);
        nb_rxs.push(n_rx);
    }

    let workers = topology
        .ranks()
        .zip(tick_rxs)
        .zip(cmd_rxs)
        .zip(nb_rxs)
        .map(|(((rank, ticks), commands), neighbour_rx)| {
            let neighbour_tx = Direction::ALL.map(|d| {
                topology
                    .neighbour(rank, d)
                    .map(|nb| nb_txs[nb.index()].clone())
            });
            WorkerLink {
                rank,
                ticks,
                commands,
                outbox: inbox_tx.clone(),
                neighbour_tx,
                neighbour_rx,
                stash: Vec::new(),
            }
        })
        .collect();

    let coordinator = CoordinatorLink {
        ticks: tick_txs,
        commands: cmd_txs,
        inbox: inbox_rx,
    };
    (coordinator, workers)
}

// ── CoordinatorLink ──────────────────────────────────────────────

/// The coordinator's end of the fabric.
pub struct CoordinatorLink {
    ticks: Vec<Sender<TickSignal>>,
    commands: Vec<Sender<Frame>>,
    inbox: Receiver<Envelope>,
}

impl CoordinatorLink {
    /// Number of workers wired to this coordinator.
    pub fn worker_count(&self) -> usize {
        self.ticks.len()
    }

    /// Push `signal` to every worker. Returns how many workers received it;
    /// workers that have already exited are skipped.
    pub fn broadcast(&self, signal: TickSignal) -> usize {
        self.ticks
            .iter()
            .filter(|tx| tx.send(signal).is_ok())
            .count()
    }

    /// Send a command to one worker.
    ///
    /// # Errors
    ///
    /// [`LinkError::Disconnected`] if the worker has exited or `to` is not
    /// a wired rank.
    pub fn send(&self, to: Rank, msg: Message) -> Result<(), LinkError> {
        self.send_frame(to, msg.encode())
    }

    /// Send a raw frame to one worker.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send).
    pub fn send_frame(&self, to: Rank, frame: Frame) -> Result<(), LinkError> {
        self.commands
            .get(to.index())
            .ok_or(LinkError::Disconnected)?
            .send(frame)
            .map_err(|_| LinkError::Disconnected)
    }

    /// Probe the inbox without blocking.
    ///
    /// # Errors
    ///
    /// [`LinkError::Disconnected`] once every worker has dropped its link
    /// and the inbox is empty.
    pub fn try_recv(&self) -> Result<Option<Envelope>, LinkError> {
        match self.inbox.try_recv() {
            Ok(env) => Ok(Some(env)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LinkError::Disconnected),
        }
    }

    /// Wait up to `timeout` for an inbound frame.
    ///
    /// # Errors
    ///
    /// As [`try_recv`](Self::try_recv).
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Envelope>, LinkError> {
        match self.inbox.recv_timeout(timeout) {
            Ok(env) => Ok(Some(env)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LinkError::Disconnected),
        }
    }
}

// ── WorkerLink ───────────────────────────────────────────────────

/// One worker's end of the fabric.
pub struct WorkerLink {
    rank: Rank,
    ticks: Receiver<TickSignal>,
    commands: Receiver<Frame>,
    outbox: Sender<Envelope>,
    neighbour_tx: [Option<Sender<NeighbourValue>>; 4],
    neighbour_rx: Receiver<NeighbourValue>,
    /// Values that arrived early, for a tick this worker has not reached.
    stash: Vec<NeighbourValue>,
}

impl WorkerLink {
    /// This worker's rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Block until the coordinator broadcasts the next tick signal.
    ///
    /// # Errors
    ///
    /// [`LinkError::Disconnected`] if the coordinator has gone away.
    pub fn wait_tick(&self) -> Result<TickSignal, LinkError> {
        self.ticks.recv().map_err(|_| LinkError::Disconnected)
    }

    /// Take at most one pending command without blocking.
    ///
    /// # Errors
    ///
    /// [`LinkError::Disconnected`] if the coordinator has gone away and no
    /// command is queued.
    pub fn try_command(&self) -> Result<Option<Frame>, LinkError> {
        match self.commands.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LinkError::Disconnected),
        }
    }

    /// Block until the next command arrives.
    ///
    /// # Errors
    ///
    /// [`LinkError::Disconnected`] if the coordinator has gone away and no
    /// command is queued.
    pub fn recv_command(&self) -> Result<Frame, LinkError> {
        self.commands.recv().map_err(|_| LinkError::Disconnected)
    }

    /// Send a message to the coordinator.
    ///
    /// # Errors
    ///
    /// [`LinkError::Disconnected`] if the coordinator has gone away.
    pub fn send(&self, msg: Message) -> Result<(), LinkError> {
        self.send_frame(msg.encode())
    }

    /// Send a raw frame to the coordinator.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send).
    pub fn send_frame(&self, frame: Frame) -> Result<(), LinkError> {
        self.outbox
            .send(Envelope {
                source: self.rank,
                frame,
            })
            .map_err(|_| LinkError::Disconnected)
    }

    /// Swap `value` with all present neighbours for `tick`, waiting at most
    /// `window` for their values.
    ///
    /// Returns as soon as every present neighbour has delivered. Receives
    /// still outstanding when the window closes are cancelled; a send to a
    /// neighbour that has already exited counts as a cancelled send.
    pub fn exchange(&mut self, tick: TickId, value: i32, window: Duration) -> ExchangeOutcome {
        let deadline = Instant::now() + window;
        let expected = self.neighbour_tx.each_ref().map(Option::is_some);
        let mut pending = PendingExchange::new(tick, expected);

        for dir in Direction::ALL {
            if let Some(tx) = &self.neighbour_tx[dir.slot()] {
                let sent = tx.send(NeighbourValue {
                    tick,
                    from: dir.opposite(),
                    value,
                });
                if sent.is_err() {
                    pending.cancel_send();
                }
            }
        }

        let early = std::mem::take(&mut self.stash);
        for v in early {
            if let Some(later) = pending.offer(v) {
                self.stash.push(later);
            }
        }

        while !pending.is_complete() {
            match self.neighbour_rx.recv_deadline(deadline) {
                Ok(v) => {
                    if let Some(later) = pending.offer(v) {
                        self.stash.push(later);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        pending.finish()
    }
}
