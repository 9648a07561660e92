//! Bounded-wait four-neighbour sensor exchange.
//!
//! Each tick a worker posts its fresh sensor value to every present
//! neighbour and waits, up to a fixed window, for theirs. Whatever has
//! not arrived when the window closes is cancelled and contributes 0 to
//! the neighbourhood mean. Values are stamped with their tick so that a
//! late value can never be credited to a later tick.

use salvo_core::TickId;
use salvo_space::Direction;

/// A sensor value in flight between neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NeighbourValue {
    /// Tick the value was produced on.
    pub tick: TickId,
    /// Direction of the sender, as seen from the receiver.
    pub from: Direction,
    /// The sensor reading.
    pub value: i32,
}

/// Result of one exchange round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// Received values, indexed by [`Direction::slot`].
    pub values: [Option<i32>; 4],
    /// Neighbours that were expected to deliver this tick.
    pub expected: [bool; 4],
    /// Sends that could not be delivered.
    pub cancelled_sends: u32,
    /// Receives still outstanding when the window closed.
    pub cancelled_recvs: u32,
}

impl ExchangeOutcome {
    /// The value received from `dir`, if any.
    pub fn value(&self, dir: Direction) -> Option<i32> {
        self.values[dir.slot()]
    }

    /// Neighbourhood mean; see [`sensor_mean`].
    pub fn mean(&self) -> i32 {
        sensor_mean(self.values)
    }

    /// Total cancelled operations this round.
    pub fn cancelled(&self) -> u32 {
        self.cancelled_sends + self.cancelled_recvs
    }

    /// Whether every expected neighbour delivered.
    pub fn is_complete(&self) -> bool {
        self.expected
            .iter()
            .zip(self.values.iter())
            .all(|(e, v)| !*e || v.is_some())
    }
}

/// Mean of the four neighbour slots, missing values counting as 0.
///
/// The divisor is always 4, with integer division, so edge and corner
/// cells are biased low.
///
/// ```
/// use salvo_engine::sensor_mean;
///
/// assert_eq!(sensor_mean([None, Some(20), None, Some(12)]), 8);
/// assert_eq!(sensor_mean([None; 4]), 0);
/// ```
pub fn sensor_mean(values: [Option<i32>; 4]) -> i32 {
    values.iter().map(|v| v.unwrap_or(0)).sum::<i32>() / 4
}

/// Bookkeeping for an exchange in progress.
pub(crate) struct PendingExchange {
    tick: TickId,
    outcome: ExchangeOutcome,
}

impl PendingExchange {
    pub(crate) fn new(tick: TickId, expected: [bool; 4]) -> Self {
        Self {
            tick,
            outcome: ExchangeOutcome {
                expected,
                ..ExchangeOutcome::default()
            },
        }
    }

    pub(crate) fn cancel_send(&mut self) {
        self.outcome.cancelled_sends += 1;
    }

    /// Offer an inbound value.
    ///
    /// Values for an older tick are dropped. Values for a newer tick are
    /// handed back so the caller can keep them for later.
    pub(crate) fn offer(&mut self, v: NeighbourValue) -> Option<NeighbourValue> {
        if v.tick > self.tick {
            return Some(v);
        }
        if v.tick == self.tick {
            let slot = v.from.slot();
            if self.outcome.expected[slot] {
                self.outcome.values[slot] = Some(v.value);
            }
        }
        None
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.outcome.is_complete()
    }

    /// Close the window, cancelling outstanding receives.
    pub(crate) fn finish(mut self) -> ExchangeOutcome {
        let missing = self
            .outcome
            .expected
            .iter()
            .zip(self.outcome.values.iter())
            .filter(|(e, v)| **e && v.is_none())
            .count();
        self.outcome.cancelled_recvs = missing as u32;
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nv(tick: u64, from: Direction, value: i32) -> NeighbourValue {
        NeighbourValue {
            tick: TickId(tick),
            from,
            value,
        }
    }

    #[test]
    fn mean_counts_missing_as_zero() {
        assert_eq!(sensor_mean([Some(4), Some(4), Some(4), Some(4)]), 4);
        assert_eq!(sensor_mean([Some(49), None, None, None]), 12);
        assert_eq!(sensor_mean([Some(3), None, None, None]), 0);
    }

    #[test]
    fn corner_mean() {
        // Top-left corner: only Down and Right exist.
        let mut p = PendingExchange::new(TickId(8), [false, true, false, true]);
        assert!(p.offer(nv(8, Direction::Down, 20)).is_none());
        assert!(!p.is_complete());
        assert!(p.offer(nv(8, Direction::Right, 12)).is_none());
        assert!(p.is_complete());
        let out = p.finish();
        assert_eq!(out.mean(), 8);
        assert_eq!(out.cancelled(), 0);
    }

    #[test]
    fn stale_dropped_future_returned() {
        let mut p = PendingExchange::new(TickId(5), [true; 4]);
        assert!(p.offer(nv(4, Direction::Up, 7)).is_none());
        let future = nv(6, Direction::Up, 9);
        assert_eq!(p.offer(future), Some(future));
        let out = p.finish();
        assert_eq!(out.value(Direction::Up), None);
        assert_eq!(out.cancelled_recvs, 4);
    }

    #[test]
    fn unexpected_direction_ignored() {
        let mut p = PendingExchange::new(TickId(1), [true, false, false, false]);
        p.offer(nv(1, Direction::Left, 30));
        p.offer(nv(1, Direction::Up, 10));
        let out = p.finish();
        assert_eq!(out.value(Direction::Left), None);
        assert_eq!(out.mean(), 2);
    }

    #[test]
    fn cancelled_sends_are_counted() {
        let mut p = PendingExchange::new(TickId(1), [false; 4]);
        p.cancel_send();
        let out = p.finish();
        assert!(out.is_complete());
        assert_eq!(out.cancelled(), 1);
    }
}
