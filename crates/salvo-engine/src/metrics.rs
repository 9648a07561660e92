//! Game counters collected by the coordinator.

use std::time::Duration;

/// Cumulative counters for one game.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameMetrics {
    /// Ticks played.
    pub ticks: u64,
    /// Wall-clock time spent in tick bodies, excluding the pacing sleep.
    pub total_tick_us: u64,
    /// Projectiles fired by the defender.
    pub player_shots: u64,
    /// Projectiles fired by invaders.
    pub invader_shots: u64,
    /// Invaders destroyed.
    pub hits: u64,
    /// Defender shots dropped because the pool was full.
    pub dropped_player_shots: u64,
    /// Invader shots dropped because the pool was full.
    pub dropped_invader_shots: u64,
    /// Inbound frames that failed to decode.
    pub rejected_frames: u64,
    /// Inbound frames taken off the inbox during play.
    pub messages_processed: u64,
}

impl GameMetrics {
    /// Account for one finished tick body.
    pub fn record_tick(&mut self, elapsed: Duration) {
        self.ticks += 1;
        self.total_tick_us = self
            .total_tick_us
            .saturating_add(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));
    }

    /// Mean tick body time in microseconds, or 0 before the first tick.
    pub fn mean_tick_us(&self) -> u64 {
        self.total_tick_us.checked_div(self.ticks).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = GameMetrics::default();
        assert_eq!(m.ticks, 0);
        assert_eq!(m.hits, 0);
        assert_eq!(m.mean_tick_us(), 0);
    }

    #[test]
    fn record_tick_accumulates() {
        let mut m = GameMetrics::default();
        m.record_tick(Duration::from_micros(300));
        m.record_tick(Duration::from_micros(100));
        assert_eq!(m.ticks, 2);
        assert_eq!(m.total_tick_us, 400);
        assert_eq!(m.mean_tick_us(), 200);
    }
}
