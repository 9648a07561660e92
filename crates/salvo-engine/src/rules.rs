//! Fixed game rules shared by the coordinator and workers.
//!
//! These values are design constants, not tunables.

/// Minimum flight time of any projectile, in ticks.
pub const FLIGHT_BASE_TICKS: u32 = 2;

/// Workers report (and may fire) on ticks that are multiples of this.
pub const REPORT_PERIOD: u64 = 4;

/// Chance, in percent per reporting tick, that a front-row invader fires.
pub const FIRE_CHANCE_PERCENT: u32 = 10;

/// Synthetic sensor values are drawn from `[0, SENSOR_RANGE)`.
pub const SENSOR_RANGE: u32 = 50;

/// Percentile draws (fire chance, combat resolution) use `[0, DRAW_RANGE)`.
pub const DRAW_RANGE: u32 = 100;

/// Default capacity of each projectile pool.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Ticks a projectile needs between the defender's row and grid row `row`.
///
/// The same formula applies to both directions of fire.
///
/// ```
/// use salvo_engine::rules::travel_time;
///
/// assert_eq!(travel_time(3, 2), 2); // front row
/// assert_eq!(travel_time(3, 0), 4); // back row
/// ```
pub fn travel_time(rows: u32, row: u32) -> u32 {
    FLIGHT_BASE_TICKS + rows.saturating_sub(1).saturating_sub(row)
}

/// Result of a player projectile reaching a live target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatOutcome {
    /// Deflected into the cell to the left (draw in `[0, 20)`).
    DeflectLeft,
    /// Deflected into the cell to the right (draw in `[20, 35)`).
    DeflectRight,
    /// Stopped by the target's shield (draw in `[35, 55)`).
    Blocked,
    /// Destroys the target (draw in `[55, 100)`).
    DirectHit,
}

impl CombatOutcome {
    /// Map a percentile draw in `[0, 100)` onto its outcome band.
    pub fn from_draw(draw: u32) -> Self {
        match draw {
            0..=19 => Self::DeflectLeft,
            20..=34 => Self::DeflectRight,
            35..=54 => Self::Blocked,
            _ => Self::DirectHit,
        }
    }

    /// Column offset of the cell this outcome damages, if any.
    pub fn column_offset(self) -> Option<i64> {
        match self {
            Self::DeflectLeft => Some(-1),
            Self::DeflectRight => Some(1),
            Self::Blocked => None,
            Self::DirectHit => Some(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn band_edges() {
        assert_eq!(CombatOutcome::from_draw(0), CombatOutcome::DeflectLeft);
        assert_eq!(CombatOutcome::from_draw(19), CombatOutcome::DeflectLeft);
        assert_eq!(CombatOutcome::from_draw(20), CombatOutcome::DeflectRight);
        assert_eq!(CombatOutcome::from_draw(34), CombatOutcome::DeflectRight);
        assert_eq!(CombatOutcome::from_draw(35), CombatOutcome::Blocked);
        assert_eq!(CombatOutcome::from_draw(54), CombatOutcome::Blocked);
        assert_eq!(CombatOutcome::from_draw(55), CombatOutcome::DirectHit);
        assert_eq!(CombatOutcome::from_draw(99), CombatOutcome::DirectHit);
    }

    #[test]
    fn travel_time_by_row() {
        assert_eq!(travel_time(1, 0), 2);
        assert_eq!(travel_time(4, 3), 2);
        assert_eq!(travel_time(4, 0), 5);
    }

    #[test]
    fn outcome_distribution_matches_bands() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5a1_70);
        let samples = 200_000;
        let mut counts = [0usize; 4];
        for _ in 0..samples {
            let idx = match CombatOutcome::from_draw(rng.random_range(0..DRAW_RANGE)) {
                CombatOutcome::DeflectLeft => 0,
                CombatOutcome::DeflectRight => 1,
                CombatOutcome::Blocked => 2,
                CombatOutcome::DirectHit => 3,
            };
            counts[idx] += 1;
        }
        let expected = [0.20, 0.15, 0.20, 0.45];
        for (count, want) in counts.iter().zip(expected) {
            let got = *count as f64 / samples as f64;
            assert!((got - want).abs() < 0.01, "band share {got} vs {want}");
        }
    }
}
