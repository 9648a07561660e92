//! Game configuration, validation, and error types.
//!
//! [`GameConfig::validate`] checks everything that can be checked before a
//! single thread is spawned; a game that fails validation never starts.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use salvo_arena::{ArenaError, SlotArena};
use salvo_space::{EdgeBehavior, GridShape, GridTopology, SpaceError};

use crate::rules::DEFAULT_POOL_CAPACITY;

// ── GameConfig ────────────────────────────────────────────────────

/// Everything needed to start a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of invaders (one worker each). Default: 16.
    pub worker_count: u32,
    /// Grid layout. Default: [`GridShape::Auto`].
    pub shape: GridShape,
    /// Wall-clock length of one tick; also bounds each neighbour
    /// exchange. Default: 1 s.
    pub tick_duration: Duration,
    /// Base seed for every process's dice. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Slots in each projectile pool. Default: 100.
    pub pool_capacity: usize,
    /// How long to wait for terminate acknowledgements. `None` waits
    /// until every worker has answered or gone away.
    pub shutdown_timeout: Option<Duration>,
    /// Print the grid to stdout every tick.
    pub render: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            worker_count: 16,
            shape: GridShape::Auto,
            tick_duration: Duration::from_secs(1),
            seed: None,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            shutdown_timeout: None,
            render: true,
        }
    }
}

impl GameConfig {
    /// Check the configuration and build the grid it describes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Space`] for an empty or mismatched grid,
    /// [`ConfigError::Arena`] for a zero pool capacity and
    /// [`ConfigError::ZeroTickDuration`] for a zero tick.
    pub fn validate(&self) -> Result<GridTopology, ConfigError> {
        if self.tick_duration.is_zero() {
            return Err(ConfigError::ZeroTickDuration);
        }
        SlotArena::<()>::new(self.pool_capacity)?;
        let topology = GridTopology::new(self.worker_count, self.shape, EdgeBehavior::Absorb)?;
        Ok(topology)
    }
}

// ── ConfigError ───────────────────────────────────────────────────

/// Errors that prevent a game from starting.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid could not be laid out.
    Space(SpaceError),
    /// A projectile pool could not be created.
    Arena(ArenaError),
    /// `tick_duration` is zero.
    ZeroTickDuration,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// OS error text.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "grid: {e}"),
            Self::Arena(e) => write!(f, "projectile pool: {e}"),
            Self::ZeroTickDuration => write!(f, "tick duration must be non-zero"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_a_four_by_four_grid() {
        let topo = GameConfig::default().validate().unwrap();
        assert_eq!((topo.rows(), topo.cols()), (4, 4));
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        let cfg = GameConfig {
            worker_count: 6,
            shape: GridShape::Explicit { rows: 2, cols: 2 },
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Space(SpaceError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn zero_pool_is_rejected() {
        let cfg = GameConfig {
            pool_capacity: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Arena(ArenaError::ZeroCapacity))
        );
    }

    #[test]
    fn zero_tick_is_rejected() {
        let cfg = GameConfig {
            tick_duration: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTickDuration));
    }

    #[test]
    fn errors_chain_their_source() {
        let err = ConfigError::from(SpaceError::EmptySpace);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("grid: "));
    }
}
