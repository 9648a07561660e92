//! # Salvo CLI
//!
//! Runs one battle: a coordinator on the main thread and one worker
//! thread per invader.
//!
//! ```text
//! salvo                 # 16 invaders on an auto-shaped grid
//! salvo 3 4             # explicit 3x4 grid
//! salvo --invaders 6    # auto shape, 3x2
//! ```

#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use salvo::prelude::*;
use tracing::info;

/// Distributed space-invaders battle on a grid of worker threads
#[derive(Parser, Debug)]
#[command(name = "salvo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Grid rows (requires COLS)
    #[arg(requires = "cols")]
    rows: Option<u32>,

    /// Grid columns
    cols: Option<u32>,

    /// Number of invaders; defaults to ROWS*COLS, or 16 without a grid
    #[arg(short = 'n', long)]
    invaders: Option<u32>,

    /// Base random seed (defaults to the wall clock)
    #[arg(long, env = "SALVO_SEED")]
    seed: Option<u64>,

    /// Length of one tick in milliseconds
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// Slots in each projectile pool
    #[arg(long, default_value_t = 100)]
    pool_capacity: usize,

    /// Give up waiting for terminate acknowledgements after this long
    #[arg(long, value_name = "MS")]
    shutdown_timeout_ms: Option<u64>,

    /// Suppress the per-tick grid, printing only the summary
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SALVO_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let shape = match (self.rows, self.cols) {
            (Some(rows), Some(cols)) => GridShape::Explicit { rows, cols },
            (None, None) => GridShape::Auto,
            _ => bail!("ROWS and COLS must be given together"),
        };
        let worker_count = match (self.invaders, shape) {
            (Some(n), _) => n,
            (None, GridShape::Explicit { rows, cols }) => rows
                .checked_mul(cols)
                .context("grid has too many cells")?,
            (None, GridShape::Auto) => GameConfig::default().worker_count,
        };
        Ok(GameConfig {
            worker_count,
            shape,
            tick_duration: Duration::from_millis(self.tick_ms),
            seed: self.seed,
            pool_capacity: self.pool_capacity,
            shutdown_timeout: self.shutdown_timeout_ms.map(Duration::from_millis),
            render: !self.quiet,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = cli.game_config()?;
    let game = Game::new(config).context("invalid game configuration")?;
    let topo = game.topology();
    info!(rows = topo.rows(), cols = topo.cols(), "starting game");

    let report = game.run().context("game failed to start")?;
    if cli.quiet {
        println!("{}", salvo::engine::render::summary(report.outcome, &report.metrics));
    }
    if !report.shutdown.is_clean() {
        eprintln!(
            "warning: {} invader(s) never acknowledged termination: {:?}",
            report.shutdown.unacknowledged.len(),
            report.shutdown.unacknowledged
        );
    }
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
