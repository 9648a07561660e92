//! Grid and dice fixtures.

use std::sync::Arc;

use salvo_core::{Dice, DiceFactory, Participant};
use salvo_space::{EdgeBehavior, GridShape, GridTopology};

use crate::ScriptedDice;

/// A bounded `rows x cols` grid.
///
/// # Panics
///
/// If either axis is zero.
pub fn grid(rows: u32, cols: u32) -> GridTopology {
    GridTopology::new(
        rows * cols,
        GridShape::Explicit { rows, cols },
        EdgeBehavior::Absorb,
    )
    .expect("fixture grid must be non-empty")
}

/// Dice factory giving the coordinator one script and every worker another.
pub fn scripted_factory(coordinator: Vec<u32>, worker: Vec<u32>) -> DiceFactory {
    Arc::new(move |who: Participant| -> Box<dyn Dice> {
        match who {
            Participant::Coordinator => Box::new(ScriptedDice::new(coordinator.clone())),
            Participant::Worker(_) => Box::new(ScriptedDice::new(worker.clone())),
        }
    })
}
