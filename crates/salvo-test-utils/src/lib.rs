//! Test utilities for Salvo development.
//!
//! Provides [`ScriptedDice`], a [`Dice`] that replays a fixed sequence of
//! draws, and fixtures for building grids and per-process dice factories.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use salvo_core::Dice;

pub use fixtures::{grid, scripted_factory};

/// Replays a script of draws, cycling when it runs out.
///
/// Each draw is clamped into `[0, upper)`, so a script of `[99]` always
/// lands in the top band of whatever range is asked for.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    script: Vec<u32>,
    pos: usize,
}

impl ScriptedDice {
    /// Cycle through `script`. An empty script always draws 0.
    pub fn new(script: Vec<u32>) -> Self {
        Self { script, pos: 0 }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, upper: u32) -> u32 {
        let Some(&v) = self.script.get(self.pos) else {
            return 0;
        };
        self.pos = (self.pos + 1) % self.script.len();
        v.min(upper.saturating_sub(1))
    }
}
