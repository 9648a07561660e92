//! Randomness abstraction shared by the coordinator and workers.

use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::id::Participant;

/// Uniform integer source for every random decision in a game.
///
/// Each process owns its own `Dice`. Production games wrap a seeded RNG
/// in [`RngDice`]; tests substitute scripted draws to force specific
/// combat outcomes or firing decisions.
pub trait Dice: Send {
    /// Draw uniformly from `[0, upper)`. `upper` is always at least 1.
    fn roll(&mut self, upper: u32) -> u32;
}

impl<D: Dice + ?Sized> Dice for Box<D> {
    fn roll(&mut self, upper: u32) -> u32 {
        (**self).roll(upper)
    }
}

/// Builds the [`Dice`] each process of a game draws from.
pub type DiceFactory = Arc<dyn Fn(Participant) -> Box<dyn Dice> + Send + Sync>;

/// [`Dice`] backed by any [`rand`] generator.
#[derive(Clone, Debug)]
pub struct RngDice<R> {
    rng: R,
}

impl<R: RngCore + Send> RngDice<R> {
    /// Wrap a generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + Send> Dice for RngDice<R> {
    fn roll(&mut self, upper: u32) -> u32 {
        self.rng.random_range(0..upper.max(1))
    }
}
