// Sources of dice rolls for the match engine.
// Everything that bowls a ball draws through the Dice trait, so tests and replays
// can script the exact sequence of rolls.

use rand::Rng;
use std::collections::VecDeque;

/// A six-sided die. Implementations must return a value in 1..=6.
pub trait Dice {
    fn roll(&mut self) -> u8;
}

/// Dice backed by any `rand` generator
pub struct RngDice<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        RngDice { rng }
    }
}

impl RngDice<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        RngDice::new(rand::thread_rng())
    }
}

impl<R: Rng> Dice for RngDice<R> {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

/// Replays a fixed list of rolls in order.
/// Panics when the script runs dry: a scripted innings that needs more rolls than
/// it was given is a broken test, not a recoverable condition.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
    consumed: usize,
}

impl ScriptedDice {
    pub fn new(rolls: &[u8]) -> Self {
        for &r in rolls {
            assert!((1..=6).contains(&r), "scripted roll {} is not a die face", r);
        }
        ScriptedDice {
            rolls: rolls.iter().copied().collect(),
            consumed: 0,
        }
    }

    /// Script that repeats `pattern` until `total` rolls are queued
    pub fn cycle(pattern: &[u8], total: usize) -> Self {
        let rolls: Vec<u8> = pattern.iter().copied().cycle().take(total).collect();
        Self::new(&rolls)
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let roll = self
            .rolls
            .pop_front()
            .unwrap_or_else(|| panic!("scripted dice exhausted after {} rolls", self.consumed));
        self.consumed += 1;
        roll
    }
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn roll(&mut self) -> u8 {
        (**self).roll()
    }
}
