//! Random sampling for outcome, destroy, and cascade rolls.
//!
//! Resolution code only sees the object-safe [`Dice`] trait, so a server
//! can share one generator across actors while tests replay exact rolls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random samples.
pub trait Dice: Send {
    /// A uniform real in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// A uniform integer in `[low, high]`. Returns `low` when the range is
    /// empty.
    fn roll(&mut self, low: i32, high: i32) -> i32;

    /// A uniform real in `[low, high)`. Returns `low` when the range is
    /// empty.
    fn between(&mut self, low: f64, high: f64) -> f64;
}

/// Adapts any [`rand::Rng`] into [`Dice`].
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl<R: Rng + Send> Dice for RngDice<R> {
    fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn roll(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.0.random_range(low..=high)
    }

    fn between(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.0.random_range(low..high)
    }
}

/// Thread-safe generator shared by every actor queue.
///
/// Cloning shares the underlying generator.
#[derive(Debug, Clone)]
pub struct SharedDice {
    inner: Arc<Mutex<RngDice<StdRng>>>,
}

impl SharedDice {
    /// A generator seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::wrap(StdRng::from_os_rng())
    }

    /// A reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self::wrap(StdRng::seed_from_u64(seed))
    }

    fn wrap(rng: StdRng) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RngDice(rng))),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut RngDice<StdRng>) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Dice for SharedDice {
    fn unit(&mut self) -> f64 {
        self.with(|dice| dice.unit())
    }

    fn roll(&mut self, low: i32, high: i32) -> i32 {
        self.with(|dice| dice.roll(low, high))
    }

    fn between(&mut self, low: f64, high: f64) -> f64 {
        self.with(|dice| dice.between(low, high))
    }
}

/// Replays queued values in order.
///
/// Each kind of sample has its own queue. Integer and real values are
/// clamped into the requested range so a script cannot produce an
/// impossible roll. An exhausted queue yields the low end of the range
/// (and `0.0` for unit samples).
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    units: VecDeque<f64>,
    rolls: VecDeque<i32>,
    reals: VecDeque<f64>,
}

impl ScriptedDice {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue unit samples.
    #[must_use]
    pub fn with_units(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(values);
        self
    }

    /// Queue integer rolls.
    #[must_use]
    pub fn with_rolls(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.rolls.extend(values);
        self
    }

    /// Queue real-range samples.
    #[must_use]
    pub fn with_reals(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.reals.extend(values);
        self
    }

    /// Integer rolls not yet consumed.
    pub fn remaining_rolls(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn unit(&mut self) -> f64 {
        self.units.pop_front().map_or(0.0, |v| v.clamp(0.0, 1.0))
    }

    fn roll(&mut self, low: i32, high: i32) -> i32 {
        match self.rolls.pop_front() {
            Some(v) if low < high => v.clamp(low, high),
            _ => low,
        }
    }

    fn between(&mut self, low: f64, high: f64) -> f64 {
        match self.reals.pop_front() {
            Some(v) if low < high => v.clamp(low, high),
            _ => low,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn rng_dice_stays_in_range() {
        let mut dice = RngDice(SmallRng::seed_from_u64(42));
        for _ in 0..1_000 {
            let roll = dice.roll(1, 300);
            assert!((1..=300).contains(&roll));
            let unit = dice.unit();
            assert!((0.0..1.0).contains(&unit));
            let real = dice.between(0.03, 0.06);
            assert!((0.03..0.06).contains(&real));
        }
    }

    #[test]
    fn empty_ranges_return_low() {
        let mut dice = RngDice(SmallRng::seed_from_u64(1));
        assert_eq!(dice.roll(5, 5), 5);
        assert_eq!(dice.roll(9, 3), 9);
        #[allow(clippy::float_cmp)]
        {
            assert_eq!(dice.between(0.5, 0.5), 0.5);
        }
    }

    #[test]
    fn seeded_shared_dice_is_reproducible() {
        let mut a = SharedDice::seeded(7);
        let mut b = SharedDice::seeded(7);
        let left: Vec<i32> = (0..20).map(|_| a.roll(1, 200)).collect();
        let right: Vec<i32> = (0..20).map(|_| b.roll(1, 200)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn shared_clones_share_state() {
        let mut a = SharedDice::seeded(3);
        let mut b = a.clone();
        let mut fresh = SharedDice::seeded(3);
        let first = a.roll(1, 1_000_000);
        let second = b.roll(1, 1_000_000);
        assert_eq!(first, fresh.roll(1, 1_000_000));
        assert_eq!(second, fresh.roll(1, 1_000_000));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn scripted_dice_replays_and_clamps() {
        let mut dice = ScriptedDice::new()
            .with_rolls([250, 500])
            .with_units([0.25]);
        assert_eq!(dice.roll(1, 300), 250);
        assert_eq!(dice.roll(1, 300), 300);
        assert_eq!(dice.roll(1, 300), 1);
        assert_eq!(dice.unit(), 0.25);
        assert_eq!(dice.unit(), 0.0);
        assert_eq!(dice.between(0.01, 0.05), 0.01);
    }
}
