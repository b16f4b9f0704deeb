//! Injectable randomness.
//!
//! Every random draw in the storefront (coinflip outcomes, network fees,
//! simulated deposit amounts) goes through [`RandomSource`], so tests can
//! substitute a scripted sequence.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

use crate::models::CoinSide;

/// A source of uniform random numbers.
pub trait RandomSource: core::fmt::Debug + Send {
    /// Returns a uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Flips a fair coin.
    #[inline]
    fn flip(&mut self) -> CoinSide {
        if self.next_unit() < 0.5 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }

    /// Returns a uniform value in `[low, high)`.
    #[inline]
    fn next_in_range(&mut self, low: f64, high: f64) -> f64 {
        (high - low).mul_add(self.next_unit(), low)
    }
}

/// Random source backed by an OS-seeded [`StdRng`].
#[derive(Debug)]
pub struct StdRandom {
    /// Underlying generator.
    rng: StdRng,
}

impl StdRandom {
    /// Creates a generator seeded from OS entropy.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible generator from a fixed seed.
    #[inline]
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Replays a fixed sequence of unit values, then repeats the last one.
///
/// An empty script yields `0.0`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    /// Values still to be returned.
    values: VecDeque<f64>,
    /// Value returned once the script is exhausted.
    last: f64,
}

impl ScriptedRandom {
    /// Creates a source that returns `values` in order.
    #[inline]
    #[must_use]
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
            last: 0.0,
        }
    }

    /// Creates a source whose coin flips land on the given sides in order.
    #[inline]
    #[must_use]
    pub fn coins<I: IntoIterator<Item = CoinSide>>(sides: I) -> Self {
        Self::new(sides.into_iter().map(|side| match side {
            CoinSide::Heads => 0.25,
            CoinSide::Tails => 0.75,
        }))
    }
}

impl RandomSource for ScriptedRandom {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        if let Some(value) = self.values.pop_front() {
            self.last = value;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_values_replay_then_repeat() {
        let mut random = ScriptedRandom::new([0.1, 0.9]);
        assert!((random.next_unit() - 0.1).abs() < f64::EPSILON);
        assert!((random.next_unit() - 0.9).abs() < f64::EPSILON);
        assert!((random.next_unit() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn scripted_coins_land_as_requested() {
        let mut random = ScriptedRandom::coins([CoinSide::Tails, CoinSide::Heads]);
        assert_eq!(random.flip(), CoinSide::Tails);
        assert_eq!(random.flip(), CoinSide::Heads);
    }

    #[test]
    fn range_maps_unit_interval() {
        let mut random = ScriptedRandom::new([0.5]);
        let value = random.next_in_range(2.0, 7.0);
        assert!((value - 4.5).abs() < 1e-9);
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let mut first = StdRandom::seeded(42);
        let mut second = StdRandom::seeded(42);
        for _ in 0..10 {
            assert!((first.next_unit() - second.next_unit()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn std_coin_is_roughly_fair() {
        let mut random = StdRandom::seeded(7);
        let heads = (0..10_000)
            .filter(|_| random.flip() == CoinSide::Heads)
            .count();
        assert!((4_700..=5_300).contains(&heads), "heads = {heads}");
    }
}
