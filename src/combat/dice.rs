//! Dice: the single source of randomness
//!
//! Every random branch in the engine draws from one `Dice`:
//! - Damage jitter within an inclusive range
//! - Effect, proc and retreat chances
//! - Weighted encounter picks
//!
//! Seed it for reproducible fights.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seedable random source
#[derive(Debug, Clone)]
pub struct Dice {
    rng: StdRng,
    seed: Option<u64>,
}

impl Dice {
    /// Reproducible dice
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Dice seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            seed: None,
        }
    }

    /// Seed these dice were built from, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform roll in `[min, max]`; a collapsed or inverted range yields `min`
    pub fn roll_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Roll a `(min, max)` jitter pair
    pub fn jitter(&mut self, range: (i32, i32)) -> i32 {
        self.roll_range(range.0, range.1)
    }

    /// True with probability `p`.
    ///
    /// Certain outcomes do not draw, so forcing 0.0 or 1.0 never shifts the
    /// stream for later rolls.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.random::<f64>() < p
    }

    /// Index drawn by weight; all-zero or empty weights fall back to 0
    pub fn weighted(&mut self, weights: &[u32]) -> usize {
        match WeightedIndex::new(weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0,
        }
    }

    /// Uniform pick from a slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..items.len());
        items.get(index)
    }
}
