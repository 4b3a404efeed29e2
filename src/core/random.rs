//! Seeded randomness for the simulation
//!
//! Every random draw inside the tick loop goes through a `PseudoRandom`
//! seeded from game state, so replays reproduce the same outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct PseudoRandom {
    rng: ChaCha8Rng,
}

impl PseudoRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `[min, max)`. Returns `min` for an empty range.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// True with probability `1 / odds`
    pub fn chance(&mut self, odds: u32) -> bool {
        if odds <= 1 {
            return true;
        }
        self.rng.gen_range(0..odds) == 0
    }

    pub fn rand_element<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..items.len());
        items.get(idx)
    }
}

/// Stable string hash (FNV-1a) for deriving seeds and tick offsets from names
pub fn simple_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
