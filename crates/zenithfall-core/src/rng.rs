//! Deterministic random number generation
//!
//! Resolvers never reach for ambient randomness. They draw from a
//! [`RandomSource`], which the engine backs with a [`GameRng`] whose state
//! lives inside each run, so a user's outcomes replay identically from the
//! same starting record.

use serde::{Deserialize, Serialize};

/// Source of randomness injected into resolvers
///
/// Only `next_u64` is required; every other draw is derived from it so test
/// doubles can script exact outcomes.
pub trait RandomSource {
    /// Generate the next raw u64 value
    fn next_u64(&mut self) -> u64;

    /// Generate a random f64 in range [0, 1)
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random i64 in range [min, max]
    fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let range = (max - min + 1) as u64;
        min + (self.next_u64() % range) as i64
    }

    /// Generate a random bool with given probability of true
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Pick a random index for a weighted list
    ///
    /// Returns None if weights is empty or no weight is positive. Entries
    /// with a non-positive weight are never picked.
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let threshold = self.next_f64() * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_positive = Some(i);
            if threshold < cumulative {
                return Some(i);
            }
        }

        // Float accumulation can leave threshold a hair above the final sum
        last_positive
    }
}

/// A deterministic random number generator
///
/// Uses xorshift64 for simplicity and reproducibility across platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // Ensure non-zero state (xorshift requires this)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG from a saved state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Derive a per-key seed from a base seed (FNV-1a over the key)
    pub fn derive_seed(base: u64, key: &str) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in key.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        base ^ hash
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for GameRng {
    fn next_u64(&mut self) -> u64 {
        // xorshift64 algorithm
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}
