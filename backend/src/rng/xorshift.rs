//! xorshift64* random number generator
//!
//! Fast, seedable PRNG used for every random draw in the simulator:
//! section capacities, acceptance decisions and per-actor seed derivation.
//!
//! # Determinism
//!
//! Same seed → same sequence. Each actor owns its own generator, so the
//! draws an actor makes are reproducible for a given master seed even
//! though the interleaving of actors is not.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use course_allocation_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let seats = rng.range_inclusive(1, 5); // [1, 5]
/// assert!((1..=5).contains(&seats));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift cannot leave the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max]
    ///
    /// # Panics
    /// Panics if min > max
    ///
    /// # Example
    /// ```
    /// use course_allocation_core::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// assert_eq!(rng.range_inclusive(3, 3), 3);
    /// ```
    pub fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
        assert!(min <= max, "min must not exceed max");

        let span = max - min;
        if span == u64::MAX {
            return self.next();
        }
        min + self.next() % (span + 1)
    }

    /// Derive a seed for an independent child generator
    ///
    /// The orchestrator hands one child seed to every actor.
    pub fn derive_seed(&mut self) -> u64 {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_behaves_like_one() {
        let mut zero = RngManager::new(0);
        let mut one = RngManager::new(1);
        for _ in 0..10 {
            let value = zero.next();
            assert_ne!(value, 0);
            assert_eq!(value, one.next());
        }
    }

    #[test]
    #[should_panic(expected = "min must not exceed max")]
    fn test_range_inclusive_invalid_bounds() {
        let mut rng = RngManager::new(12345);
        rng.range_inclusive(2, 1);
    }

    #[test]
    fn test_range_inclusive_hits_both_ends() {
        let mut rng = RngManager::new(4242);
        let mut seen_min = false;
        let mut seen_max = false;

        for _ in 0..1000 {
            match rng.range_inclusive(1, 4) {
                1 => seen_min = true,
                4 => seen_max = true,
                v => assert!((1..=4).contains(&v)),
            }
        }

        assert!(seen_min && seen_max, "both bounds should be reachable");
    }

    #[test]
    fn test_derived_seeds_differ() {
        let mut master = RngManager::new(99);
        let a = master.derive_seed();
        let b = master.derive_seed();
        assert_ne!(a, b);
    }
}
