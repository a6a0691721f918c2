//! Deterministic random number generation for card draws.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical draws
//! - **Context streams**: Independent sequences for different purposes
//!
//! ```
//! use math_idle::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let values = rng.draw_values(5, 10);
//!
//! assert_eq!(values.len(), 5);
//! assert!(values.iter().all(|v| (0..=10).contains(v)));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Deterministic RNG used to draw card values.
///
/// Uses ChaCha8 for speed while keeping a high-quality uniform distribution.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    /// Create from an optional fixed seed, falling back to entropy.
    #[must_use]
    pub fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    /// Seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Draw a single value uniformly from `[0, number_range]`.
    pub fn draw_value(&mut self, number_range: i64) -> i64 {
        self.inner.gen_range(0..=number_range.max(0))
    }

    /// Draw `count` values uniformly from `[0, number_range]`.
    pub fn draw_values(&mut self, count: usize, number_range: i64) -> Vec<i64> {
        (0..count).map(|_| self.draw_value(number_range)).collect()
    }
}
