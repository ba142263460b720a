//! Deterministic RNG service for battle decisions.
//!
//! Every random decision in a battle (accuracy rolls, secondary effect
//! chances, damage variance, speed ties) draws from a [`BattleRng`]. The
//! service is seeded once per battle and reseeded at every turn boundary from
//! `(seed, turn)`, so a turn's draws do not depend on how many draws earlier
//! turns consumed.
//!
//! [`BattleRng::with_seed_offset`] scopes a block of draws to a stream derived
//! from `(seed, offset)` and restores the battle stream afterwards, which makes
//! a decision point reproducible on its own.
//!
//! # Example
//!
//! ```
//! use skirmish_core::rng::BattleRng;
//!
//! let mut a = BattleRng::new(7);
//! let mut b = BattleRng::new(7);
//! a.begin_turn(3);
//! b.begin_turn(3);
//! assert_eq!(a.random_int(100), b.random_int(100));
//!
//! let scoped = a.with_seed_offset(99, |rng| rng.random_int(1000));
//! let again = b.with_seed_offset(99, |rng| rng.random_int(1000));
//! assert_eq!(scoped, again);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded integer generator shared by hit resolution and effect fragments.
#[derive(Debug, Clone)]
pub struct BattleRng {
    /// Battle seed all streams derive from.
    seed: u64,
    /// Active stream.
    stream: ChaCha8Rng,
    /// Number of values drawn since construction.
    draws: u64,
}

impl BattleRng {
    /// Creates a generator for the given battle seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            stream: ChaCha8Rng::seed_from_u64(mix_seed(seed, 0)),
            draws: 0,
        }
    }

    /// Returns the battle seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns how many values have been drawn so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Reseeds the battle stream for the given turn.
    pub fn begin_turn(&mut self, turn: u32) {
        self.stream = ChaCha8Rng::seed_from_u64(mix_seed(self.seed, u64::from(turn) << 6));
    }

    /// Draws an integer in `[0, bound)`.
    ///
    /// A bound of 0 or 1 has a single outcome and returns 0 without drawing.
    pub fn random_int(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        self.draws += 1;
        self.stream.gen_range(0..bound)
    }

    /// Draws an integer in `[min, max]` (inclusive).
    ///
    /// Returns `min` without drawing when the range is empty or a single value.
    pub fn random_int_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.draws += 1;
        self.stream.gen_range(min..=max)
    }

    /// Shuffles a slice in place (Fisher-Yates over [`random_int`](Self::random_int)).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            #[allow(clippy::cast_possible_truncation)]
            let j = self.random_int(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Runs `f` against a stream seeded from `(seed, offset)`.
    ///
    /// The battle stream is restored when `f` returns, so the draws made
    /// inside do not advance it. Nested calls restore in order.
    pub fn with_seed_offset<R>(&mut self, offset: u64, f: impl FnOnce(&mut Self) -> R) -> R {
        let scoped = ChaCha8Rng::seed_from_u64(mix_seed(self.seed, offset ^ OFFSET_SALT));
        let saved = std::mem::replace(&mut self.stream, scoped);
        let result = f(self);
        self.stream = saved;
        result
    }
}

/// Keeps offset streams apart from turn streams with the same numeric salt.
const OFFSET_SALT: u64 = 0xa076_1d64_78bd_642f;

/// Mixes a seed with a salt using the SplitMix64 finalizer.
fn mix_seed(seed: u64, salt: u64) -> u64 {
    let mut hash = seed ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    hash ^= hash >> 30;
    hash = hash.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    hash ^= hash >> 27;
    hash = hash.wrapping_mul(0x94d0_49bb_1331_11eb);
    hash ^ (hash >> 31)
}
