//! Seedable RNG for the few randomised decisions in a run.
//!
//! The destination locator picks uniformly among valid neighbours when a
//! point falls on an impassable cell.  That is the only random step in the
//! pipeline, so a single seeded `SmallRng` makes whole runs reproducible.
//!
//! Each surface variant (land-only, water-passable) takes its own child RNG
//! derived from the root seed, so adding a variant does not disturb the
//! choices made for existing ones.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic run-level RNG.
pub struct AccessRng(SmallRng);

impl AccessRng {
    pub fn new(seed: u64) -> Self {
        AccessRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child RNG for an independent stream, keyed by `offset`.
    pub fn child(&mut self, offset: u64) -> AccessRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        AccessRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Choose a uniformly random element.  Returns `None` for an empty slice.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
