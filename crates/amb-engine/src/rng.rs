//! Seedable pseudorandom number generator.
//!
//! Pass the same seed to [`Rng::new`] to get the same stream back again,
//! which is what makes the statistical progression strategies testable.

/// A non-cryptographic PRNG for the harmony strategies.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self(oorandom::Rand64::new(seed as u128))
    }

    /// Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f32 {
        self.0.rand_float() as f32
    }

    /// Uniform integer in [0, bound).
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.0.rand_range(0..bound as u64) as u32
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(0x5EED_CAFE)
    }
}
