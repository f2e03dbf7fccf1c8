//! Noise generators.
//!
//! Both generators are mono and draw from a seedable [`StdRng`], so a fixed
//! seed reproduces the same output.

use super::generator::Generator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Leaky-integrator input weight.
const BROWN_FILTER_COEFFICIENT: f32 = 0.02;
/// Leaky-integrator normalization divisor.
const BROWN_NORMALIZATION: f32 = 1.02;
/// Makeup gain for the integrator's attenuation.
const BROWN_GAIN: f32 = 3.5;

/// White noise: independent uniform draws in `[-1.0, 1.0)`.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    rng: StdRng,
}

impl WhiteNoise {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a generator with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for WhiteNoise {
    fn channels(&self) -> u16 {
        1
    }

    fn next_frame(&mut self, frame: &mut [f32]) {
        if let Some(slot) = frame.first_mut() {
            *slot = self.next_sample();
        }
    }
}

/// Brown (red) noise approximated by a one-pole leaky integrator over white
/// noise.
///
/// `last = (last + 0.02 * white) / 1.02`, output `last * 3.5`. The output is
/// not clipped and can exceed `[-1.0, 1.0]` for long runs of same-signed
/// input.
#[derive(Debug, Clone)]
pub struct BrownNoise {
    white: WhiteNoise,
    last_output: f32,
}

impl BrownNoise {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            white: WhiteNoise::new(),
            last_output: 0.0,
        }
    }

    /// Creates a generator with a fixed seed.
    ///
    /// The white input matches [`WhiteNoise::with_seed`] for the same seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            white: WhiteNoise::with_seed(seed),
            last_output: 0.0,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let white = self.white.next_sample();
        self.last_output =
            (self.last_output + BROWN_FILTER_COEFFICIENT * white) / BROWN_NORMALIZATION;
        self.last_output * BROWN_GAIN
    }
}

impl Default for BrownNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for BrownNoise {
    fn channels(&self) -> u16 {
        1
    }

    fn next_frame(&mut self, frame: &mut [f32]) {
        if let Some(slot) = frame.first_mut() {
            *slot = self.next_sample();
        }
    }
}
