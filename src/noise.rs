//! Gaussian noise for seeding the initial spectrum.
//!
//! Each sample is a pair of independent standard-normal draws produced with
//! the Box–Muller transform from a seedable uniform generator, so the same
//! seed always yields the same ocean.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Row-major grid of complex standard-normal samples
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    pub size: u32,
    pub samples: Vec<[f32; 2]>,
}

impl NoiseField {
    /// Flatten to interleaved `re, im` values ready for an RG texture upload
    pub fn to_values(&self) -> Vec<f32> {
        bytemuck::cast_slice(&self.samples).to_vec()
    }
}

/// Seedable source of Gaussian noise fields
pub struct NoiseSource {
    rng: StdRng,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one standard-normal value: `cos(2π·u1)·sqrt(-2·ln(u2))`
    pub fn gaussian(&mut self) -> f32 {
        let u1: f32 = self.rng.gen();
        // gen() is in [0, 1); flip so ln never sees zero
        let u2: f32 = 1.0 - self.rng.gen::<f32>();
        (2.0 * PI * u1).cos() * (-2.0 * u2.ln()).sqrt()
    }

    /// Generate a `size`×`size` field of complex samples
    pub fn generate(&mut self, size: u32) -> NoiseField {
        let count = (size as usize).pow(2);
        let samples = (0..count)
            .map(|_| [self.gaussian(), self.gaussian()])
            .collect();
        NoiseField { size, samples }
    }
}
