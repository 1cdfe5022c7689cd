//! Host-side simulation clock.

use crate::error::OceanError;

/// Elapsed simulation time, accumulated in f64
///
/// An f32 accumulator stops resolving 1/60 s steps after about a day of
/// simulated time, so the value is only narrowed when it reaches a shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    elapsed_seconds: f64,
    frames: u64,
}

impl SimulationClock {
    pub fn new(initial_elapsed_seconds: f64) -> Self {
        Self {
            elapsed_seconds: initial_elapsed_seconds,
            frames: 0,
        }
    }

    /// Advance by one frame; rejects negative or non-finite deltas
    pub fn advance(&mut self, delta_seconds: f64) -> Result<f64, OceanError> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(OceanError::InvalidParameter {
                name: "delta_seconds",
                value: delta_seconds,
            });
        }
        self.elapsed_seconds += delta_seconds;
        self.frames += 1;
        Ok(self.elapsed_seconds)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Elapsed time as written into uniform blocks
    pub fn shader_seconds(&self) -> f32 {
        self.elapsed_seconds as f32
    }

    /// Frames advanced since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
