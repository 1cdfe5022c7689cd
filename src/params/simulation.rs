//! Per-frame simulation parameters.

/// Constant folded into the final permutation pass of the inverse FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftNormalization {
    /// Plain Fourier series `h(x) = Σ h̃(k)·e^{ik·x}`; spectrum amplitudes are
    /// per-mode heights, so no extra factor is applied
    #[default]
    FourierSeries,

    /// Textbook inverse DFT, scaled by `1/N²`
    InverseDft,
}

impl FftNormalization {
    pub fn scale(self, texture_size: u32) -> f32 {
        match self {
            Self::FourierSeries => 1.0,
            Self::InverseDft => 1.0 / (texture_size as f32 * texture_size as f32),
        }
    }
}

/// Simulation clock and output convention
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Clock value at the first frame (seconds). Starts an hour in: at t = 0
    /// every mode is in phase and the surface looks discontinuous
    pub initial_elapsed_seconds: f64,

    /// Scale convention for the spatial fields
    pub normalization: FftNormalization,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_elapsed_seconds: 3600.0,
            normalization: FftNormalization::FourierSeries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_scale() {
        assert_eq!(FftNormalization::FourierSeries.scale(256), 1.0);
        assert_eq!(FftNormalization::InverseDft.scale(4), 1.0 / 16.0);
    }
}
