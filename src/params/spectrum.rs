//! Initial spectrum (Phillips model) parameters.

use glam::Vec2;

use crate::error::{ensure_positive, ensure_texture_size, OceanError};

/// Gravitational acceleration used by the dispersion relation (m/s²)
pub const GRAVITY_M_PER_S2: f32 = 9.81;

/// Construction-time configuration of the initial spectrum
#[derive(Debug, Clone)]
pub struct SpectrumParams {
    /// Texels per side of every field (power of two, N in Tessendorf's paper)
    pub texture_size: u32,

    /// Spatial period of one ocean tile in meters (Lx = Ly)
    pub tile_scale: f32,

    /// Wind direction in radians, measured from the +x axis towards +z
    pub wind_theta: f32,

    /// Wind speed in meters per second (sets the largest wave, L = V²/g)
    pub wind_speed: f32,

    /// Waves shorter than this length (meters) are damped out
    pub small_wave_length_cutoff: f32,

    /// Phillips constant A (dimensionless overall wave energy)
    pub amplitude: f32,

    /// Seed for the Gaussian noise field
    pub seed: u64,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        Self {
            texture_size: 512,
            tile_scale: 1000.0,
            wind_theta: 0.0,
            wind_speed: 31.0,
            small_wave_length_cutoff: 0.5,
            amplitude: 3e-4,
            seed: 42,
        }
    }
}

impl SpectrumParams {
    /// Unit vector pointing along the wind
    pub fn wind_direction(&self) -> Vec2 {
        Vec2::from_angle(self.wind_theta)
    }

    /// Largest wave length sustained by the wind (meters)
    pub fn largest_wave_m(&self) -> f32 {
        self.wind_speed * self.wind_speed / GRAVITY_M_PER_S2
    }

    /// Validate configuration (texture size must be a power of 2, scalars > 0)
    pub fn validate(&self) -> Result<(), OceanError> {
        ensure_texture_size(self.texture_size)?;
        ensure_positive("tile_scale", self.tile_scale)?;
        ensure_positive("wind_speed", self.wind_speed)?;
        ensure_positive("small_wave_length_cutoff", self.small_wave_length_cutoff)?;
        ensure_positive("amplitude", self.amplitude)?;
        if !self.wind_theta.is_finite() {
            return Err(OceanError::InvalidParameter {
                name: "wind_theta",
                value: self.wind_theta as f64,
            });
        }
        Ok(())
    }
}
