//! Frequency-domain ocean spectra.
//!
//! An initial spectrum fixes `h0(k)` once; the dynamic spectrum evolves it
//! to any time `t` through the deep-water dispersion relation.

mod dynamic;
mod phillips;

// Re-export public types
pub use dynamic::DynamicSpectrum;
pub use phillips::PhillipsSpectrum;

use crate::field::Field;

/// Anything that can serve as the initial spectrum of the simulation
///
/// `h0` must be an RGBA field: channels (0, 1) hold `h0(k)` and channels
/// (2, 3) hold `h0*(-k)`. Texel `(x, y)` stands for the wavevector
/// `2π / tile_scale · (x - N/2, y - N/2)`.
pub trait SpectrumSource {
    /// Texels per side (N)
    fn texture_size(&self) -> u32;

    /// Spatial period of the tile in meters
    fn tile_scale(&self) -> f32;

    fn h0(&self) -> &Field;
}
