//! Parameter definitions with physical units and documented semantics.
//!
//! All tunables live here with:
//! - Physical units (meters, seconds, radians)
//! - Documented ranges and meanings
//! - Validation before any GPU state is built

mod recording;
mod simulation;
mod spectrum;

// Re-export all types
pub use recording::RecordingConfig;
pub use simulation::{FftNormalization, SimulationParams};
pub use spectrum::{SpectrumParams, GRAVITY_M_PER_S2};
