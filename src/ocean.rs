//! Per-frame ocean field synthesis and the block handed to the renderer.
//!
//! `OceanSurface` owns the whole compute chain
//! (`SpectrumSource` → `DynamicSpectrum` → three `IfftEngine` passes) and
//! exposes the spatial height, gradient and displacement maps together with
//! the tile scale they cover.

mod clock;
mod surface;
mod uniforms;

pub use clock::SimulationClock;
pub use surface::OceanSurface;
pub use uniforms::SurfaceUniforms;
