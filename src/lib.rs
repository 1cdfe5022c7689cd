//! oceanfft - GPU ocean surface synthesis with the Tessendorf FFT method
//!
//! A Phillips spectrum is built once, evolved in time every frame, and turned
//! into spatial height, gradient and displacement maps by a compute-shader
//! inverse FFT.

pub mod cli;
pub mod copy;
pub mod error;
pub mod export;
pub mod fft;
pub mod field;
pub mod gpu;
pub mod noise;
pub mod ocean;
pub mod params;
pub mod spectrum;

pub use error::OceanError;
pub use gpu::GpuContext;
pub use ocean::{OceanSurface, SurfaceUniforms};
