//! Frame orchestration: clock, dynamic spectrum and inverse transforms.

use std::sync::Arc;

use glam::Vec3;
use log::{debug, info};

use super::{SimulationClock, SurfaceUniforms};
use crate::copy::TextureCopier;
use crate::error::OceanError;
use crate::fft::IfftEngine;
use crate::field::{Field, FieldLayout};
use crate::params::{SimulationParams, SpectrumParams};
use crate::spectrum::{DynamicSpectrum, PhillipsSpectrum, SpectrumSource};

/// Spatial ocean fields for one tile, regenerated every frame
///
/// After `update`, the three maps hold:
/// - `height_map`: surface elevation in the real channel
/// - `gradient_map`: `∂h/∂x` (real) and `∂h/∂z` (imaginary)
/// - `displacement_map`: horizontal choppy offset, x (real) and z (imaginary)
pub struct OceanSurface<S: SpectrumSource = PhillipsSpectrum> {
    spectrum: S,
    dynamic: DynamicSpectrum,
    ifft: IfftEngine,
    height_map: Field,
    gradient_map: Field,
    displacement_map: Field,
    clock: SimulationClock,
}

impl OceanSurface<PhillipsSpectrum> {
    /// Build a surface driven by a Phillips spectrum
    pub fn phillips(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        spectrum: SpectrumParams,
        simulation: SimulationParams,
    ) -> Result<Self, OceanError> {
        let spectrum = PhillipsSpectrum::new(device, queue, spectrum)?;
        Self::new(device, queue, spectrum, simulation)
    }
}

impl<S: SpectrumSource> OceanSurface<S> {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        spectrum: S,
        simulation: SimulationParams,
    ) -> Result<Self, OceanError> {
        let size = spectrum.texture_size();
        let dynamic = DynamicSpectrum::new(device, &spectrum)?;

        let copier = Arc::new(TextureCopier::new(device));
        let ifft = IfftEngine::new(device, queue, size, simulation.normalization, copier)?;

        let height_map = Field::new(device, "height map", size, FieldLayout::Rg);
        let gradient_map = Field::new(device, "gradient map", size, FieldLayout::Rg);
        let displacement_map = Field::new(device, "displacement map", size, FieldLayout::Rg);

        info!(
            "Ocean surface: {}x{} over {} m, clock starts at {} s",
            size,
            size,
            spectrum.tile_scale(),
            simulation.initial_elapsed_seconds
        );

        Ok(Self {
            spectrum,
            dynamic,
            ifft,
            height_map,
            gradient_map,
            displacement_map,
            clock: SimulationClock::new(simulation.initial_elapsed_seconds),
        })
    }

    /// Advance the clock by `delta_seconds` and regenerate all three maps
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        delta_seconds: f64,
    ) -> Result<(), OceanError> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Ocean Frame Encoder"),
        });
        self.encode(device, queue, &mut encoder, delta_seconds)?;
        queue.submit(Some(encoder.finish()));
        Ok(())
    }

    /// Record one frame into `encoder` without submitting it
    ///
    /// The dynamic spectrum clock is written to `queue` immediately, so the
    /// encoder must be submitted before the next frame is recorded.
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        delta_seconds: f64,
    ) -> Result<(), OceanError> {
        let elapsed_seconds = self.clock.advance(delta_seconds)?;
        debug!(
            "Ocean frame {} at t = {:.3} s",
            self.clock.frames(),
            elapsed_seconds
        );

        self.dynamic
            .generate(queue, encoder, self.clock.shader_seconds());

        self.ifft
            .apply(device, encoder, self.dynamic.height(), &self.height_map)?;
        self.ifft
            .apply(device, encoder, self.dynamic.gradient(), &self.gradient_map)?;
        self.ifft.apply(
            device,
            encoder,
            self.dynamic.displacement(),
            &self.displacement_map,
        )?;

        Ok(())
    }

    /// Uniform block for the renderer at the current clock
    pub fn surface_uniforms(
        &self,
        camera_position: Option<Vec3>,
        light_direction: Vec3,
    ) -> Result<SurfaceUniforms, OceanError> {
        SurfaceUniforms::new(
            camera_position,
            light_direction,
            self.tile_scale(),
            self.clock.shader_seconds(),
        )
    }

    pub fn spectrum(&self) -> &S {
        &self.spectrum
    }

    pub fn texture_size(&self) -> u32 {
        self.spectrum.texture_size()
    }

    /// Side length of the simulated tile (meters)
    pub fn tile_scale(&self) -> f32 {
        self.spectrum.tile_scale()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Frames generated since construction
    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    pub fn height_map(&self) -> &Field {
        &self.height_map
    }

    pub fn gradient_map(&self) -> &Field {
        &self.gradient_map
    }

    pub fn displacement_map(&self) -> &Field {
        &self.displacement_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::test_support;

    fn real_and_imaginary(values: &[f32]) -> (Vec<f32>, Vec<f32>) {
        values.chunks(2).map(|c| (c[0], c[1])).unzip()
    }

    #[test]
    fn test_clock_starts_at_configured_offset() {
        let Some(ctx) = test_support::context() else {
            return;
        };
        let spectrum = SpectrumParams {
            texture_size: 16,
            ..Default::default()
        };
        let mut ocean =
            OceanSurface::phillips(&ctx.device, &ctx.queue, spectrum, SimulationParams::default())
                .unwrap();
        assert_eq!(ocean.elapsed_seconds(), 3600.0);

        ocean.update(&ctx.device, &ctx.queue, 0.5).unwrap();
        ocean.update(&ctx.device, &ctx.queue, 0.25).unwrap();
        assert_eq!(ocean.elapsed_seconds(), 3600.75);
        assert_eq!(ocean.frames(), 2);

        assert!(matches!(
            ocean.update(&ctx.device, &ctx.queue, -1.0),
            Err(OceanError::InvalidParameter { name: "delta_seconds", .. })
        ));
        assert_eq!(ocean.elapsed_seconds(), 3600.75);

        let uniforms = ocean
            .surface_uniforms(Some(Vec3::new(1.0, 2.0, 3.0)), Vec3::Y)
            .unwrap();
        assert_eq!(uniforms.tile_scale, 1000.0);
        assert_eq!(uniforms.elapsed_seconds, 3600.75);
        assert!(matches!(
            ocean.surface_uniforms(None, Vec3::Y),
            Err(OceanError::MissingCamera)
        ));
    }

    #[test]
    fn test_phillips_surface_is_real_with_zero_mean() {
        let Some(ctx) = test_support::context() else {
            return;
        };
        let spectrum = SpectrumParams {
            texture_size: 256,
            tile_scale: 1000.0,
            wind_speed: 31.0,
            wind_theta: 0.0,
            ..Default::default()
        };
        let mut ocean =
            OceanSurface::phillips(&ctx.device, &ctx.queue, spectrum, SimulationParams::default())
                .unwrap();
        ocean.update(&ctx.device, &ctx.queue, 0.0).unwrap();

        let height = pollster::block_on(ocean.height_map().read(&ctx.device, &ctx.queue)).unwrap();
        let (real, imaginary) = real_and_imaginary(&height);

        let peak = real.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(peak > 0.0, "flat surface");
        let mean = real.iter().map(|v| *v as f64).sum::<f64>() / real.len() as f64;
        assert!(mean.abs() < 1e-2, "mean height {}", mean);

        // Hermitian spectrum: imaginary residue is rounding noise
        let residue = imaginary.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(residue < 1e-3 * peak.max(1.0), "imaginary residue {}", residue);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let Some(ctx) = test_support::context() else {
            return;
        };
        let n = 64usize;
        let spectrum = SpectrumParams {
            texture_size: n as u32,
            tile_scale: 200.0,
            wind_speed: 10.0,
            // Short cutoff keeps the field smooth relative to the grid spacing
            small_wave_length_cutoff: 5.0,
            ..Default::default()
        };
        let mut ocean =
            OceanSurface::phillips(&ctx.device, &ctx.queue, spectrum, SimulationParams::default())
                .unwrap();
        ocean.update(&ctx.device, &ctx.queue, 1.0).unwrap();

        let height = pollster::block_on(ocean.height_map().read(&ctx.device, &ctx.queue)).unwrap();
        let gradient =
            pollster::block_on(ocean.gradient_map().read(&ctx.device, &ctx.queue)).unwrap();
        let (h, _) = real_and_imaginary(&height);
        let (slope_x, slope_z) = real_and_imaginary(&gradient);

        // Central differences over one texel: the two estimates should agree
        // in direction far better than chance
        let dx = 200.0 / n as f32;
        let at = |x: usize, y: usize| h[(y % n) * n + x % n];
        let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
        for y in 0..n {
            for x in 0..n {
                let fd_x = (at(x + 1, y) - at(x + n - 1, y)) / (2.0 * dx);
                let fd_z = (at(x, y + 1) - at(x, y + n - 1)) / (2.0 * dx);
                let i = y * n + x;
                dot += (fd_x * slope_x[i] + fd_z * slope_z[i]) as f64;
                norm_a += (fd_x * fd_x + fd_z * fd_z) as f64;
                norm_b += (slope_x[i] * slope_x[i] + slope_z[i] * slope_z[i]) as f64;
            }
        }
        let correlation = dot / (norm_a.sqrt() * norm_b.sqrt());
        assert!(correlation > 0.8, "gradient correlation {}", correlation);
    }
}
