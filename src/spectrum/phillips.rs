//! Phillips initial spectrum (Tessendorf, "Simulating Ocean Water").

use bytemuck::{Pod, Zeroable};
use log::{info, warn};
use wgpu::util::DeviceExt;

use super::SpectrumSource;
use crate::error::OceanError;
use crate::field::{Field, FieldLayout};
use crate::gpu::{sampled_entry, storage_entry, uniform_entry, workgroup_count};
use crate::noise::{NoiseField, NoiseSource};
use crate::params::{SpectrumParams, GRAVITY_M_PER_S2};

/// Uniform block for `phillips.wgsl` (32 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PhillipsUniforms {
    texture_size: u32,
    tile_scale: f32,
    wind_speed: f32,
    small_wave_length_cutoff: f32,
    wind_direction: [f32; 2],
    amplitude: f32,
    gravity: f32,
}

/// Phillips spectrum computed once on the GPU at construction
pub struct PhillipsSpectrum {
    params: SpectrumParams,
    /// Standard-normal complex noise the spectrum was built from
    gaussian_noise: Field,
    h0: Field,
}

impl PhillipsSpectrum {
    /// Build the spectrum from a noise field drawn with `params.seed`
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: SpectrumParams,
    ) -> Result<Self, OceanError> {
        params.validate()?;
        let noise = NoiseSource::new(params.seed).generate(params.texture_size);
        Self::with_noise(device, queue, params, &noise)
    }

    /// Build the spectrum from an explicit noise field
    pub fn with_noise(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: SpectrumParams,
        noise: &NoiseField,
    ) -> Result<Self, OceanError> {
        params.validate()?;
        if noise.size != params.texture_size {
            return Err(OceanError::SizeMismatch {
                expected: params.texture_size,
                found: noise.size,
            });
        }

        let size = params.texture_size;
        let largest_wave = params.largest_wave_m();
        if largest_wave > params.tile_scale {
            warn!(
                "Largest wave ({:.1} m) exceeds the tile ({:.1} m); expect visible tiling",
                largest_wave, params.tile_scale
            );
        }

        let gaussian_noise = Field::new(device, "gaussian noise", size, FieldLayout::Rg);
        gaussian_noise.upload(queue, &noise.to_values())?;
        let h0 = Field::new(device, "h0", size, FieldLayout::Rgba);

        let uniforms = PhillipsUniforms {
            texture_size: size,
            tile_scale: params.tile_scale,
            wind_speed: params.wind_speed,
            small_wave_length_cutoff: params.small_wave_length_cutoff,
            wind_direction: params.wind_direction().to_array(),
            amplitude: params.amplitude,
            gravity: GRAVITY_M_PER_S2,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Phillips Params Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Phillips Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/phillips.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Phillips Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                sampled_entry(1),
                storage_entry(2),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Phillips Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(gaussian_noise.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(h0.view()),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Phillips Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Phillips Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Phillips Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Phillips Compute Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let groups = workgroup_count(size);
            pass.dispatch_workgroups(groups, groups, 1);
        }
        queue.submit(Some(encoder.finish()));

        info!(
            "Phillips spectrum: {}x{} texels, tile {} m, wind {} m/s at {:.2} rad",
            size, size, params.tile_scale, params.wind_speed, params.wind_theta
        );

        Ok(Self {
            params,
            gaussian_noise,
            h0,
        })
    }

    pub fn params(&self) -> &SpectrumParams {
        &self.params
    }

    pub fn gaussian_noise(&self) -> &Field {
        &self.gaussian_noise
    }
}

impl SpectrumSource for PhillipsSpectrum {
    fn texture_size(&self) -> u32 {
        self.params.texture_size
    }

    fn tile_scale(&self) -> f32 {
        self.params.tile_scale
    }

    fn h0(&self) -> &Field {
        &self.h0
    }
}
