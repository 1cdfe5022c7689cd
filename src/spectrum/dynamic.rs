//! Time-dependent spectrum evaluation.

use bytemuck::{Pod, Zeroable};
use log::{debug, info};

use super::SpectrumSource;
use crate::error::OceanError;
use crate::field::{Field, FieldLayout};
use crate::gpu::{sampled_entry, storage_entry, uniform_entry, workgroup_count};
use crate::params::GRAVITY_M_PER_S2;

/// Uniform block for `dynamic_spectrum.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct DynamicUniforms {
    texture_size: u32,
    tile_scale: f32,
    elapsed_seconds: f32,
    gravity: f32,
}

/// Evaluates `H(k,t)`, `D_H(k,t)` and `Displacement(k,t)` from `h0` in one dispatch
///
/// - `height`: `h0(k)·e^{iωt} + h0*(-k)·e^{-iωt}`
/// - `gradient`: `i·kx·H + i·(i·kz·H)`, i.e. slope x in the real part and
///   slope z in the imaginary part after the inverse transform
/// - `displacement`: same packing with `k/|k|` instead of `k`, zero at `k = 0`
pub struct DynamicSpectrum {
    texture_size: u32,
    tile_scale: f32,
    height: Field,
    gradient: Field,
    displacement: Field,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::ComputePipeline,
}

impl DynamicSpectrum {
    pub fn new(device: &wgpu::Device, source: &dyn SpectrumSource) -> Result<Self, OceanError> {
        let h0 = source.h0();
        h0.expect_layout(FieldLayout::Rgba)?;
        h0.expect_size(source.texture_size())?;

        let size = source.texture_size();
        let height = Field::new(device, "height spectrum", size, FieldLayout::Rg);
        let gradient = Field::new(device, "gradient spectrum", size, FieldLayout::Rg);
        let displacement = Field::new(device, "displacement spectrum", size, FieldLayout::Rg);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dynamic Spectrum Params Buffer"),
            size: std::mem::size_of::<DynamicUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Dynamic Spectrum Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/dynamic_spectrum.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Dynamic Spectrum Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                sampled_entry(1),
                storage_entry(2),
                storage_entry(3),
                storage_entry(4),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Dynamic Spectrum Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(h0.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(height.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(gradient.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(displacement.view()),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Dynamic Spectrum Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Dynamic Spectrum Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        info!("Dynamic spectrum ready ({}x{})", size, size);

        Ok(Self {
            texture_size: size,
            tile_scale: source.tile_scale(),
            height,
            gradient,
            displacement,
            uniform_buffer,
            bind_group,
            pipeline,
        })
    }

    /// Record the evaluation of all three spectra at `elapsed_seconds`
    ///
    /// The clock is written to the queue immediately, so record at most one
    /// evaluation per submitted command buffer.
    pub fn generate(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        elapsed_seconds: f32,
    ) {
        let uniforms = DynamicUniforms {
            texture_size: self.texture_size,
            tile_scale: self.tile_scale,
            elapsed_seconds,
            gravity: GRAVITY_M_PER_S2,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        debug!("Dynamic spectrum at t = {:.3} s", elapsed_seconds);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Dynamic Spectrum Compute Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        let groups = workgroup_count(self.texture_size);
        pass.dispatch_workgroups(groups, groups, 1);
    }

    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    pub fn height(&self) -> &Field {
        &self.height
    }

    pub fn gradient(&self) -> &Field {
        &self.gradient
    }

    pub fn displacement(&self) -> &Field {
        &self.displacement
    }
}
