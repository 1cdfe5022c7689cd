//! Separable 2D inverse FFT on compute kernels.
//!
//! `IfftEngine::apply` records, for one RG field:
//! 1. log2(N) butterfly stages along rows,
//! 2. log2(N) butterfly stages along columns,
//! 3. the `(-1)^(x+y)` permutation (plus output scale) into the output field.
//!
//! The input and output fields form a two-slot ping-pong arena; the stage
//! loop returns which slot holds the latest data and a copy kernel moves it
//! back into the input slot when the parity requires it.

mod twiddle;

pub use twiddle::{Butterfly, TwiddleTable};

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use log::{debug, info};
use wgpu::util::DeviceExt;

use crate::copy::TextureCopier;
use crate::error::OceanError;
use crate::field::{Field, FieldLayout, STORAGE_BYTES_PER_TEXEL, STORAGE_FORMAT};
use crate::gpu::{sampled_entry, storage_entry, uniform_entry, workgroup_count};
use crate::params::FftNormalization;

/// Uniform block for one butterfly stage (`butterfly.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct StageUniforms {
    step: u32,
    texture_size: u32,
    _padding: [u32; 2],
}

/// Uniform block for `permutation.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PermutationUniforms {
    texture_size: u32,
    scale: f32,
    _padding: [u32; 2],
}

/// One of the two fields in the ping-pong arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The caller's frequency-domain field, reused as scratch
    Input,
    /// The caller's destination field
    Output,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }

    /// Slot holding the data after `stages` ping-pong stages starting in `self`
    pub fn after(self, stages: u32) -> Self {
        if stages % 2 == 0 {
            self
        } else {
            self.other()
        }
    }
}

/// Borrowed input/output pair addressed by `Slot`
struct PingPong<'a> {
    input: &'a Field,
    output: &'a Field,
}

impl<'a> PingPong<'a> {
    fn field(&self, slot: Slot) -> &'a Field {
        match slot {
            Slot::Input => self.input,
            Slot::Output => self.output,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

/// Inverse FFT for N×N RG fields, built once per texture size
pub struct IfftEngine {
    texture_size: u32,
    stages: u32,
    twiddle_texture: wgpu::Texture,
    twiddle_view: wgpu::TextureView,
    stage_buffers: Vec<wgpu::Buffer>,
    permutation_buffer: wgpu::Buffer,
    butterfly_layout: wgpu::BindGroupLayout,
    horizontal_pipeline: wgpu::ComputePipeline,
    vertical_pipeline: wgpu::ComputePipeline,
    permutation_layout: wgpu::BindGroupLayout,
    permutation_pipeline: wgpu::ComputePipeline,
    copier: Arc<TextureCopier>,
}

impl IfftEngine {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_size: u32,
        normalization: FftNormalization,
        copier: Arc<TextureCopier>,
    ) -> Result<Self, OceanError> {
        let table = TwiddleTable::new(texture_size)?;
        let stages = table.stages();

        // Width N/2, height log2(N): one texel per butterfly
        let twiddle_texture = Self::upload_twiddles(device, queue, &table);
        let twiddle_view = twiddle_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // One immutable parameter block per stage, so every dispatch of an
        // invocation can be recorded before anything is submitted
        let stage_buffers = (0..stages)
            .map(|step| {
                let uniforms = StageUniforms {
                    step,
                    texture_size,
                    _padding: [0; 2],
                };
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("IFFT Stage Params Buffer"),
                    contents: bytemuck::bytes_of(&uniforms),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })
            .collect();

        let permutation_uniforms = PermutationUniforms {
            texture_size,
            scale: normalization.scale(texture_size),
            _padding: [0; 2],
        };
        let permutation_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("IFFT Permutation Params Buffer"),
            contents: bytemuck::bytes_of(&permutation_uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let butterfly_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("IFFT Butterfly Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/butterfly.wgsl").into()),
        });
        let butterfly_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("IFFT Butterfly Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                sampled_entry(1),
                sampled_entry(2),
                storage_entry(3),
            ],
        });
        let butterfly_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("IFFT Butterfly Pipeline Layout"),
                bind_group_layouts: &[&butterfly_layout],
                push_constant_ranges: &[],
            });
        let horizontal_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("IFFT Horizontal Step Pipeline"),
            layout: Some(&butterfly_pipeline_layout),
            module: &butterfly_shader,
            entry_point: Some("horizontal_step"),
            compilation_options: Default::default(),
            cache: None,
        });
        let vertical_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("IFFT Vertical Step Pipeline"),
            layout: Some(&butterfly_pipeline_layout),
            module: &butterfly_shader,
            entry_point: Some("vertical_step"),
            compilation_options: Default::default(),
            cache: None,
        });

        let permutation_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("IFFT Permutation Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/permutation.wgsl").into()),
        });
        let permutation_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("IFFT Permutation Bind Group Layout"),
            entries: &[uniform_entry(0), sampled_entry(1), storage_entry(2)],
        });
        let permutation_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("IFFT Permutation Pipeline Layout"),
                bind_group_layouts: &[&permutation_layout],
                push_constant_ranges: &[],
            });
        let permutation_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("IFFT Permutation Pipeline"),
            layout: Some(&permutation_pipeline_layout),
            module: &permutation_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        info!(
            "IFFT engine: {}x{}, {} stages per axis, {:?}",
            texture_size, texture_size, stages, normalization
        );

        Ok(Self {
            texture_size,
            stages,
            twiddle_texture,
            twiddle_view,
            stage_buffers,
            permutation_buffer,
            butterfly_layout,
            horizontal_pipeline,
            vertical_pipeline,
            permutation_layout,
            permutation_pipeline,
            copier,
        })
    }

    fn upload_twiddles(device: &wgpu::Device, queue: &wgpu::Queue, table: &TwiddleTable) -> wgpu::Texture {
        let width = table.size() / 2;
        let height = table.stages();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("IFFT Twiddle Table"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STORAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&table.to_texels()),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * STORAGE_BYTES_PER_TEXEL),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        texture
    }

    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Butterfly stages per axis (log2 N)
    pub fn stages(&self) -> u32 {
        self.stages
    }

    /// RGBA32F texture of width N/2 and height log2(N)
    pub fn twiddle_texture(&self) -> &wgpu::Texture {
        &self.twiddle_texture
    }

    /// Slot holding the transform once both axes have run (before permutation)
    pub fn result_slot(&self) -> Slot {
        Slot::Input.after(2 * self.stages)
    }

    /// Record the inverse transform of `input` into `output`
    ///
    /// `input` is used as scratch and does not keep its frequency-domain
    /// content. Both fields must be N×N RG fields.
    pub fn apply(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &Field,
        output: &Field,
    ) -> Result<(), OceanError> {
        input.expect_distinct(output)?;
        for field in [input, output] {
            field.expect_layout(FieldLayout::Rg)?;
            field.expect_size(self.texture_size)?;
        }

        let arena = PingPong { input, output };

        let slot = self.encode_axis(device, encoder, &arena, Axis::Rows, Slot::Input);
        let slot = self.encode_axis(device, encoder, &arena, Axis::Columns, slot);

        // Permutation reads the input slot and writes the output slot
        if slot == Slot::Output {
            self.copier.copy(device, encoder, output, input)?;
        }

        self.encode_permutation(device, encoder, input, output);

        debug!(
            "IFFT `{}` -> `{}` ({} stages)",
            input.label(),
            output.label(),
            2 * self.stages
        );
        Ok(())
    }

    /// Record every butterfly stage along one axis; returns the slot holding the result
    fn encode_axis(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        arena: &PingPong<'_>,
        axis: Axis,
        start: Slot,
    ) -> Slot {
        let (pipeline, label) = match axis {
            Axis::Rows => (&self.horizontal_pipeline, "IFFT Horizontal Pass"),
            Axis::Columns => (&self.vertical_pipeline, "IFFT Vertical Pass"),
        };

        let mut current = start;
        let bind_groups: Vec<wgpu::BindGroup> = self
            .stage_buffers
            .iter()
            .map(|stage_buffer| {
                let source = arena.field(current);
                let destination = arena.field(current.other());
                current = current.other();
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("IFFT Butterfly Bind Group"),
                    layout: &self.butterfly_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: stage_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&self.twiddle_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(source.view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::TextureView(destination.view()),
                        },
                    ],
                })
            })
            .collect();

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        let groups = workgroup_count(self.texture_size);
        for bind_group in &bind_groups {
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        current
    }

    fn encode_permutation(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &Field,
        destination: &Field,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("IFFT Permutation Bind Group"),
            layout: &self.permutation_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.permutation_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(destination.view()),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("IFFT Permutation Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.permutation_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        let groups = workgroup_count(self.texture_size);
        pass.dispatch_workgroups(groups, groups, 1);
    }
}
