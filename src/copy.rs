//! Compute-kernel copy between fields of the same layout.
//!
//! Built once by whoever owns the pipeline and shared explicitly
//! (e.g. `Arc<TextureCopier>`) with every component that needs it.

use log::debug;

use crate::error::OceanError;
use crate::field::Field;
use crate::gpu::{sampled_entry, storage_entry, workgroup_count};

/// Copies RG or RGBA fields texel for texel
pub struct TextureCopier {
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl TextureCopier {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Copy Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/copy.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Copy Bind Group Layout"),
            entries: &[sampled_entry(0), storage_entry(1)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Copy Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Copy Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            bind_group_layout,
            pipeline,
        }
    }

    /// Record a copy of `source` into `destination`
    pub fn copy(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &Field,
        destination: &Field,
    ) -> Result<(), OceanError> {
        source.expect_distinct(destination)?;
        destination.expect_layout(source.layout())?;
        destination.expect_size(source.size())?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Copy Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(destination.view()),
                },
            ],
        });

        debug!("Copy `{}` -> `{}`", source.label(), destination.label());

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Copy Compute Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        let groups = workgroup_count(source.size());
        pass.dispatch_workgroups(groups, groups, 1);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldLayout;
    use crate::gpu::test_support;

    fn round_trip(layout: FieldLayout, size: u32) {
        let Some(ctx) = test_support::context() else {
            return;
        };
        let copier = TextureCopier::new(&ctx.device);
        let source = Field::new(&ctx.device, "copy source", size, layout);
        let destination = Field::new(&ctx.device, "copy destination", size, layout);

        // Includes values that would change under any filtering or conversion
        let values: Vec<f32> = (0..source.value_count())
            .map(|i| f32::from_bits(0x3f80_0001 + i as u32) * if i % 3 == 0 { -1.0 } else { 1.0 })
            .collect();
        source.upload(&ctx.queue, &values).unwrap();

        let mut encoder = ctx.device.create_command_encoder(&Default::default());
        copier.copy(&ctx.device, &mut encoder, &source, &destination).unwrap();
        ctx.queue.submit(Some(encoder.finish()));

        let copied = pollster::block_on(destination.read(&ctx.device, &ctx.queue)).unwrap();
        let bits = |v: &[f32]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&copied), bits(&values));
    }

    #[test]
    fn test_copy_rg_is_bit_exact() {
        round_trip(FieldLayout::Rg, 16);
    }

    #[test]
    fn test_copy_rgba_is_bit_exact() {
        round_trip(FieldLayout::Rgba, 4);
    }

    #[test]
    fn test_copy_rejects_layout_mismatch() {
        let Some(ctx) = test_support::context() else {
            return;
        };
        let copier = TextureCopier::new(&ctx.device);
        let rg = Field::new(&ctx.device, "rg", 8, FieldLayout::Rg);
        let rgba = Field::new(&ctx.device, "rgba", 8, FieldLayout::Rgba);
        let small = Field::new(&ctx.device, "small", 4, FieldLayout::Rg);

        let mut encoder = ctx.device.create_command_encoder(&Default::default());
        assert!(matches!(
            copier.copy(&ctx.device, &mut encoder, &rg, &rgba),
            Err(OceanError::ChannelLayout { .. })
        ));
        assert!(matches!(
            copier.copy(&ctx.device, &mut encoder, &rg, &small),
            Err(OceanError::SizeMismatch { .. })
        ));
        assert!(matches!(
            copier.copy(&ctx.device, &mut encoder, &rg, &rg),
            Err(OceanError::AliasedField { field: "rg" })
        ));
    }
}
