//! GPU device acquisition for headless compute.

use log::info;

use crate::error::OceanError;
use crate::field::{FIELD_USAGES, STORAGE_FORMAT};

/// Device and queue used to run the ocean compute kernels
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_name: String,
}

impl GpuContext {
    /// Request a headless device capable of running compute shaders
    ///
    /// Fails before any simulation state exists when the adapter lacks
    /// compute support.
    pub async fn headless() -> Result<Self, OceanError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(OceanError::NoAdapter)?;

        ensure_compute_support(&adapter)?;
        let adapter_name = adapter.get_info().name;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ocean Compute Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        info!("Using GPU adapter: {}", adapter_name);

        Ok(Self {
            device,
            queue,
            adapter_name,
        })
    }
}

/// Reject adapters that cannot dispatch compute work or store fields
pub fn ensure_compute_support(adapter: &wgpu::Adapter) -> Result<(), OceanError> {
    check_capabilities(
        &adapter.get_info().name,
        adapter.get_downlevel_capabilities().flags,
        adapter
            .get_texture_format_features(STORAGE_FORMAT)
            .allowed_usages,
    )
}

/// Capability rules behind `ensure_compute_support`
fn check_capabilities(
    adapter: &str,
    flags: wgpu::DownlevelFlags,
    field_format_usages: wgpu::TextureUsages,
) -> Result<(), OceanError> {
    if !flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS) {
        return Err(OceanError::ComputeUnsupported(adapter.to_string()));
    }
    if !field_format_usages.contains(FIELD_USAGES) {
        return Err(OceanError::StorageFormatUnsupported {
            adapter: adapter.to_string(),
            format: STORAGE_FORMAT,
        });
    }
    Ok(())
}

/// Workgroup edge length shared by every 2D kernel (matches `@workgroup_size(8, 8)`)
pub const WORKGROUP_SIZE: u32 = 8;

/// Number of workgroups needed to cover `extent` texels along one axis
pub fn workgroup_count(extent: u32) -> u32 {
    extent.div_ceil(WORKGROUP_SIZE)
}

/// Read-only, unfilterable float texture binding
pub fn sampled_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Write-only storage texture binding in the field storage format
pub fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: STORAGE_FORMAT,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}

/// Uniform buffer binding
pub fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::GpuContext;

    /// Headless context for GPU tests, or `None` when the machine has no adapter
    pub fn context() -> Option<GpuContext> {
        match pollster::block_on(GpuContext::headless()) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                eprintln!("skipping GPU test: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(2), 1);
        assert_eq!(workgroup_count(8), 1);
        assert_eq!(workgroup_count(9), 2);
        assert_eq!(workgroup_count(1024), 128);
    }

    #[test]
    fn test_capability_check() {
        let compute = wgpu::DownlevelFlags::COMPUTE_SHADERS;
        assert!(check_capabilities("full", compute, FIELD_USAGES).is_ok());
        assert!(check_capabilities("full", compute, wgpu::TextureUsages::all()).is_ok());

        assert!(matches!(
            check_capabilities("no compute", wgpu::DownlevelFlags::empty(), FIELD_USAGES),
            Err(OceanError::ComputeUnsupported(_))
        ));

        // Downlevel GL: the format samples and copies but cannot be a storage target
        let sample_only = wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;
        assert!(matches!(
            check_capabilities("gl", compute, sample_only),
            Err(OceanError::StorageFormatUnsupported {
                format: wgpu::TextureFormat::Rgba32Float,
                ..
            })
        ));
    }
}
