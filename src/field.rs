//! Square float textures holding one (RG) or two (RGBA) complex numbers per texel.

use log::debug;

use crate::error::OceanError;

/// Texture format backing every field
///
/// RG32F has no storage-texture support on downlevel adapters (GL, some
/// WebGPU targets), so RG fields are stored as RGBA32F with the last two
/// channels left at zero.
pub const STORAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Float channels per stored texel
pub const STORAGE_CHANNELS: usize = 4;

/// Bytes per stored texel
pub const STORAGE_BYTES_PER_TEXEL: u32 = (STORAGE_CHANNELS * std::mem::size_of::<f32>()) as u32;

/// Usages every field texture is created with
pub const FIELD_USAGES: wgpu::TextureUsages = wgpu::TextureUsages::STORAGE_BINDING
    .union(wgpu::TextureUsages::TEXTURE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

/// Logical channel layout of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// One complex number per texel
    Rg,
    /// Two packed complex numbers per texel (`h0(k)` and `h0*(-k)`)
    Rgba,
}

impl FieldLayout {
    /// Meaningful float channels per texel
    pub fn channels(self) -> usize {
        match self {
            Self::Rg => 2,
            Self::Rgba => 4,
        }
    }
}

/// Widen `channels`-per-texel host data to the stored RGBA layout
fn to_storage(values: &[f32], channels: usize) -> Vec<f32> {
    if channels == STORAGE_CHANNELS {
        return values.to_vec();
    }
    let mut texels = Vec::with_capacity(values.len() / channels * STORAGE_CHANNELS);
    for texel in values.chunks(channels) {
        texels.extend_from_slice(texel);
        texels.extend(std::iter::repeat(0.0).take(STORAGE_CHANNELS - channels));
    }
    texels
}

/// Keep the first `channels` values of every stored RGBA texel
fn from_storage(texels: &[f32], channels: usize) -> Vec<f32> {
    if channels == STORAGE_CHANNELS {
        return texels.to_vec();
    }
    texels
        .chunks(STORAGE_CHANNELS)
        .flat_map(|texel| texel[..channels].iter().copied())
        .collect()
}

/// An N×N float texture usable both as a storage target and as a sampled input
pub struct Field {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: u32,
    layout: FieldLayout,
    label: &'static str,
}

impl Field {
    pub fn new(device: &wgpu::Device, label: &'static str, size: u32, layout: FieldLayout) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STORAGE_FORMAT,
            usage: FIELD_USAGES,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            size,
            layout,
            label,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layout(&self) -> FieldLayout {
        self.layout
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Number of f32 values a full upload or readback holds
    pub fn value_count(&self) -> usize {
        (self.size as usize).pow(2) * self.layout.channels()
    }

    /// Fail unless this field has the expected layout
    pub fn expect_layout(&self, expected: FieldLayout) -> Result<(), OceanError> {
        if self.layout == expected {
            Ok(())
        } else {
            Err(OceanError::ChannelLayout {
                field: self.label,
                expected,
                found: self.layout,
            })
        }
    }

    /// Fail if `other` is this very field
    ///
    /// A kernel cannot sample and store the same texture in one dispatch.
    pub fn expect_distinct(&self, other: &Field) -> Result<(), OceanError> {
        if std::ptr::eq(self, other) {
            Err(OceanError::AliasedField { field: self.label })
        } else {
            Ok(())
        }
    }

    /// Fail unless this field is `expected` texels wide
    pub fn expect_size(&self, expected: u32) -> Result<(), OceanError> {
        if self.size == expected {
            Ok(())
        } else {
            Err(OceanError::SizeMismatch {
                expected,
                found: self.size,
            })
        }
    }

    /// Overwrite the whole texture with row-major texel data
    pub fn upload(&self, queue: &wgpu::Queue, values: &[f32]) -> Result<(), OceanError> {
        if values.len() != self.value_count() {
            return Err(OceanError::InvalidParameter {
                name: "upload length",
                value: values.len() as f64,
            });
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&to_storage(values, self.layout.channels())),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(self.size * STORAGE_BYTES_PER_TEXEL),
                rows_per_image: Some(self.size),
            },
            self.extent(),
        );
        Ok(())
    }

    /// Copy the texture back to the host as row-major f32 values
    ///
    /// Submits its own copy command and blocks on the device until the
    /// staging buffer is mapped.
    pub async fn read(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<f32>, OceanError> {
        let unpadded_bytes_per_row = self.size * STORAGE_BYTES_PER_TEXEL;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Readback Buffer"),
            size: (padded_bytes_per_row * self.size) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Field Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.size),
                },
            },
            self.extent(),
        );
        queue.submit(Some(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (sender, receiver) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        receiver.await.map_err(|_| OceanError::ReadbackCancelled)??;

        let data = buffer_slice.get_mapped_range();
        let mut texels = Vec::with_capacity((self.size as usize).pow(2) * STORAGE_CHANNELS);

        // Strip row padding
        for row in 0..self.size {
            let start = (row * padded_bytes_per_row) as usize;
            let end = start + unpadded_bytes_per_row as usize;
            texels.extend_from_slice(bytemuck::cast_slice::<u8, f32>(&data[start..end]));
        }

        drop(data);
        buffer.unmap();

        let values = from_storage(&texels, self.layout.channels());

        debug!("Read back {} values from `{}`", values.len(), self.label);
        Ok(values)
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.size,
            height: self.size,
            depth_or_array_layers: 1,
        }
    }
}
