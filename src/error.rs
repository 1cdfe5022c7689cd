//! Error taxonomy for the ocean pipeline.

use thiserror::Error;

use crate::field::FieldLayout;

/// Errors raised while building or running the ocean pipeline
///
/// Every variant is either a configuration mistake (fail fast) or a
/// device-level condition; nothing here is worth retrying.
#[derive(Debug, Error)]
pub enum OceanError {
    #[error("texture size must be a power of two >= 2, got {0}")]
    InvalidTextureSize(u32),

    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("field `{field}` has layout {found:?}, expected {expected:?}")]
    ChannelLayout {
        field: &'static str,
        expected: FieldLayout,
        found: FieldLayout,
    },

    #[error("field size mismatch: expected {expected}x{expected}, got {found}x{found}")]
    SizeMismatch { expected: u32, found: u32 },

    #[error("field `{field}` cannot be both the source and the destination of a pass")]
    AliasedField { field: &'static str },

    #[error("no camera available to build surface uniforms")]
    MissingCamera,

    #[error("failed to find a suitable GPU adapter")]
    NoAdapter,

    #[error("adapter `{0}` does not support compute shaders")]
    ComputeUnsupported(String),

    #[error("adapter `{adapter}` cannot use {format:?} as a storage texture")]
    StorageFormatUnsupported {
        adapter: String,
        format: wgpu::TextureFormat,
    },

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to map readback buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("readback was cancelled before the buffer was mapped")]
    ReadbackCancelled,
}

/// Check that a scalar parameter is finite and strictly positive
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<(), OceanError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OceanError::InvalidParameter {
            name,
            value: value as f64,
        })
    }
}

/// Check that a texture size is usable by the FFT (power of two, at least 2)
pub(crate) fn ensure_texture_size(size: u32) -> Result<(), OceanError> {
    if size >= 2 && size.is_power_of_two() {
        Ok(())
    } else {
        Err(OceanError::InvalidTextureSize(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_size_validation() {
        assert!(ensure_texture_size(2).is_ok());
        assert!(ensure_texture_size(256).is_ok());
        assert!(matches!(
            ensure_texture_size(0),
            Err(OceanError::InvalidTextureSize(0))
        ));
        assert!(ensure_texture_size(1).is_err());
        assert!(ensure_texture_size(48).is_err());
    }

    #[test]
    fn test_positive_validation() {
        assert!(ensure_positive("wind_speed", 31.0).is_ok());
        assert!(ensure_positive("wind_speed", 0.0).is_err());
        assert!(ensure_positive("wind_speed", -1.0).is_err());
        assert!(ensure_positive("wind_speed", f32::NAN).is_err());
        assert!(ensure_positive("wind_speed", f32::INFINITY).is_err());
    }
}
