//! Uniform block consumed by the ocean surface shaders.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::error::OceanError;

/// Camera, light and clock state for one rendered frame
///
/// Laid out as two `vec3<f32>` + `f32` pairs (32 bytes, WGSL-compatible).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct SurfaceUniforms {
    pub camera_position: [f32; 3],
    pub tile_scale: f32,
    pub light_direction: [f32; 3],
    pub elapsed_seconds: f32,
}

impl SurfaceUniforms {
    /// Build the block for the current frame
    ///
    /// A frame without a camera cannot be shaded, so `None` is an error
    /// rather than a skipped frame.
    pub fn new(
        camera_position: Option<Vec3>,
        light_direction: Vec3,
        tile_scale: f32,
        elapsed_seconds: f32,
    ) -> Result<Self, OceanError> {
        let camera_position = camera_position.ok_or(OceanError::MissingCamera)?;
        Ok(Self {
            camera_position: camera_position.to_array(),
            tile_scale,
            light_direction: light_direction.normalize_or_zero().to_array(),
            elapsed_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<SurfaceUniforms>(), 32);
    }

    #[test]
    fn test_missing_camera_fails() {
        let result = SurfaceUniforms::new(None, Vec3::Y, 1000.0, 3600.0);
        assert!(matches!(result, Err(OceanError::MissingCamera)));
    }

    #[test]
    fn test_light_direction_is_normalized() {
        let uniforms =
            SurfaceUniforms::new(Some(Vec3::new(0.0, 20.0, -5.0)), Vec3::new(0.0, 3.0, 4.0), 500.0, 12.5)
                .unwrap();
        assert_eq!(uniforms.camera_position, [0.0, 20.0, -5.0]);
        assert!((uniforms.light_direction[1] - 0.6).abs() < 1e-6);
        assert!((uniforms.light_direction[2] - 0.8).abs() < 1e-6);
        assert_eq!(uniforms.tile_scale, 500.0);
        assert_eq!(uniforms.elapsed_seconds, 12.5);
    }
}
