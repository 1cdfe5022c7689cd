//! Height-map statistics and grayscale PNG export.

use image::{GrayImage, Luma};

/// Summary of the real channel of a spatial field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl HeightStats {
    /// Statistics over the real parts of interleaved `(re, im)` values
    pub fn from_field(values: &[f32]) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for height in values.iter().step_by(2) {
            min = min.min(*height);
            max = max.max(*height);
            sum += *height as f64;
            count += 1;
        }
        if count == 0 {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        Self {
            min,
            max,
            mean: (sum / count as f64) as f32,
        }
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }
}

/// Map the real channel of an N×N field onto `[0, 255]` using `stats`
///
/// A flat field maps to mid-gray.
pub fn height_image(values: &[f32], size: u32, stats: &HeightStats) -> GrayImage {
    let range = stats.range();
    GrayImage::from_fn(size, size, |x, y| {
        let height = values[((y * size + x) * 2) as usize];
        let gray = if range > 0.0 {
            ((height - stats.min) / range * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            128
        };
        Luma([gray])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_ignore_imaginary_channel() {
        let values = [1.0, 100.0, -3.0, -100.0, 2.0, 0.0, 4.0, 7.0];
        let stats = HeightStats::from_field(&values);
        assert_eq!(stats.min, -3.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 1.0);
    }

    #[test]
    fn test_height_image_normalizes() {
        let values = [-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let stats = HeightStats::from_field(&values);
        let image = height_image(&values, 2, &stats);
        assert_eq!(image.get_pixel(0, 0).0, [0]);
        assert_eq!(image.get_pixel(1, 0).0, [128]);
        assert_eq!(image.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn test_flat_field_is_mid_gray() {
        let values = [0.5; 8];
        let stats = HeightStats::from_field(&values);
        let image = height_image(&values, 2, &stats);
        assert!(image.pixels().all(|p| p.0 == [128]));
    }
}
