//! Headless recording configuration for the binary.

use std::path::PathBuf;

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Output directory for height-map frames
    pub output_dir: PathBuf,

    /// Number of frames to simulate
    pub frames: usize,

    /// Simulated time between frames (seconds)
    pub frame_delta_seconds: f64,
}

impl RecordingConfig {
    pub fn new(output_dir: impl Into<PathBuf>, frames: usize, frame_delta_seconds: f64) -> Self {
        Self {
            output_dir: output_dir.into(),
            frames,
            frame_delta_seconds,
        }
    }

    /// Total simulated duration (seconds)
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 * self.frame_delta_seconds
    }

    /// Height-map frame path
    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.output_dir.join(format!("height_{:05}.png", frame))
    }
}
