//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{RecordingConfig, SimulationParams, SpectrumParams};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "oceanfft")]
#[command(about = "Headless FFT ocean simulation rendered to height-map PNGs", long_about = None)]
pub struct Args {
    /// Texels per side of every field (power of two)
    #[arg(long, value_name = "TEXELS", default_value_t = 512)]
    pub size: u32,

    /// Side length of the simulated ocean tile (meters)
    #[arg(long, value_name = "METERS", default_value_t = 1000.0)]
    pub tile_scale: f32,

    /// Wind speed (m/s)
    #[arg(long, value_name = "M_PER_S", default_value_t = 31.0)]
    pub wind_speed: f32,

    /// Wind direction, measured from +x towards +z (radians)
    #[arg(long, value_name = "RADIANS", default_value_t = 0.0, allow_hyphen_values = true)]
    pub wind_theta: f32,

    /// Waves shorter than this are damped out (meters)
    #[arg(long, value_name = "METERS", default_value_t = 0.5)]
    pub cutoff: f32,

    /// Phillips constant A
    #[arg(long, default_value_t = 3e-4)]
    pub amplitude: f32,

    /// Seed for the Gaussian noise field
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 1)]
    pub frames: usize,

    /// Simulated time between frames (seconds)
    #[arg(long, value_name = "SECONDS", default_value_t = 1.0 / 30.0)]
    pub dt: f64,

    /// Directory receiving one height-map PNG per frame
    #[arg(long, value_name = "DIR", default_value = "ocean_frames")]
    pub output: PathBuf,
}

impl Args {
    /// Initial spectrum configuration from the command line
    pub fn spectrum_params(&self) -> SpectrumParams {
        SpectrumParams {
            texture_size: self.size,
            tile_scale: self.tile_scale,
            wind_theta: self.wind_theta,
            wind_speed: self.wind_speed,
            small_wave_length_cutoff: self.cutoff,
            amplitude: self.amplitude,
            seed: self.seed,
        }
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams::default()
    }

    /// Recording configuration; creates the output directory
    pub fn recording_config(&self) -> std::io::Result<RecordingConfig> {
        let config = RecordingConfig::new(&self.output, self.frames, self.dt);
        std::fs::create_dir_all(&config.output_dir)?;
        Ok(config)
    }
}
