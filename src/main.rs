//! oceanfft - headless FFT ocean
//!
//! Simulates an ocean tile on the GPU and writes the height map of every
//! frame to a grayscale PNG.

use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use oceanfft::cli::Args;
use oceanfft::export::{height_image, HeightStats};
use oceanfft::{GpuContext, OceanSurface};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let spectrum = args.spectrum_params();
    let simulation = args.simulation_params();
    let recording = args
        .recording_config()
        .with_context(|| format!("creating output directory {}", args.output.display()))?;

    info!(
        "Simulating {} frames ({:.2} s) into {}",
        recording.frames,
        recording.duration_secs(),
        recording.output_dir.display()
    );

    let start = Instant::now();
    let ctx = pollster::block_on(GpuContext::headless()).context("acquiring GPU device")?;
    let mut ocean = OceanSurface::phillips(&ctx.device, &ctx.queue, spectrum, simulation)
        .context("building ocean surface")?;

    for frame in 0..recording.frames {
        ocean.update(&ctx.device, &ctx.queue, recording.frame_delta_seconds)?;

        let height = pollster::block_on(ocean.height_map().read(&ctx.device, &ctx.queue))
            .context("reading back height map")?;
        let stats = HeightStats::from_field(&height);
        info!(
            "Frame {} (t = {:.3} s): height min {:.4} m, max {:.4} m, mean {:.6} m",
            frame,
            ocean.elapsed_seconds(),
            stats.min,
            stats.max,
            stats.mean
        );

        let path = recording.frame_path(frame);
        height_image(&height, ocean.texture_size(), &stats)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    info!(
        "Done in {:.2} ms on {}",
        start.elapsed().as_secs_f64() * 1000.0,
        ctx.adapter_name
    );

    Ok(())
}
