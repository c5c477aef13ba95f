use std::path::PathBuf;

use clap::Parser;
use eddy_io::encode::{EncodingError, FluidDataEncoder};

mod run;

/// Headless driver for the eddy grid fluid: builds a scene, steps it for
/// a fixed number of frames and streams the field data to disk.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Directory the encoded frames are written to.
    output: PathBuf,

    /// Grid resolution, in cells per side.
    #[arg(short, long, default_value_t = 128)]
    resolution: usize,

    /// Number of frames to simulate.
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Playback frame rate recorded in the metadata.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Density diffusion rate.
    #[arg(long, default_value_t = 0.0)]
    diffusion: f32,

    /// Kinematic viscosity.
    #[arg(long, default_value_t = 1e-8)]
    viscosity: f32,

    /// Simulated time advanced per frame.
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Downward acceleration applied to cells carrying density.
    #[arg(long, default_value_t = 0.15)]
    gravity: f32,

    /// Vertical velocity injected at the emitter row, per step.
    #[arg(long, default_value_t = 1.5)]
    inflow: f32,

    /// Number of random 3x3 obstacle clusters scattered over the lower
    /// grid half.
    #[arg(short, long, default_value_t = 12)]
    obstacles: usize,

    /// Seed for the obstacle scatter; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), EncodingError> {
    let args = Args::parse();

    let encoder = FluidDataEncoder::new(args.output.clone(), args.frames, args.fps)?;
    run::run(encoder, &args)
}
