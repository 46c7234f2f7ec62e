use std::path::PathBuf;

use anyhow::{bail, Context};
use bevy::prelude::*;
use clap::Parser;

use water_surface::app::WaterPlugin;
use water_surface::constants::{DEFAULT_FRAME_LIMIT, DEFAULT_FRAME_RATE};
use water_surface::{setup_headless_app_with_rate, CameraMatrices, FrameAssembler, WaterConfig, WaterSurface};

/// Runs the water surface frame loop without a window and logs what would be
/// uploaded to the GPU each frame.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Water description in RON; the built-in scene is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(short, long, default_value_t = DEFAULT_FRAME_LIMIT)]
    frames: u32,

    /// Frame rate of the headless loop
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    fps: f64,

    /// Aspect ratio used for the default camera
    #[arg(long, default_value_t = 16.0 / 9.0)]
    aspect: f32,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("--fps must be positive, got {}", self.fps);
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            bail!("--aspect must be positive, got {}", self.aspect);
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.validate()?;

    // LogPlugin has to be installed before the config load logs anything
    let mut app = setup_headless_app_with_rate(args.fps);

    let config = match &args.config {
        Some(path) => WaterConfig::load(path)
            .with_context(|| format!("failed to load water config from {}", path.display()))?,
        None => WaterConfig::default(),
    };

    if args.print_config {
        println!("{}", config.to_ron_string()?);
        return Ok(());
    }

    let surface = WaterSurface::from_config(&config).context("invalid water configuration")?;
    info!(
        "Uniform layout: {:?}",
        surface.layout().waves.map(|layout| (layout.convention(), layout.declared_size()))
    );

    app.add_plugins(
        WaterPlugin::new(FrameAssembler::new(surface))
            .with_camera(CameraMatrices::scene_default(args.aspect))
            .with_frame_limit(args.frames),
    );

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => bail!("water frame loop exited with code {}", code),
    }
}
