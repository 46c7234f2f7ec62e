pub mod constants;
pub mod error;
pub mod mesh;
pub mod grid;
pub mod wave;
pub mod std140;
pub mod camera;
pub mod uniforms;
pub mod config;
pub mod frame;
pub mod fps_logger;
pub mod app;

pub use camera::CameraMatrices;
pub use config::WaterConfig;
pub use error::{WaterError, WaterResult};
pub use frame::{FrameAssembler, FrameData, WaterSurface};
pub use grid::{generate_grid, GridSpacing, GridSpec};
pub use mesh::{MeshData, Vertex};
pub use uniforms::{pack_uniforms, PackingConvention, UniformBlocks, UniformLayout, WaveLayout};
pub use wave::{DirectionDrift, Wave, WaveSet};

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::constants::DEFAULT_FRAME_RATE;

pub fn setup_headless_app() -> App {
    setup_headless_app_with_rate(DEFAULT_FRAME_RATE)
}

/// A windowless app ticking at `frames_per_second`, with logging installed.
/// The render backend is expected to read `app::LatestFrame` each update.
pub fn setup_headless_app_with_rate(frames_per_second: f64) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / frames_per_second,
        ))),
        LogPlugin::default(),
    ));

    app
}
