use bevy::log::{error, info};
use bevy::prelude::*;

use crate::camera::CameraMatrices;
use crate::fps_logger::{FpsLogger, FpsReport};
use crate::frame::FrameAssembler;
use crate::uniforms::UniformBlocks;

/// Uniform blocks produced by the most recent frame, waiting for the backend.
#[derive(Resource, Default, Debug)]
pub struct LatestFrame {
    pub frame: u64,
    pub time: f32,
    pub uniforms: UniformBlocks,
}

#[derive(Resource, Default)]
pub struct WaterStats {
    pub logger: FpsLogger,
    pub last_report: Option<FpsReport>,
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct FrameLimit(pub u32);

/// Runs the water frame assembler once per `Update` from bevy's clock.
pub struct WaterPlugin {
    pub assembler: FrameAssembler,
    pub camera: CameraMatrices,
    pub frame_limit: Option<u32>,
}

impl WaterPlugin {
    pub fn new(assembler: FrameAssembler) -> Self {
        Self {
            assembler,
            camera: CameraMatrices::default(),
            frame_limit: None,
        }
    }

    pub fn with_camera(mut self, camera: CameraMatrices) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_frame_limit(mut self, frames: u32) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl Plugin for WaterPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.assembler.clone())
            .insert_resource(self.camera)
            .init_resource::<LatestFrame>()
            .init_resource::<WaterStats>()
            .add_systems(
                Update,
                (
                    assemble_water_frame.run_if(below_frame_limit),
                    stop_after_frame_limit,
                )
                    .chain(),
            );

        if let Some(frames) = self.frame_limit {
            app.insert_resource(FrameLimit(frames));
        }
    }
}

pub fn assemble_water_frame(
    time: Res<Time>,
    camera: Res<CameraMatrices>,
    mut assembler: ResMut<FrameAssembler>,
    mut latest: ResMut<LatestFrame>,
    mut stats: ResMut<WaterStats>,
    mut exit: EventWriter<AppExit>,
) {
    match assembler.assemble(time.elapsed_secs(), &camera) {
        Ok(frame) => {
            let uniform_bytes =
                frame.uniforms.frame.len() + frame.uniforms.waves.as_ref().map_or(0, Vec::len);
            latest.frame = frame.frame;
            latest.time = frame.time;
            latest.uniforms = frame.uniforms;

            if let Some(report) = stats.logger.update(latest.time, uniform_bytes) {
                stats.last_report = Some(report);
            }
        }
        Err(e) => {
            error!("Failed to assemble water frame: {}", e);
            exit.write(AppExit::error());
        }
    }
}

/// A limit of 0 means no frame is assembled at all.
pub fn below_frame_limit(limit: Option<Res<FrameLimit>>, latest: Res<LatestFrame>) -> bool {
    limit.is_none_or(|limit| latest.frame < limit.0 as u64)
}

pub fn stop_after_frame_limit(
    limit: Option<Res<FrameLimit>>,
    latest: Res<LatestFrame>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(limit) = limit else {
        return;
    };
    if latest.frame >= limit.0 as u64 {
        info!("Reached frame limit of {} at t = {:.2}s", limit.0, latest.time);
        exit.write(AppExit::Success);
    }
}
