use bevy::log::info;

/// Reports frame rate and the size of the uniform uploads once per second.
#[derive(Default)]
pub struct FpsLogger {
    frame_count: u32,
    fps_frame_count: u32,
    last_fps_time: f32,
    uploaded_bytes: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsReport {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub uniform_bytes_per_frame: usize,
}

impl FpsLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Records one frame at `elapsed` seconds that uploaded `uniform_bytes`.
    /// Returns a report whenever a full second has passed since the last one.
    pub fn update(&mut self, elapsed: f32, uniform_bytes: usize) -> Option<FpsReport> {
        self.frame_count += 1;
        self.fps_frame_count += 1;
        self.uploaded_bytes += uniform_bytes;

        if self.frame_count == 1 {
            info!("Starting water frame loop...");
        }

        let time_since_last_fps = elapsed - self.last_fps_time;
        if time_since_last_fps < 1.0 {
            return None;
        }

        let report = FpsReport {
            fps: self.fps_frame_count as f32 / time_since_last_fps,
            frame_time_ms: time_since_last_fps * 1000.0 / self.fps_frame_count as f32,
            uniform_bytes_per_frame: self.uploaded_bytes / self.fps_frame_count as usize,
        };
        info!(
            "FPS: {:.1} | Frame Time: {:.2}ms | Uniforms: {} B/frame",
            report.fps, report.frame_time_ms, report.uniform_bytes_per_frame
        );

        self.last_fps_time = elapsed;
        self.fps_frame_count = 0;
        self.uploaded_bytes = 0;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let mut logger = FpsLogger::new();
        let mut reports = Vec::new();
        for frame in 1..=120 {
            if let Some(report) = logger.update(frame as f32 / 60.0, 256) {
                reports.push(report);
            }
        }
        assert_eq!(reports.len(), 2);
        assert!((reports[0].fps - 60.0).abs() < 1e-3);
        assert_eq!(reports[0].uniform_bytes_per_frame, 256);
        assert_eq!(logger.frame_count(), 120);
    }
}
