use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;

use crate::camera::CameraMatrices;
use crate::config::WaterConfig;
use crate::error::WaterResult;
use crate::grid::GridSpec;
use crate::mesh::{MeshData, Vertex};
use crate::uniforms::{UniformBlocks, UniformLayout};
use crate::wave::WaveSet;

/// Seconds since start, never running backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    elapsed: f32,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Moves to `seconds` and counts a frame. Times earlier than the current one
    /// (or non-finite ones) are ignored and the current time is reused.
    pub fn tick(&mut self, seconds: f32) -> f32 {
        if seconds.is_finite() && seconds >= self.elapsed {
            self.elapsed = seconds;
        } else {
            warn!(
                "Ignoring time {} at frame {}, clock stays at {:.3}s",
                seconds, self.frame, self.elapsed
            );
        }
        self.frame += 1;
        self.elapsed
    }
}

/// The water entity: its mesh, its waves and the uniform layout its shader expects.
#[derive(Resource, Clone, Debug)]
pub struct WaterSurface {
    grid: GridSpec,
    mesh: MeshData,
    waves: WaveSet,
    layout: UniformLayout,
}

impl WaterSurface {
    pub fn new(grid: GridSpec, waves: WaveSet, layout: UniformLayout) -> Self {
        let mesh = grid.generate();
        Self {
            grid,
            mesh,
            waves,
            layout,
        }
    }

    pub fn from_config(config: &WaterConfig) -> WaterResult<Self> {
        let surface = Self::new(config.grid_spec()?, config.wave_set()?, config.uniform_layout()?);
        info!(
            "Water surface ready: {} vertices, {} triangles, {} waves",
            surface.mesh.vertex_count(),
            surface.mesh.triangle_count(),
            surface.waves.len()
        );
        Ok(surface)
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn waves(&self) -> &WaveSet {
        &self.waves
    }

    pub fn waves_mut(&mut self) -> &mut WaveSet {
        &mut self.waves
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Replaces the mesh with one built from `grid`; the old buffers are dropped.
    pub fn rebuild_grid(&mut self, grid: GridSpec) {
        self.mesh = grid.generate();
        self.grid = grid;
        debug!(
            "Rebuilt water grid at {}x{}",
            self.grid.rows(), self.grid.columns()
        );
    }
}

/// Everything the render backend needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameData<'a> {
    pub frame: u64,
    pub time: f32,
    pub uniforms: UniformBlocks,
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
}

/// Drives a water surface once per frame: clock first, then waves, then packing.
#[derive(Resource, Clone, Debug)]
pub struct FrameAssembler {
    surface: WaterSurface,
    clock: FrameClock,
}

impl FrameAssembler {
    pub fn new(surface: WaterSurface) -> Self {
        Self {
            surface,
            clock: FrameClock::new(),
        }
    }

    pub fn surface(&self) -> &WaterSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut WaterSurface {
        &mut self.surface
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn assemble(&mut self, seconds: f32, camera: &CameraMatrices) -> WaterResult<FrameData<'_>> {
        let time = self.clock.tick(seconds);
        self.surface.waves.advance(time);
        let uniforms = self.surface.layout.pack(&self.surface.waves, time, camera)?;

        Ok(FrameData {
            frame: self.clock.frame(),
            time,
            uniforms,
            vertices: &self.surface.mesh.vertices,
            indices: &self.surface.mesh.indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{FrameUniforms, PackingConvention};
    use crate::wave::{DirectionDrift, Wave};
    use bevy::math::Vec3;

    fn rotating_assembler() -> FrameAssembler {
        let waves = WaveSet::single(Wave::new(2.0, 0.7).unwrap())
            .with_drift(DirectionDrift::Rotating { period: 5.0 })
            .unwrap();
        let surface = WaterSurface::new(
            GridSpec::new(4, 4, Vec3::ZERO, 1.0).unwrap(),
            waves,
            UniformLayout::with_waves(PackingConvention::Interleaved, 1).unwrap(),
        );
        FrameAssembler::new(surface)
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1.0), 1.0);
        assert_eq!(clock.tick(0.5), 1.0);
        assert_eq!(clock.tick(f32::NAN), 1.0);
        assert_eq!(clock.tick(2.0), 2.0);
        assert_eq!(clock.frame(), 4);
    }

    #[test]
    fn packing_sees_the_current_frame() {
        let mut assembler = rotating_assembler();
        let camera = CameraMatrices::identity();
        let frame = assembler.assemble(2.5, &camera).unwrap();

        let header = FrameUniforms::unpack(&frame.uniforms.frame).unwrap();
        assert_eq!(header.time, 2.5);

        let layout = assembler.surface().layout().waves.unwrap();
        let frame = assembler.assemble(2.5, &camera).unwrap();
        let packed = layout.unpack(frame.uniforms.waves.as_ref().unwrap()).unwrap();
        assert_eq!(packed.time, 2.5);
        let expected = [(0.5f32).sin(), 0.0, (0.5f32).cos(), 0.0];
        for (got, want) in packed.waves[0].direction.iter().zip(expected) {
            assert!((got - want).abs() < 1e-5);
        }
    }

    #[test]
    fn mesh_buffers_are_stable_across_frames() {
        let mut assembler = rotating_assembler();
        let camera = CameraMatrices::identity();
        let first = assembler.assemble(0.0, &camera).unwrap().vertices.to_vec();
        let second = assembler.assemble(1.0, &camera).unwrap();
        assert_eq!(first.as_slice(), second.vertices);
        assert_eq!(second.indices.len(), 6 * 3 * 3);
        assert_eq!(second.frame, 2);
    }

    #[test]
    fn rebuild_replaces_the_whole_mesh() {
        let mut assembler = rotating_assembler();
        assembler
            .surface_mut()
            .rebuild_grid(GridSpec::new(3, 5, Vec3::ONE, 2.0).unwrap());
        let surface = assembler.surface();
        assert_eq!(surface.grid().columns(), 5);
        assert_eq!(surface.mesh().vertex_count(), 15);
        assert_eq!(surface.mesh().indices.len(), 6 * 2 * 4);
    }

    #[test]
    fn degenerate_grid_never_reaches_a_surface() {
        use crate::error::WaterError;
        use crate::grid::GridSpacing;

        for spacing in [GridSpacing::Stepped, GridSpacing::Spanning] {
            for (rows, columns) in [(0, 3), (1, 1), (4, 1)] {
                let mut config = WaterConfig::default();
                config.grid.rows = rows;
                config.grid.columns = columns;
                config.grid.spacing = spacing;
                assert_eq!(
                    WaterSurface::from_config(&config).err(),
                    Some(WaterError::InvalidGridResolution { rows, columns })
                );
            }
        }
    }
}
