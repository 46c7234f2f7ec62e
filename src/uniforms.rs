//! Uniform block packing for the water shaders.
//!
//! Two blocks are produced per frame:
//!
//! * the frame block (binding 0): camera matrices and time, always 144 bytes;
//! * the wave block (binding 1, optional): the wave set, in one of three
//!   packing conventions. The conventions are not binary compatible with each
//!   other, so the layout has to be chosen to match the shader that consumes it.
//!
//! All matrices are column-major, all scalars little-endian.

use bevy::log::trace;
use bevy::math::Mat4;
use memoffset::offset_of;
use serde::{Deserialize, Serialize};

use crate::camera::CameraMatrices;
use crate::constants::{MAX_WAVES, MIN_WAVES, VEC4_SIZE};
use crate::error::{WaterError, WaterResult};
use crate::std140::{Std140Reader, Std140Writer};
use crate::wave::{Wave, WaveSet};

pub const FRAME_BLOCK: &str = "frame";
pub const WAVE_BLOCK: &str = "wave";

// Per-wave scalars, in tuple order
const WAVELENGTH: usize = 0;
const AMPLITUDE: usize = 1;
const SPEED: usize = 2;
const PHASE: usize = 3;
const SCALAR_NAMES: [&str; 4] = ["wavelength", "amplitude", "speed", "phase"];

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub world_view_projection: [f32; 16], // offset 0, size 64
    pub world: [f32; 16],                 // offset 64, size 64
    pub time: f32,                        // offset 128, size 4
    pub _padding: [f32; 3],               // offset 132, size 12
}

pub const FRAME_BLOCK_SIZE: usize = 144;

const _: () = assert!(std::mem::size_of::<FrameUniforms>() == FRAME_BLOCK_SIZE);
const _: () = assert!(FRAME_BLOCK_SIZE % VEC4_SIZE == 0);

impl FrameUniforms {
    pub fn new(camera: &CameraMatrices, time: f32) -> Self {
        Self {
            world_view_projection: camera.world_view_projection().to_cols_array(),
            world: camera.world.to_cols_array(),
            time,
            _padding: [0.0; 3],
        }
    }

    pub fn world_view_projection(&self) -> Mat4 {
        Mat4::from_cols_array(&self.world_view_projection)
    }

    pub fn world(&self) -> Mat4 {
        Mat4::from_cols_array(&self.world)
    }

    pub fn pack(&self) -> WaterResult<Vec<u8>> {
        let bytes = bytemuck::bytes_of(self).to_vec();
        if bytes.len() != FRAME_BLOCK_SIZE {
            return Err(WaterError::LayoutSizeMismatch {
                block: FRAME_BLOCK,
                declared: FRAME_BLOCK_SIZE,
                packed: bytes.len(),
            });
        }
        Ok(bytes)
    }

    pub fn unpack(bytes: &[u8]) -> WaterResult<Self> {
        if bytes.len() < FRAME_BLOCK_SIZE {
            return Err(WaterError::BlockTooShort {
                block: FRAME_BLOCK,
                expected: FRAME_BLOCK_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(&bytes[..FRAME_BLOCK_SIZE]))
    }

    pub fn fields() -> Vec<FieldLayout> {
        vec![
            FieldLayout::matrix("world_view_projection", offset_of!(FrameUniforms, world_view_projection)),
            FieldLayout::matrix("world", offset_of!(FrameUniforms, world)),
            FieldLayout::scalar("time", offset_of!(FrameUniforms, time)),
            FieldLayout::reserved(offset_of!(FrameUniforms, _padding), 12),
        ]
    }
}

/// How the wave set is laid out in the wave block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackingConvention {
    /// One wave, each scalar declared as its own field.
    Inline,
    /// `float4 directions[N]` followed by `float4 params[N]` holding
    /// `(wavelength, amplitude, speed, phase)` per wave.
    #[default]
    Interleaved,
    /// `float4 directions[N]` followed by one `float[N]` array per scalar, every
    /// element in its own 16-byte slot.
    Strided,
}

impl PackingConvention {
    pub fn supports(&self, wave_count: usize) -> bool {
        match self {
            PackingConvention::Inline => wave_count == 1,
            PackingConvention::Interleaved | PackingConvention::Strided => {
                (MIN_WAVES..=MAX_WAVES).contains(&wave_count)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Vec4,
    Mat4,
    Reserved,
}

/// One field of a uniform block as the shader declares it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub kind: FieldKind,
    pub offset: usize,
    /// Bytes one element occupies, padding included.
    pub stride: usize,
    /// 1 for plain fields.
    pub count: usize,
}

impl FieldLayout {
    fn scalar(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
            offset,
            stride: 4,
            count: 1,
        }
    }

    fn vec4(name: &'static str, offset: usize, count: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Vec4,
            offset,
            stride: VEC4_SIZE,
            count,
        }
    }

    fn scalar_array(name: &'static str, offset: usize, count: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
            offset,
            stride: VEC4_SIZE,
            count,
        }
    }

    fn matrix(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Mat4,
            offset,
            stride: 64,
            count: 1,
        }
    }

    fn reserved(offset: usize, size: usize) -> Self {
        Self {
            name: "_padding",
            kind: FieldKind::Reserved,
            offset,
            stride: size,
            count: 1,
        }
    }

    pub fn size(&self) -> usize {
        self.stride * self.count
    }

    pub fn end(&self) -> usize {
        self.offset + self.size()
    }
}

/// A wave as it appears in a packed block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackedWave {
    pub direction: [f32; 4],
    pub wavelength: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub phase: f32,
}

impl PackedWave {
    pub fn from_wave(wave: &Wave, time: f32) -> Self {
        let direction = wave.direction();
        Self {
            direction: [direction.x, 0.0, direction.z, 0.0],
            wavelength: wave.wavelength(),
            amplitude: wave.amplitude(),
            speed: wave.speed(),
            phase: wave.phase(time),
        }
    }

    fn scalars(&self) -> [f32; 4] {
        [self.wavelength, self.amplitude, self.speed, self.phase]
    }
}

/// Decoded contents of a wave block.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedWaves {
    pub waves: Vec<PackedWave>,
    pub time: f32,
    pub wave_count: u32,
}

/// Layout of the wave block for a fixed convention and wave count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveLayout {
    convention: PackingConvention,
    wave_count: usize,
}

impl WaveLayout {
    pub fn new(convention: PackingConvention, wave_count: usize) -> WaterResult<Self> {
        if !convention.supports(wave_count) {
            return Err(WaterError::InvalidWaveCount {
                count: wave_count,
                convention: Some(convention),
            });
        }
        Ok(Self {
            convention,
            wave_count,
        })
    }

    pub fn convention(&self) -> PackingConvention {
        self.convention
    }

    pub fn wave_count(&self) -> usize {
        self.wave_count
    }

    /// Size the shader declares for this block. Kept independent of the packing
    /// code so drift between the two shows up as a size mismatch.
    pub const fn declared_size(&self) -> usize {
        let n = self.wave_count;
        match self.convention {
            PackingConvention::Inline => 48,
            PackingConvention::Interleaved => 32 * n + 16,
            PackingConvention::Strided => 80 * n + 16,
        }
    }

    fn directions_offset(&self) -> usize {
        0
    }

    /// Offset of scalar `index` of wave 0; later waves follow at `VEC4_SIZE` strides.
    fn scalar_offset(&self, index: usize) -> usize {
        let n = self.wave_count;
        match self.convention {
            PackingConvention::Inline | PackingConvention::Interleaved => {
                VEC4_SIZE * n + 4 * index
            }
            PackingConvention::Strided => VEC4_SIZE * n * (index + 1),
        }
    }

    fn time_offset(&self) -> usize {
        let n = self.wave_count;
        match self.convention {
            PackingConvention::Inline | PackingConvention::Interleaved => 2 * VEC4_SIZE * n,
            PackingConvention::Strided => 5 * VEC4_SIZE * n,
        }
    }

    fn wave_count_offset(&self) -> usize {
        self.time_offset() + 4
    }

    pub fn fields(&self) -> Vec<FieldLayout> {
        let n = self.wave_count;
        let mut fields = Vec::new();
        match self.convention {
            PackingConvention::Inline => {
                fields.push(FieldLayout::vec4("direction", self.directions_offset(), 1));
                for (index, name) in SCALAR_NAMES.into_iter().enumerate() {
                    fields.push(FieldLayout::scalar(name, self.scalar_offset(index)));
                }
            }
            PackingConvention::Interleaved => {
                fields.push(FieldLayout::vec4("directions", self.directions_offset(), n));
                fields.push(FieldLayout::vec4("params", self.scalar_offset(WAVELENGTH), n));
            }
            PackingConvention::Strided => {
                fields.push(FieldLayout::vec4("directions", self.directions_offset(), n));
                for (index, name) in SCALAR_NAMES.into_iter().enumerate() {
                    fields.push(FieldLayout::scalar_array(name, self.scalar_offset(index), n));
                }
            }
        }
        fields.push(FieldLayout::scalar("time", self.time_offset()));
        fields.push(FieldLayout::scalar("wave_count", self.wave_count_offset()));
        let padding_offset = self.wave_count_offset() + 4;
        fields.push(FieldLayout::reserved(
            padding_offset,
            self.declared_size() - padding_offset,
        ));
        fields
    }

    pub fn pack(&self, wave_set: &WaveSet, time: f32) -> WaterResult<Vec<u8>> {
        if wave_set.len() != self.wave_count {
            return Err(WaterError::WaveCountMismatch {
                expected: self.wave_count,
                actual: wave_set.len(),
            });
        }

        let waves: Vec<PackedWave> = wave_set
            .iter()
            .map(|wave| PackedWave::from_wave(wave, time))
            .collect();

        let mut writer = Std140Writer::new(WAVE_BLOCK, self.declared_size());
        for wave in &waves {
            writer.vec4(wave.direction);
        }
        match self.convention {
            PackingConvention::Inline | PackingConvention::Interleaved => {
                for wave in &waves {
                    writer.vec4(wave.scalars());
                }
            }
            PackingConvention::Strided => {
                for index in [WAVELENGTH, AMPLITUDE, SPEED, PHASE] {
                    for wave in &waves {
                        writer.array_f32(wave.scalars()[index]);
                    }
                }
            }
        }
        writer
            .f32(time)
            .u32(self.wave_count as u32)
            .pad_to_alignment();

        writer.finish(self.declared_size())
    }

    pub fn unpack(&self, bytes: &[u8]) -> WaterResult<PackedWaves> {
        let reader = Std140Reader::new(WAVE_BLOCK, bytes, self.declared_size())?;

        let waves = (0..self.wave_count)
            .map(|i| {
                let scalar = |index: usize| reader.f32(self.scalar_offset(index) + i * VEC4_SIZE);
                PackedWave {
                    direction: reader.vec4(self.directions_offset() + i * VEC4_SIZE),
                    wavelength: scalar(WAVELENGTH),
                    amplitude: scalar(AMPLITUDE),
                    speed: scalar(SPEED),
                    phase: scalar(PHASE),
                }
            })
            .collect();

        Ok(PackedWaves {
            waves,
            time: reader.f32(self.time_offset()),
            wave_count: reader.u32(self.wave_count_offset()),
        })
    }
}

/// Which blocks a water shader binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformLayout {
    pub waves: Option<WaveLayout>,
}

impl UniformLayout {
    /// Frame block only; waves are not sent to the shader.
    pub fn frame_only() -> Self {
        Self { waves: None }
    }

    pub fn with_waves(convention: PackingConvention, wave_count: usize) -> WaterResult<Self> {
        Ok(Self {
            waves: Some(WaveLayout::new(convention, wave_count)?),
        })
    }

    pub fn pack(
        &self,
        wave_set: &WaveSet,
        time: f32,
        camera: &CameraMatrices,
    ) -> WaterResult<UniformBlocks> {
        let frame = FrameUniforms::new(camera, time).pack()?;
        let waves = self
            .waves
            .map(|layout| layout.pack(wave_set, time))
            .transpose()?;

        trace!(
            "Packed uniforms at t = {:.3}s: frame {} bytes, waves {:?} bytes",
            time,
            frame.len(),
            waves.as_ref().map(Vec::len)
        );

        Ok(UniformBlocks { frame, waves })
    }
}

/// Packed bytes ready for upload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniformBlocks {
    pub frame: Vec<u8>,
    pub waves: Option<Vec<u8>>,
}

pub fn pack_uniforms(
    layout: &UniformLayout,
    wave_set: &WaveSet,
    time: f32,
    camera: &CameraMatrices,
) -> WaterResult<UniformBlocks> {
    layout.pack(wave_set, time, camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    fn three_waves() -> WaveSet {
        WaveSet::new(vec![
            Wave::new(2.0, 0.7).unwrap(),
            Wave::new(5.0, 0.3).unwrap().with_heading(Vec3::X),
            Wave::new(0.8, 0.05).unwrap().with_heading(Vec3::new(1.0, 0.0, 1.0)),
        ])
        .unwrap()
    }

    fn assert_fields_tile_block(fields: &[FieldLayout], size: usize) {
        let mut cursor = 0;
        for field in fields {
            assert_eq!(field.offset, cursor, "gap or overlap before {}", field.name);
            if matches!(field.kind, FieldKind::Vec4 | FieldKind::Mat4) || field.count > 1 {
                assert_eq!(field.offset % VEC4_SIZE, 0, "{} is misaligned", field.name);
            }
            cursor = field.end();
        }
        assert_eq!(cursor, size);
    }

    #[test]
    fn frame_block_offsets() {
        assert_eq!(offset_of!(FrameUniforms, world_view_projection), 0);
        assert_eq!(offset_of!(FrameUniforms, world), 64);
        assert_eq!(offset_of!(FrameUniforms, time), 128);
        assert_fields_tile_block(&FrameUniforms::fields(), FRAME_BLOCK_SIZE);
    }

    #[test]
    fn declared_sizes_per_wave_count() {
        let size = |convention, count| WaveLayout::new(convention, count).unwrap().declared_size();
        assert_eq!(size(PackingConvention::Inline, 1), 48);
        assert_eq!(size(PackingConvention::Interleaved, 1), 48);
        assert_eq!(size(PackingConvention::Interleaved, 2), 80);
        assert_eq!(size(PackingConvention::Interleaved, 3), 112);
        assert_eq!(size(PackingConvention::Strided, 1), 96);
        assert_eq!(size(PackingConvention::Strided, 2), 176);
        assert_eq!(size(PackingConvention::Strided, 3), 256);
    }

    #[test]
    fn field_tables_tile_every_layout() {
        for convention in [
            PackingConvention::Inline,
            PackingConvention::Interleaved,
            PackingConvention::Strided,
        ] {
            for count in MIN_WAVES..=MAX_WAVES {
                let Ok(layout) = WaveLayout::new(convention, count) else {
                    continue;
                };
                assert_fields_tile_block(&layout.fields(), layout.declared_size());
            }
        }
    }

    #[test]
    fn inline_only_takes_one_wave() {
        assert_eq!(
            WaveLayout::new(PackingConvention::Inline, 2),
            Err(WaterError::InvalidWaveCount {
                count: 2,
                convention: Some(PackingConvention::Inline)
            })
        );
        assert!(WaveLayout::new(PackingConvention::Strided, 4).is_err());
        assert!(WaveLayout::new(PackingConvention::Interleaved, 0).is_err());
    }

    #[test]
    fn inline_is_interleaved_with_one_wave() {
        let set = WaveSet::single(Wave::new(3.0, 0.4).unwrap());
        let inline = WaveLayout::new(PackingConvention::Inline, 1).unwrap();
        let interleaved = WaveLayout::new(PackingConvention::Interleaved, 1).unwrap();
        assert_eq!(inline.pack(&set, 2.5).unwrap(), interleaved.pack(&set, 2.5).unwrap());
    }

    #[test]
    fn interleaved_offsets() {
        let layout = WaveLayout::new(PackingConvention::Interleaved, 3).unwrap();
        let set = three_waves();
        let bytes = layout.pack(&set, 0.0).unwrap();
        let reader = Std140Reader::new("test", &bytes, 112).unwrap();

        // params[1].x is the second wave's wavelength
        assert_eq!(reader.f32(48 + 16), 5.0);
        assert_eq!(reader.f32(48 + 16 + 4), 0.3);
        assert_eq!(reader.vec4(16), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(reader.u32(100), 3);
    }

    #[test]
    fn strided_offsets() {
        let layout = WaveLayout::new(PackingConvention::Strided, 3).unwrap();
        let set = three_waves();
        let bytes = layout.pack(&set, 0.0).unwrap();
        let reader = Std140Reader::new("test", &bytes, 256).unwrap();

        // wavelength[2] and amplitude[0]
        assert_eq!(reader.f32(48 + 2 * 16), 0.8);
        assert_eq!(reader.f32(96), 0.7);
        assert!(reader.bytes(100, 12).iter().all(|&b| b == 0));
        assert_eq!(reader.f32(240), 0.0);
        assert_eq!(reader.u32(244), 3);
    }

    #[test]
    fn wave_count_must_match_layout() {
        let layout = UniformLayout::with_waves(PackingConvention::Interleaved, 2).unwrap();
        let result = layout.pack(&three_waves(), 1.0, &CameraMatrices::identity());
        assert_eq!(
            result,
            Err(WaterError::WaveCountMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn frame_only_layout_skips_wave_block() {
        let blocks = pack_uniforms(
            &UniformLayout::frame_only(),
            &three_waves(),
            0.25,
            &CameraMatrices::identity(),
        )
        .unwrap();
        assert_eq!(blocks.frame.len(), FRAME_BLOCK_SIZE);
        assert!(blocks.waves.is_none());
    }

    #[test]
    fn frame_block_carries_time_and_matrices() {
        let camera = CameraMatrices::scene_default(4.0 / 3.0);
        let bytes = FrameUniforms::new(&camera, 12.5).pack().unwrap();
        let frame = FrameUniforms::unpack(&bytes).unwrap();
        assert_eq!(frame.time, 12.5);
        assert_eq!(frame.world_view_projection(), camera.world_view_projection());
        assert_eq!(frame.world(), camera.world);
        assert_eq!(frame._padding, [0.0; 3]);
    }

    #[test]
    fn truncated_frame_block_is_rejected() {
        assert!(matches!(
            FrameUniforms::unpack(&[0u8; 100]),
            Err(WaterError::BlockTooShort { expected: 144, actual: 100, .. })
        ));
    }
}
