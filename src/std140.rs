//! Byte-level access to shader uniform blocks.
//!
//! The writer appends fields in declaration order and never inserts padding on
//! its own: every gap has to be reserved explicitly, and the finished length is
//! checked against the size the layout declares.

use bevy::math::Mat4;

use crate::constants::{BLOCK_ALIGNMENT, MAT4_SIZE, VEC4_SIZE};
use crate::error::{WaterError, WaterResult};

pub const fn align_up(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) / alignment * alignment
}

pub struct Std140Writer {
    block: &'static str,
    bytes: Vec<u8>,
}

impl Std140Writer {
    pub fn new(block: &'static str, capacity: usize) -> Self {
        Self {
            block,
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn vec4(&mut self, value: [f32; 4]) -> &mut Self {
        debug_assert_eq!(self.offset() % VEC4_SIZE, 0, "misaligned vec4 in {}", self.block);
        for component in value {
            self.f32(component);
        }
        self
    }

    /// One element of a `float[N]` array: the value followed by 12 reserved bytes.
    pub fn array_f32(&mut self, value: f32) -> &mut Self {
        self.vec4([value, 0.0, 0.0, 0.0])
    }

    /// Column-major.
    pub fn mat4(&mut self, value: &Mat4) -> &mut Self {
        debug_assert_eq!(self.offset() % VEC4_SIZE, 0, "misaligned mat4 in {}", self.block);
        for component in value.to_cols_array() {
            self.f32(component);
        }
        self
    }

    /// Reserves zeroed bytes up to the next multiple of 16.
    pub fn pad_to_alignment(&mut self) -> &mut Self {
        let end = align_up(self.offset(), BLOCK_ALIGNMENT);
        self.bytes.resize(end, 0);
        self
    }

    pub fn finish(self, declared_size: usize) -> WaterResult<Vec<u8>> {
        if self.bytes.len() != declared_size {
            return Err(WaterError::LayoutSizeMismatch {
                block: self.block,
                declared: declared_size,
                packed: self.bytes.len(),
            });
        }
        Ok(self.bytes)
    }
}

pub struct Std140Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Std140Reader<'a> {
    pub fn new(block: &'static str, bytes: &'a [u8], expected_size: usize) -> WaterResult<Self> {
        if bytes.len() < expected_size {
            return Err(WaterError::BlockTooShort {
                block,
                expected: expected_size,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub fn f32(&self, offset: usize) -> f32 {
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + 4])
    }

    pub fn u32(&self, offset: usize) -> u32 {
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + 4])
    }

    pub fn vec4(&self, offset: usize) -> [f32; 4] {
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + VEC4_SIZE])
    }

    pub fn mat4(&self, offset: usize) -> Mat4 {
        let columns: [f32; 16] = bytemuck::pod_read_unaligned(&self.bytes[offset..offset + MAT4_SIZE]);
        Mat4::from_cols_array(&columns)
    }

    pub fn bytes(&self, offset: usize, len: usize) -> &'a [u8] {
        &self.bytes[offset..offset + len]
    }
}
