use std::fmt;

use crate::uniforms::PackingConvention;

/// Every failure the water core can report. All of them are static
/// configuration or layout defects, none is worth retrying.
#[derive(Debug, Clone, PartialEq)]
pub enum WaterError {
    InvalidGridResolution { rows: u32, columns: u32 },
    InvalidGridSize(f32),
    GridTooLarge { rows: u32, columns: u32 },
    InvalidWavelength(f32),
    InvalidAmplitude(f32),
    InvalidGravity(f32),
    InvalidWaveCount {
        count: usize,
        convention: Option<PackingConvention>,
    },
    WaveCountMismatch { expected: usize, actual: usize },
    LayoutSizeMismatch {
        block: &'static str,
        declared: usize,
        packed: usize,
    },
    BlockTooShort {
        block: &'static str,
        expected: usize,
        actual: usize,
    },
    Config(String),
}

impl fmt::Display for WaterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaterError::InvalidGridResolution { rows, columns } => write!(
                f,
                "grid resolution {}x{} is degenerate, rows and columns must both be at least 2",
                rows, columns
            ),
            WaterError::InvalidGridSize(size) => {
                write!(f, "grid side length must be finite and positive, got {}", size)
            }
            WaterError::GridTooLarge { rows, columns } => write!(
                f,
                "grid resolution {}x{} does not fit 32-bit indices",
                rows, columns
            ),
            WaterError::InvalidWavelength(wavelength) => write!(
                f,
                "wavelength must be finite and positive, got {}",
                wavelength
            ),
            WaterError::InvalidAmplitude(amplitude) => write!(
                f,
                "amplitude must be finite and non-negative, got {}",
                amplitude
            ),
            WaterError::InvalidGravity(gravity) => {
                write!(f, "gravity must be finite and positive, got {}", gravity)
            }
            WaterError::InvalidWaveCount { count, convention } => match convention {
                Some(convention) => write!(
                    f,
                    "{:?} packing does not support {} waves",
                    convention, count
                ),
                None => write!(f, "a wave set holds 1 to 3 waves, got {}", count),
            },
            WaterError::WaveCountMismatch { expected, actual } => write!(
                f,
                "uniform layout is built for {} waves but the wave set has {}",
                expected, actual
            ),
            WaterError::LayoutSizeMismatch {
                block,
                declared,
                packed,
            } => write!(
                f,
                "{} block packed to {} bytes but the layout declares {}",
                block, packed, declared
            ),
            WaterError::BlockTooShort {
                block,
                expected,
                actual,
            } => write!(
                f,
                "{} block needs {} bytes, got {}",
                block, expected, actual
            ),
            WaterError::Config(message) => write!(f, "invalid water configuration: {}", message),
        }
    }
}

impl std::error::Error for WaterError {}

pub type WaterResult<T> = Result<T, WaterError>;
