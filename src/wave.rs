use std::f32::consts::TAU;

use bevy::log::trace;
use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HEADING, GRAVITY, MAX_WAVES, MIN_WAVES};
use crate::error::{WaterError, WaterResult};

/// Keeps the horizontal part of `direction` and normalizes it. A vector with no
/// horizontal extent becomes zero.
fn horizontal_unit(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// A single deep-water gravity wave.
///
/// Speed is never stored independently: it always comes from the dispersion
/// relation `c = sqrt(g * wavelength / 2pi)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wave {
    wavelength: f32,
    amplitude: f32,
    gravity: f32,
    heading: Vec3,
    direction: Vec3,
}

impl Wave {
    pub fn new(wavelength: f32, amplitude: f32) -> WaterResult<Self> {
        Self::with_gravity(wavelength, amplitude, GRAVITY)
    }

    pub fn with_gravity(wavelength: f32, amplitude: f32, gravity: f32) -> WaterResult<Self> {
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(WaterError::InvalidWavelength(wavelength));
        }
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(WaterError::InvalidAmplitude(amplitude));
        }
        if !gravity.is_finite() || gravity <= 0.0 {
            return Err(WaterError::InvalidGravity(gravity));
        }

        let heading = Vec3::from_array(DEFAULT_HEADING);
        Ok(Self {
            wavelength,
            amplitude,
            gravity,
            heading,
            direction: heading,
        })
    }

    /// Sets both the current direction and the heading that rotation starts from.
    pub fn with_heading(mut self, heading: Vec3) -> Self {
        self.heading = horizontal_unit(heading);
        self.direction = self.heading;
        self
    }

    pub fn wavelength(&self) -> f32 {
        self.wavelength
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn speed(&self) -> f32 {
        (self.gravity * self.wavelength / TAU).sqrt()
    }

    pub fn wave_number(&self) -> f32 {
        TAU / self.wavelength
    }

    pub fn angular_frequency(&self) -> f32 {
        self.wave_number() * self.speed()
    }

    /// Phase `omega * t`, wrapped into `[0, 2pi)`.
    pub fn phase(&self, time: f32) -> f32 {
        let phase = (self.angular_frequency() * time).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if phase >= TAU {
            0.0
        } else {
            phase
        }
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Vertical components are discarded; the result is unit length unless the
    /// input has no horizontal extent.
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = horizontal_unit(direction);
    }
}

/// How wave directions evolve with time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum DirectionDrift {
    #[default]
    Fixed,
    /// Each heading turns about +Y by `t / period` radians.
    Rotating { period: f32 },
}

impl DirectionDrift {
    pub fn direction_at(&self, heading: Vec3, time: f32) -> Vec3 {
        match *self {
            DirectionDrift::Fixed => heading,
            DirectionDrift::Rotating { period } => Quat::from_rotation_y(time / period) * heading,
        }
    }
}

/// The ordered waves a water surface superposes. Holds between one and
/// [`MAX_WAVES`] waves; that count has to match the shader's arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveSet {
    waves: Vec<Wave>,
    drift: DirectionDrift,
}

impl WaveSet {
    pub fn new(waves: Vec<Wave>) -> WaterResult<Self> {
        if !(MIN_WAVES..=MAX_WAVES).contains(&waves.len()) {
            return Err(WaterError::InvalidWaveCount {
                count: waves.len(),
                convention: None,
            });
        }
        Ok(Self {
            waves,
            drift: DirectionDrift::Fixed,
        })
    }

    pub fn single(wave: Wave) -> Self {
        Self {
            waves: vec![wave],
            drift: DirectionDrift::Fixed,
        }
    }

    pub fn with_drift(mut self, drift: DirectionDrift) -> WaterResult<Self> {
        if let DirectionDrift::Rotating { period } = drift {
            if !period.is_finite() || period == 0.0 {
                return Err(WaterError::Config(format!(
                    "direction drift period must be finite and non-zero, got {}",
                    period
                )));
            }
        }
        self.drift = drift;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn drift(&self) -> DirectionDrift {
        self.drift
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wave> {
        self.waves.iter()
    }

    /// Per-wave direction override; the drift policy applies again on the next
    /// `advance`.
    pub fn set_direction(&mut self, index: usize, direction: Vec3) -> Option<()> {
        self.waves.get_mut(index)?.set_direction(direction);
        Some(())
    }

    /// Brings every direction to the state it has at `time`. Only directions
    /// change; wavelength, amplitude and gravity stay fixed for the run.
    pub fn advance(&mut self, time: f32) {
        if self.drift == DirectionDrift::Fixed {
            return;
        }
        for wave in &mut self.waves {
            let direction = self.drift.direction_at(wave.heading, time);
            wave.set_direction(direction);
        }
        trace!("Advanced {} wave directions to t = {:.3}s", self.waves.len(), time);
    }
}
