use std::fs;
use std::path::Path;

use bevy::log::info;
use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{WaterError, WaterResult};
use crate::grid::{GridSpacing, GridSpec};
use crate::uniforms::{PackingConvention, UniformLayout};
use crate::wave::{DirectionDrift, Wave, WaveSet};

/// Everything needed to build a water surface, as written in a `.ron` file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub grid: GridConfig,
    pub waves: Vec<WaveConfig>,
    pub drift: DirectionDrift,
    /// `None` sends only the frame block to the shader.
    pub packing: Option<PackingConvention>,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            waves: vec![WaveConfig::default()],
            drift: DirectionDrift::Rotating {
                period: DEFAULT_DRIFT_PERIOD,
            },
            packing: Some(PackingConvention::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub columns: u32,
    pub origin: [f32; 3],
    pub size: f32,
    pub spacing: GridSpacing,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            columns: DEFAULT_GRID_COLUMNS,
            origin: DEFAULT_GRID_ORIGIN,
            size: DEFAULT_GRID_SIZE,
            spacing: GridSpacing::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub wavelength: f32,
    pub amplitude: f32,
    pub heading: [f32; 3],
    pub gravity: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            wavelength: DEFAULT_WAVELENGTH,
            amplitude: DEFAULT_AMPLITUDE,
            heading: DEFAULT_HEADING,
            gravity: GRAVITY,
        }
    }
}

impl WaveConfig {
    pub fn build(&self) -> WaterResult<Wave> {
        Ok(Wave::with_gravity(self.wavelength, self.amplitude, self.gravity)?
            .with_heading(Vec3::from_array(self.heading)))
    }
}

impl WaterConfig {
    pub fn from_ron_str(contents: &str) -> WaterResult<Self> {
        ron::from_str(contents).map_err(|e| WaterError::Config(e.to_string()))
    }

    pub fn to_ron_string(&self) -> WaterResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        ron::ser::to_string_pretty(self, pretty).map_err(|e| WaterError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> WaterResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| WaterError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_ron_str(&contents)?;
        info!(
            "Loaded water config from {}: {}x{} grid, {} waves",
            path.display(),
            config.grid.rows,
            config.grid.columns,
            config.waves.len()
        );
        Ok(config)
    }

    pub fn grid_spec(&self) -> WaterResult<GridSpec> {
        GridSpec::with_spacing(
            self.grid.rows,
            self.grid.columns,
            Vec3::from_array(self.grid.origin),
            self.grid.size,
            self.grid.spacing,
        )
    }

    pub fn wave_set(&self) -> WaterResult<WaveSet> {
        let waves = self
            .waves
            .iter()
            .map(WaveConfig::build)
            .collect::<WaterResult<Vec<_>>>()?;
        WaveSet::new(waves)?.with_drift(self.drift)
    }

    pub fn uniform_layout(&self) -> WaterResult<UniformLayout> {
        match self.packing {
            Some(convention) => UniformLayout::with_waves(convention, self.waves.len()),
            None => Ok(UniformLayout::frame_only()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_default_scene() {
        let config = WaterConfig::default();
        let grid = config.grid_spec().unwrap();
        assert_eq!(grid.rows(), 50);
        assert_eq!(grid.columns(), 50);
        assert_eq!(grid.origin(), Vec3::new(-5.0, -2.0, -5.0));
        assert_eq!(grid.size(), 10.0);
        assert_eq!(config.wave_set().unwrap().len(), 1);
    }

    #[test]
    fn ron_round_trip_preserves_config() {
        let mut config = WaterConfig::default();
        config.waves.push(WaveConfig {
            wavelength: 6.0,
            amplitude: 0.25,
            heading: [1.0, 0.0, 0.0],
            gravity: GRAVITY,
        });
        config.packing = Some(PackingConvention::Strided);

        let text = config.to_ron_string().unwrap();
        assert_eq!(WaterConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_ron_falls_back_to_defaults() {
        let config = WaterConfig::from_ron_str("(grid: (rows: 8, columns: 12))").unwrap();
        assert_eq!(config.grid.rows, 8);
        assert_eq!(config.grid.columns, 12);
        assert_eq!(config.grid.size, DEFAULT_GRID_SIZE);
        assert_eq!(config.waves, vec![WaveConfig::default()]);
    }

    #[test]
    fn invalid_values_are_reported_not_clamped() {
        let config = WaterConfig::from_ron_str("(grid: (rows: 1))").unwrap();
        assert!(matches!(
            config.grid_spec(),
            Err(WaterError::InvalidGridResolution { rows: 1, .. })
        ));

        let config = WaterConfig::from_ron_str("(waves: [(wavelength: -1.0)])").unwrap();
        assert_eq!(config.wave_set(), Err(WaterError::InvalidWavelength(-1.0)));
    }

    #[test]
    fn inline_packing_rejects_extra_waves() {
        let config = WaterConfig {
            waves: vec![WaveConfig::default(); 2],
            packing: Some(PackingConvention::Inline),
            ..Default::default()
        };
        assert!(config.uniform_layout().is_err());
    }

    #[test]
    fn malformed_ron_is_a_config_error() {
        assert!(matches!(
            WaterConfig::from_ron_str("(grid: ["),
            Err(WaterError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            WaterConfig::load("/nonexistent/water.ron"),
            Err(WaterError::Config(_))
        ));
    }
}
