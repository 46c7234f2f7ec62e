use bevy::log::debug;
use bevy::math::Vec3;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::error::{WaterError, WaterResult};
use crate::mesh::{MeshData, Vertex};

/// How the side length is divided between grid lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSpacing {
    /// Step is `size / rows`; the last line stops one step short of `origin + size`.
    #[default]
    Stepped,
    /// Step is `size / (rows - 1)`; the last line lies exactly on `origin + size`.
    Spanning,
}

/// A rectangular water grid: `rows` lines along X, `columns` lines along Z.
///
/// Only built through [`GridSpec::new`] or [`GridSpec::with_spacing`], so every
/// grid has at least two lines each way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    rows: u32,
    columns: u32,
    origin: Vec3,
    size: f32,
    spacing: GridSpacing,
}

impl GridSpec {
    pub fn new(rows: u32, columns: u32, origin: Vec3, size: f32) -> WaterResult<Self> {
        Self::with_spacing(rows, columns, origin, size, GridSpacing::default())
    }

    pub fn with_spacing(
        rows: u32,
        columns: u32,
        origin: Vec3,
        size: f32,
        spacing: GridSpacing,
    ) -> WaterResult<Self> {
        if rows < 2 || columns < 2 {
            return Err(WaterError::InvalidGridResolution { rows, columns });
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(WaterError::InvalidGridSize(size));
        }
        let vertex_count = rows as u64 * columns as u64;
        if vertex_count > u32::MAX as u64 {
            return Err(WaterError::GridTooLarge { rows, columns });
        }

        Ok(Self {
            rows,
            columns,
            origin,
            size,
            spacing,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn spacing(&self) -> GridSpacing {
        self.spacing
    }

    pub fn vertex_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    pub fn quad_count(&self) -> usize {
        (self.rows as usize - 1) * (self.columns as usize - 1)
    }

    pub fn index_count(&self) -> usize {
        6 * self.quad_count()
    }

    fn steps(&self) -> (f32, f32) {
        let (row_divisions, column_divisions) = match self.spacing {
            GridSpacing::Stepped => (self.rows, self.columns),
            GridSpacing::Spanning => (self.rows - 1, self.columns - 1),
        };
        (
            self.size / row_divisions as f32,
            self.size / column_divisions as f32,
        )
    }

    pub fn generate(&self) -> MeshData {
        let rows = self.rows;
        let columns = self.columns;
        let (row_step, column_step) = self.steps();

        let vertices: Vec<Vertex> = iproduct!(0..rows, 0..columns)
            .map(|(i, j)| {
                let position = self.origin
                    + Vec3::new(i as f32 * row_step, 0.0, j as f32 * column_step);
                Vertex::new(
                    position.to_array(),
                    [i as f32 / rows as f32, j as f32 / columns as f32, 0.0, 1.0],
                )
            })
            .collect();

        let mut indices = Vec::with_capacity(self.index_count());
        for (i, j) in iproduct!(0..rows - 1, 0..columns - 1) {
            let base = i * columns + j;

            // First triangle
            indices.push(base);
            indices.push(base + 1);
            indices.push(base + columns);

            // Second triangle
            indices.push(base + 1);
            indices.push(base + columns + 1);
            indices.push(base + columns);
        }

        debug!(
            "Generated {}x{} water grid: {} vertices, {} indices",
            rows,
            columns,
            vertices.len(),
            indices.len()
        );

        MeshData::new(vertices, indices)
    }
}

/// Validates the grid description and builds its mesh in one go.
pub fn generate_grid(rows: u32, columns: u32, origin: Vec3, size: f32) -> WaterResult<MeshData> {
    Ok(GridSpec::new(rows, columns, origin, size)?.generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_two_grid_is_one_quad() {
        let spec = GridSpec::with_spacing(2, 2, Vec3::ZERO, 1.0, GridSpacing::Spanning).unwrap();
        let mesh = spec.generate();

        let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
                [1.0, 0.0, 1.0],
            ]
        );
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn stepped_spacing_divides_by_resolution() {
        let mesh = generate_grid(2, 4, Vec3::new(-5.0, -2.0, -5.0), 10.0).unwrap();
        assert_eq!(mesh.vertices[0].position, [-5.0, -2.0, -5.0]);
        // (i = 1, j = 3): x = -5 + 10/2, z = -5 + 3 * 10/4
        assert_eq!(mesh.vertices[7].position, [0.0, -2.0, 2.5]);
        assert_eq!(mesh.vertices[7].color, [0.5, 0.75, 0.0, 1.0]);
    }

    #[test]
    fn attributes_ignore_physical_size() {
        let small = generate_grid(3, 3, Vec3::ZERO, 1.0).unwrap();
        let large = generate_grid(3, 3, Vec3::new(4.0, 1.0, 4.0), 250.0).unwrap();
        let small_colors: Vec<_> = small.vertices.iter().map(|v| v.color).collect();
        let large_colors: Vec<_> = large.vertices.iter().map(|v| v.color).collect();
        assert_eq!(small_colors, large_colors);
    }

    #[test]
    fn rectangular_grid_uses_column_stride() {
        let mesh = generate_grid(2, 3, Vec3::ZERO, 1.0).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 3, 1, 4, 3, 1, 2, 4, 2, 5, 4]);
    }

    #[test]
    fn degenerate_resolution_is_rejected() {
        assert_eq!(
            generate_grid(1, 5, Vec3::ZERO, 1.0),
            Err(WaterError::InvalidGridResolution { rows: 1, columns: 5 })
        );
        assert!(generate_grid(5, 0, Vec3::ZERO, 1.0).is_err());
    }

    #[test]
    fn non_positive_size_is_rejected() {
        assert_eq!(
            generate_grid(4, 4, Vec3::ZERO, 0.0),
            Err(WaterError::InvalidGridSize(0.0))
        );
        assert!(generate_grid(4, 4, Vec3::ZERO, f32::NAN).is_err());
    }

    #[test]
    fn oversized_resolution_is_rejected() {
        assert_eq!(
            GridSpec::new(70_000, 70_000, Vec3::ZERO, 1.0),
            Err(WaterError::GridTooLarge {
                rows: 70_000,
                columns: 70_000
            })
        );
    }

    #[test]
    fn single_line_spanning_grid_is_rejected() {
        assert_eq!(
            GridSpec::with_spacing(1, 1, Vec3::ZERO, 1.0, GridSpacing::Spanning),
            Err(WaterError::InvalidGridResolution { rows: 1, columns: 1 })
        );
        let spec = GridSpec::with_spacing(2, 3, Vec3::X, 4.0, GridSpacing::Spanning).unwrap();
        assert_eq!(spec.rows(), 2);
        assert_eq!(spec.columns(), 3);
        assert_eq!(spec.origin(), Vec3::X);
        assert_eq!(spec.size(), 4.0);
        assert_eq!(spec.spacing(), GridSpacing::Spanning);
    }
}
