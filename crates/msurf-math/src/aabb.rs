use crate::{ParamRange, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Box spanned by one range per axis.
    pub fn from_ranges(x: ParamRange, y: ParamRange, z: ParamRange) -> Self {
        Self {
            min: Point3::new(x.min, y.min, z.min),
            max: Point3::new(x.max, y.max, z.max),
        }
    }

    pub fn from_points(points: &[Point3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min = points[0];
        let mut max = points[0];
        for &p in &points[1..] {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Grid node `(i, j, k)` when every axis is split into `divisions` cells.
    pub fn grid_node(&self, divisions: usize, i: usize, j: usize, k: usize) -> Point3 {
        let step = self.extents() / divisions as f64;
        self.min + Vector3::new(i as f64 * step.x, j as f64 * step.y, k as f64 * step.z)
    }

    /// Cell `(i, j, k)` of the same grid as [`Aabb3::grid_node`].
    pub fn grid_cell(&self, divisions: usize, i: usize, j: usize, k: usize) -> Self {
        Self {
            min: self.grid_node(divisions, i, j, k),
            max: self.grid_node(divisions, i + 1, j + 1, k + 1),
        }
    }
}
