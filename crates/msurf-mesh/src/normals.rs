//! Per-vertex normal estimation.
//!
//! Each entry point returns raw, un-normalized normals; [`NormalEstimator::finish`]
//! normalizes them exactly once and reports the degenerate ones.

use msurf_core::{Result, SurfaceError, Tolerance};
use msurf_geometry::{NormalComputation, Shape, SurfaceKind};
use msurf_math::{DQuat, Point3, Vector3};
use tracing::warn;

use crate::grid::ParamGrid;

/// Above this `|z|` a spherical sample is "near a pole" and its tangent frame
/// is built from world Y instead of world Z.
const POLE_THRESHOLD: f64 = 0.9;

pub struct NormalEstimator<'a> {
    policy: &'a NormalComputation,
    delta: f64,
    tolerance: Tolerance,
}

impl<'a> NormalEstimator<'a> {
    pub fn new(policy: &'a NormalComputation, delta: f64) -> Self {
        Self {
            policy,
            delta,
            tolerance: Tolerance::default(),
        }
    }

    fn unsupported(&self, kind: SurfaceKind) -> SurfaceError {
        SurfaceError::config(format!(
            "{:?} normals are not supported on {} surfaces",
            self.policy.mode(),
            kind
        ))
    }

    /// Normals of an explicit or parametric surface sampled on `grid`.
    /// `positions` are the grid samples in storage order.
    pub fn grid(&self, shape: &Shape, grid: &ParamGrid, positions: &[Point3]) -> Result<Vec<Vector3>> {
        if !shape.kind().is_grid() {
            return Err(self.unsupported(shape.kind()));
        }
        match self.policy {
            NormalComputation::Derivative => {
                let d = self.delta;
                let eval = |u: f64, v: f64| shape.grid_point(u, v).unwrap_or(Point3::ZERO);
                Ok(grid
                    .coords()
                    .map(|(u, v)| {
                        let du = eval(u + d, v) - eval(u - d, v);
                        let dv = eval(u, v + d) - eval(u, v - d);
                        du.cross(dv)
                    })
                    .collect())
            }
            NormalComputation::InputFunction(f) => Ok(grid.coords().map(|(u, v)| f(u, v)).collect()),
            NormalComputation::OutputFunction(f) => {
                Ok(positions.iter().map(|p| f(p.x, p.y, p.z)).collect())
            }
            NormalComputation::ClosestNeighbors => Ok(neighbor_normals(grid, positions)),
        }
    }

    /// Normals of a spherical surface. `directions` are the unit sample
    /// directions and `positions` the scaled points.
    pub fn spherical(
        &self,
        radius: &dyn Fn(f64, f64, f64) -> f64,
        directions: &[Vector3],
        positions: &[Point3],
    ) -> Result<Vec<Vector3>> {
        match self.policy {
            NormalComputation::Derivative => {
                let d = self.delta;
                let sample = |dir: Vector3| dir * radius(dir.x, dir.y, dir.z);
                Ok(directions
                    .iter()
                    .map(|&dir| {
                        let (a1, a2) = tangent_axes(dir);
                        let t1 = sample(DQuat::from_axis_angle(a1, d) * dir)
                            - sample(DQuat::from_axis_angle(a1, -d) * dir);
                        let t2 = sample(DQuat::from_axis_angle(a2, d) * dir)
                            - sample(DQuat::from_axis_angle(a2, -d) * dir);
                        t1.cross(t2)
                    })
                    .collect())
            }
            NormalComputation::OutputFunction(f) => {
                Ok(positions.iter().map(|p| f(p.x, p.y, p.z)).collect())
            }
            _ => Err(self.unsupported(SurfaceKind::Spherical)),
        }
    }

    /// Normals of an implicit surface at its polygonized vertices.
    pub fn implicit(
        &self,
        field: &dyn Fn(f64, f64, f64) -> f64,
        positions: &[Point3],
    ) -> Result<Vec<Vector3>> {
        match self.policy {
            NormalComputation::Derivative => {
                let d = self.delta;
                Ok(positions
                    .iter()
                    .map(|p| {
                        Vector3::new(
                            field(p.x + d, p.y, p.z) - field(p.x - d, p.y, p.z),
                            field(p.x, p.y + d, p.z) - field(p.x, p.y - d, p.z),
                            field(p.x, p.y, p.z + d) - field(p.x, p.y, p.z - d),
                        )
                    })
                    .collect())
            }
            NormalComputation::OutputFunction(f) => {
                Ok(positions.iter().map(|p| f(p.x, p.y, p.z)).collect())
            }
            _ => Err(self.unsupported(SurfaceKind::Implicit)),
        }
    }

    /// Normalize every raw normal. Zero-length ones, and ones that do not
    /// come out of normalization at unit length (infinite components), are
    /// kept as they are and their indices returned.
    pub fn finish(&self, raw: Vec<Vector3>) -> (Vec<Vector3>, Vec<u32>) {
        let mut degenerate = Vec::new();
        let normals = raw
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                let len = n.length();
                let unit = n / len;
                if self.tolerance.is_degenerate(len) || !self.tolerance.is_unit(unit.length()) {
                    degenerate.push(i as u32);
                    n
                } else {
                    unit
                }
            })
            .collect();
        if !degenerate.is_empty() {
            warn!(
                count = degenerate.len(),
                first = degenerate[0],
                "degenerate normals left unnormalized"
            );
        }
        (normals, degenerate)
    }
}

/// Two unit axes orthogonal to `dir` and to each other: `dir x up` and
/// `dir x (dir x up)`. Rotating `dir` about them sweeps two tangent
/// directions whose cross product points outward.
fn tangent_axes(dir: Vector3) -> (Vector3, Vector3) {
    let up = if dir.z.abs() > POLE_THRESHOLD {
        Vector3::Y
    } else {
        Vector3::Z
    };
    let a1 = dir.cross(up).normalize();
    let a2 = dir.cross(a1).normalize();
    (a1, a2)
}

/// Tangents from neighboring grid vertices: central differences inside,
/// one-sided at the borders.
fn neighbor_normals(grid: &ParamGrid, positions: &[Point3]) -> Vec<Vector3> {
    let (nu, nv) = (grid.num_u(), grid.num_v());
    let at = |i: usize, j: usize| positions[grid.index(i, j)];
    let mut normals = Vec::with_capacity(positions.len());
    for i in 0..nu {
        let (i0, i1) = (i.saturating_sub(1), (i + 1).min(nu - 1));
        for j in 0..nv {
            let (j0, j1) = (j.saturating_sub(1), (j + 1).min(nv - 1));
            let du = at(i1, j) - at(i0, j);
            let dv = at(i, j1) - at(i, j0);
            normals.push(du.cross(dv));
        }
    }
    normals
}
