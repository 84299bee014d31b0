//! Regular `(u, v)` sampling grids shared by explicit and parametric surfaces.

use msurf_math::{AxisSampling, ParamRange, Point2, Point3};

/// `num_u x num_v` samples over two ranges, stored u-major: sample `(i, j)`
/// lives at index `i * num_v + j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamGrid {
    pub u: AxisSampling,
    pub v: AxisSampling,
}

impl ParamGrid {
    pub fn new(
        range_u: ParamRange,
        range_v: ParamRange,
        num_u: usize,
        num_v: usize,
        include_borders: bool,
    ) -> Self {
        Self {
            u: range_u.sampling(num_u, include_borders),
            v: range_v.sampling(num_v, include_borders),
        }
    }

    pub fn num_u(&self) -> usize {
        self.u.count
    }

    pub fn num_v(&self) -> usize {
        self.v.count
    }

    pub fn len(&self) -> usize {
        self.u.count * self.v.count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.v.count + j
    }

    /// Input coordinates of sample `(i, j)`.
    pub fn coord(&self, i: usize, j: usize) -> (f64, f64) {
        (self.u.at(i), self.v.at(j))
    }

    /// All input coordinates in storage order.
    pub fn coords(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.u.count).flat_map(move |i| (0..self.v.count).map(move |j| self.coord(i, j)))
    }

    /// Evaluate `f` at every sample in storage order.
    pub fn sample(&self, f: impl Fn(f64, f64) -> Point3) -> Vec<Point3> {
        let mut points = Vec::with_capacity(self.len());
        points.extend(self.coords().map(|(u, v)| f(u, v)));
        points
    }

    /// Normalized texture coordinates, `(0, 0)` at the first sample and
    /// `(1, 1)` at the last.
    pub fn texcoords(&self) -> Vec<Point2> {
        let du = (self.u.count - 1).max(1) as f64;
        let dv = (self.v.count - 1).max(1) as f64;
        let mut uvs = Vec::with_capacity(self.len());
        for i in 0..self.u.count {
            for j in 0..self.v.count {
                uvs.push(Point2::new(i as f64 / du, j as f64 / dv));
            }
        }
        uvs
    }

    /// Two triangles per grid cell, 6 indices each, counter-clockwise when
    /// `u` maps to +X and `v` to +Y.
    pub fn quad_indices(&self) -> Vec<u32> {
        let (nu, nv) = (self.u.count, self.v.count);
        let idx = |i: usize, j: usize| -> u32 { (i * nv + j) as u32 };
        let mut indices = Vec::with_capacity(nu.saturating_sub(1) * nv.saturating_sub(1) * 6);
        for i in 0..nu.saturating_sub(1) {
            for j in 0..nv.saturating_sub(1) {
                // First triangle
                indices.push(idx(i, j));
                indices.push(idx(i + 1, j));
                indices.push(idx(i + 1, j + 1));
                // Second triangle
                indices.push(idx(i, j));
                indices.push(idx(i + 1, j + 1));
                indices.push(idx(i, j + 1));
            }
        }
        indices
    }
}
