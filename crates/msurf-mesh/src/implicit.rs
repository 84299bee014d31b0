//! Adaptive marching-cubes extraction of the zero set of a scalar field.
//!
//! The search box is split into a coarse grid. Only cells whose corner
//! samples change sign are refined further, one refinement factor per depth;
//! cells at the last depth are triangulated with the marching-cubes tables.
//! Output vertices are not shared: every triangle gets its own three.

use msurf_core::{Result, SurfaceError};
use msurf_math::{Aabb3, Point3, Vector3};
use tracing::debug;

use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// Most triangles a single cell can produce.
const MAX_TRIANGLES_PER_CELL: usize = 5;

/// Triangle soup produced by [`polygonize`].
#[derive(Debug, Clone, Default)]
pub struct PolygonizedSurface {
    pub vertices: Vec<Point3>,
    pub triangles: Vec<[u32; 3]>,
}

impl PolygonizedSurface {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

struct Polygonizer<'a> {
    field: &'a dyn Fn(f64, f64, f64) -> f64,
    refinements: &'a [u32],
    max_triangles: usize,
    out: PolygonizedSurface,
    flagged_per_depth: Vec<usize>,
}

/// Extract the surface `field = 0` inside `bounds`.
///
/// `refinements[d]` is the number of cells per axis the current box is split
/// into at depth `d`; the recursion stops after `refinements.len()` levels.
/// Generation fails with [`SurfaceError::ResourceExhausted`] as soon as a
/// cell's triangles could push the total to `max_triangles`.
pub fn polygonize(
    bounds: Aabb3,
    refinements: &[u32],
    field: &dyn Fn(f64, f64, f64) -> f64,
    max_triangles: usize,
) -> Result<PolygonizedSurface> {
    if refinements.is_empty() || refinements.iter().any(|&r| r < 1) {
        return Err(SurfaceError::config(
            "implicit polygonization needs at least one refinement, each at least 1",
        ));
    }

    let mut search = Polygonizer {
        field,
        refinements,
        max_triangles,
        out: PolygonizedSurface::default(),
        flagged_per_depth: vec![0; refinements.len()],
    };
    search.refine(bounds, 0)?;

    debug!(
        triangles = search.out.triangle_count(),
        flagged = ?search.flagged_per_depth,
        "implicit polygonization finished"
    );
    Ok(search.out)
}

impl<'a> Polygonizer<'a> {
    fn refine(&mut self, bounds: Aabb3, depth: usize) -> Result<()> {
        let cells = self.refinements[depth] as usize;
        let nodes = cells + 1;
        let last_level = depth + 1 == self.refinements.len();

        let mut values = Vec::with_capacity(nodes * nodes * nodes);
        for i in 0..nodes {
            for j in 0..nodes {
                for k in 0..nodes {
                    let p = bounds.grid_node(cells, i, j, k);
                    values.push((self.field)(p.x, p.y, p.z));
                }
            }
        }
        let at = |i: usize, j: usize, k: usize| values[(i * nodes + j) * nodes + k];

        for i in 0..cells {
            for j in 0..cells {
                for k in 0..cells {
                    let corners = CORNER_OFFSETS.map(|[di, dj, dk]| at(i + di, j + dj, k + dk));
                    if !may_cross_zero(&corners) {
                        continue;
                    }
                    self.flagged_per_depth[depth] += 1;

                    let cell = bounds.grid_cell(cells, i, j, k);
                    if last_level {
                        self.triangulate(cell, &corners)?;
                    } else {
                        self.refine(cell, depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn triangulate(&mut self, cell: Aabb3, values: &[f64; 8]) -> Result<()> {
        let case = cube_case(values);
        let crossed = EDGE_TABLE[case];
        if crossed == 0 {
            return Ok(());
        }

        if self.out.triangle_count() + MAX_TRIANGLES_PER_CELL >= self.max_triangles {
            return Err(SurfaceError::ResourceExhausted(format!(
                "implicit surface needs more than {} triangles",
                self.max_triangles
            )));
        }

        let size = cell.extents();
        let corners = CORNER_OFFSETS.map(|[dx, dy, dz]| {
            cell.min + Vector3::new(dx as f64 * size.x, dy as f64 * size.y, dz as f64 * size.z)
        });

        let mut edge_points = [Point3::ZERO; 12];
        for (e, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
            if crossed & (1 << e) != 0 {
                edge_points[e] = zero_crossing(corners[a], corners[b], values[a], values[b]);
            }
        }

        for tri in TRI_TABLE[case].chunks_exact(3) {
            if tri[0] < 0 {
                break;
            }
            // The table winds around the inside; flip so faces point along +grad F.
            let base = self.out.vertices.len() as u32;
            for &e in [tri[0], tri[2], tri[1]].iter() {
                self.out.vertices.push(edge_points[e as usize]);
            }
            self.out.triangles.push([base, base + 1, base + 2]);
        }
        Ok(())
    }
}

/// Cheap rejection: the base corner against the other seven. A cell whose
/// corners all share a sign is never flagged.
fn may_cross_zero(values: &[f64; 8]) -> bool {
    values[1..].iter().any(|&v| values[0] * v <= 0.0)
}

/// Marching-cubes case index, bit `c` set when corner `c` is inside.
fn cube_case(values: &[f64; 8]) -> usize {
    let mut case = 0;
    for (c, &v) in values.iter().enumerate() {
        if v < 0.0 {
            case |= 1 << c;
        }
    }
    case
}

/// Linear estimate of the zero between `a` and `b`; the midpoint when both
/// samples are equal.
fn zero_crossing(a: Point3, b: Point3, fa: f64, fb: f64) -> Point3 {
    let t = if fa == fb { 0.5 } else { fa / (fa - fb) };
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use msurf_math::ParamRange;

    fn cube(half: f64) -> Aabb3 {
        let r = ParamRange::new(-half, half);
        Aabb3::from_ranges(r, r, r)
    }

    fn unit_sphere(x: f64, y: f64, z: f64) -> f64 {
        x * x + y * y + z * z - 1.0
    }

    #[test]
    fn test_sphere_vertices_near_surface() {
        let surface = polygonize(cube(2.0), &[20], &unit_sphere, 10_000).unwrap();
        assert!(surface.triangle_count() > 100);
        assert_eq!(surface.vertices.len(), 3 * surface.triangle_count());
        for p in &surface.vertices {
            assert!((p.length() - 1.0).abs() < 0.02, "|p| = {}", p.length());
        }
    }

    #[test]
    fn test_triangles_face_outward() {
        let surface = polygonize(cube(2.0), &[10], &unit_sphere, 10_000).unwrap();
        for [a, b, c] in &surface.triangles {
            let (pa, pb, pc) = (
                surface.vertices[*a as usize],
                surface.vertices[*b as usize],
                surface.vertices[*c as usize],
            );
            let n = (pb - pa).cross(pc - pa);
            assert!(n.dot(pa + pb + pc) > 0.0);
        }
    }

    #[test]
    fn test_nested_refinement_stays_on_surface() {
        let surface = polygonize(cube(2.0), &[4, 5], &unit_sphere, 10_000).unwrap();
        assert!(surface.triangle_count() > 100);
        for p in &surface.vertices {
            assert!((p.length() - 1.0).abs() < 0.02, "|p| = {}", p.length());
        }
    }

    #[test]
    fn test_triangle_cap_is_fatal() {
        let err = polygonize(cube(2.0), &[20], &unit_sphere, 10).unwrap_err();
        assert!(err.is_resource_exhausted());
    }

    #[test]
    fn test_same_sign_cells_emit_nothing() {
        let positive = [1.0, 2.0, 0.5, 3.0, 1.0, 1.0, 4.0, 0.1];
        assert!(!may_cross_zero(&positive));
        let negative = positive.map(|v: f64| -v);
        assert!(!may_cross_zero(&negative));
        assert_eq!(EDGE_TABLE[cube_case(&negative)], 0);

        let far_away = |x: f64, y: f64, z: f64| unit_sphere(x - 10.0, y, z);
        let surface = polygonize(cube(2.0), &[8, 4], &far_away, 1000).unwrap();
        assert_eq!(surface.triangle_count(), 0);
    }

    #[test]
    fn test_plane_crossing() {
        let plane = |_: f64, _: f64, z: f64| z - 0.3;
        let surface = polygonize(cube(1.0), &[4], &plane, 1000).unwrap();
        // 4x4 cells in the crossed layer, two triangles each
        assert_eq!(surface.triangle_count(), 32);
        for p in &surface.vertices {
            assert!((p.z - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_equal_samples_use_midpoint() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        assert_eq!(zero_crossing(a, b, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(zero_crossing(a, b, -1.0, 3.0), Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_missing_refinements_rejected() {
        assert!(polygonize(cube(1.0), &[], &unit_sphere, 100).is_err());
        assert!(polygonize(cube(1.0), &[4, 0], &unit_sphere, 100).is_err());
    }
}
