//! CPU mesh generation for a complete surface descriptor.
//!
//! Positions come from the shape, then colors, then normals when the surface
//! is lit. Nothing here touches a GPU; the render crate uploads the result.

use msurf_core::{Result, SurfaceError};
use msurf_geometry::{Shape, SurfaceDescriptor, SurfaceOptions};
use msurf_math::{Aabb3, ParamRange, Point3};
use tracing::debug;

use crate::coloring::{color_vertices, SampleDomain};
use crate::grid::ParamGrid;
use crate::icosphere::Icosphere;
use crate::implicit::polygonize;
use crate::mesh::GeneratedMesh;
use crate::normals::NormalEstimator;

/// Parameter ranges of one generation run. `w` is only read by implicit
/// surfaces, and spherical surfaces ignore all three.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRanges {
    pub u: ParamRange,
    pub v: ParamRange,
    pub w: ParamRange,
}

impl ShapeRanges {
    pub fn new(u: ParamRange, v: ParamRange, w: ParamRange) -> Self {
        Self { u, v, w }
    }

    /// All three ranges left as they are.
    pub fn keep() -> Self {
        Self::new(ParamRange::KEEP, ParamRange::KEEP, ParamRange::KEEP)
    }

    pub fn from_options(options: &SurfaceOptions) -> Self {
        Self::new(options.range_u, options.range_v, options.range_w)
    }

    /// `requested` with every `(0, 0)` range replaced by the one in `self`.
    pub fn merge(self, requested: ShapeRanges) -> Self {
        Self::new(
            requested.u.or_keep(self.u),
            requested.v.or_keep(self.v),
            requested.w.or_keep(self.w),
        )
    }
}

impl Default for ShapeRanges {
    fn default() -> Self {
        Self::from_options(&SurfaceOptions::default())
    }
}

/// Build positions, indices, colors and normals of `desc` over `ranges`.
///
/// `desc` is expected to have passed validation; the checks repeated here only
/// guard against calling this directly with an incomplete descriptor.
pub fn generate_mesh(desc: &SurfaceDescriptor, ranges: &ShapeRanges) -> Result<GeneratedMesh> {
    let shape = desc
        .shape
        .as_ref()
        .ok_or_else(|| SurfaceError::config(format!("{} surface has no generation function", desc.kind)))?;
    desc.validate_ranges(ranges.u, ranges.v, ranges.w)?;

    let opts = &desc.options;
    let estimator = NormalEstimator::new(&desc.normals, opts.delta_value);
    let mut mesh = GeneratedMesh::default();

    match shape {
        Shape::Explicit(_) | Shape::Parametric(_) => {
            let grid = ParamGrid::new(
                ranges.u,
                ranges.v,
                opts.num_u,
                opts.num_v,
                opts.border_points_included,
            );
            mesh.positions = sample_grid(shape, &grid);
            mesh.indices = grid.quad_indices();
            apply_colors(&mut mesh, desc, SampleDomain::Grid(&grid))?;
            if opts.enable_illuminated {
                let raw = estimator.grid(shape, &grid, &mesh.positions)?;
                (mesh.normals, mesh.degenerate_normals) = estimator.finish(raw);
            }
        }
        Shape::Spherical(radius) => {
            let sphere = Icosphere::build(opts.icosphere_depth);
            let directions = sphere.unit_vertices();
            mesh.positions = directions
                .iter()
                .map(|d| *d * radius(d.x, d.y, d.z))
                .collect();
            mesh.indices = sphere.indices();
            apply_colors(&mut mesh, desc, SampleDomain::Sphere(&directions))?;
            if opts.enable_illuminated {
                let raw = estimator.spherical(&**radius, &directions, &mesh.positions)?;
                (mesh.normals, mesh.degenerate_normals) = estimator.finish(raw);
            }
        }
        Shape::Implicit(field) => {
            let bounds = Aabb3::from_ranges(ranges.u, ranges.v, ranges.w);
            let surface = polygonize(
                bounds,
                opts.active_refinements(),
                &**field,
                opts.max_implicit_triangles,
            )?;
            mesh.indices = surface.indices();
            mesh.positions = surface.vertices;
            apply_colors(&mut mesh, desc, SampleDomain::Volume)?;
            if opts.enable_illuminated {
                let raw = estimator.implicit(&**field, &mesh.positions)?;
                (mesh.normals, mesh.degenerate_normals) = estimator.finish(raw);
            }
        }
    }

    debug!(
        kind = %desc.kind,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        bounds = ?mesh.bounding_box(),
        "generated surface mesh"
    );
    Ok(mesh)
}

fn sample_grid(shape: &Shape, grid: &ParamGrid) -> Vec<Point3> {
    match shape {
        Shape::Explicit(f) => grid.sample(|x, y| Point3::new(x, y, f(x, y))),
        Shape::Parametric(f) => grid.sample(|u, v| f(u, v)),
        Shape::Spherical(_) | Shape::Implicit(_) => Vec::new(),
    }
}

fn apply_colors(mesh: &mut GeneratedMesh, desc: &SurfaceDescriptor, domain: SampleDomain<'_>) -> Result<()> {
    let colored = color_vertices(&desc.coloring, domain, &mesh.positions)?;
    mesh.colors = colored.colors;
    mesh.texcoords = colored.texcoords;
    Ok(())
}
