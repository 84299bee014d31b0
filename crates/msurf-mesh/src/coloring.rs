//! Per-vertex color and texture coordinates for each coloring strategy.

use msurf_core::{Result, SurfaceError};
use msurf_geometry::Coloring;
use msurf_math::{Color, Point3, Vector3};

use crate::grid::ParamGrid;
use crate::mesh::TexCoords;

/// Where the vertices of a mesh came from.
#[derive(Debug, Clone, Copy)]
pub enum SampleDomain<'a> {
    /// Regular `(u, v)` grid, one vertex per sample.
    Grid(&'a ParamGrid),
    /// Unit directions of a spherical surface, one per vertex.
    Sphere(&'a [Vector3]),
    /// Polygonized volume; vertices have no parameter coordinates.
    Volume,
}

impl SampleDomain<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            SampleDomain::Grid(_) => "grid",
            SampleDomain::Sphere(_) => "spherical",
            SampleDomain::Volume => "implicit",
        }
    }
}

/// Vertex colors and texture coordinates produced by [`color_vertices`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexColoring {
    pub colors: Vec<Color>,
    pub texcoords: TexCoords,
}

/// Evaluate `coloring` for vertices at `positions` sampled from `domain`.
///
/// Global coloring lives in a constant buffer and yields nothing per vertex.
pub fn color_vertices(
    coloring: &Coloring,
    domain: SampleDomain<'_>,
    positions: &[Point3],
) -> Result<VertexColoring> {
    let mut out = VertexColoring::default();
    match (coloring, domain) {
        (Coloring::Global(_), _) => {}
        (Coloring::OutputFunction(f), _) => {
            out.colors = positions.iter().map(|p| f(p.x, p.y, p.z)).collect();
        }
        (Coloring::Array(colors), SampleDomain::Grid(grid)) => {
            if colors.len() != grid.len() {
                return Err(SurfaceError::config(format!(
                    "color array has {} entries, grid has {}",
                    colors.len(),
                    grid.len()
                )));
            }
            out.colors = colors.clone();
        }
        (Coloring::InputFunction(f), SampleDomain::Grid(grid)) => {
            out.colors = grid.coords().map(|(u, v)| f(u, v)).collect();
        }
        (Coloring::Textured(_), SampleDomain::Grid(grid)) => {
            out.texcoords = TexCoords::Planar(grid.texcoords());
        }
        (Coloring::Textured(_), SampleDomain::Sphere(directions)) => {
            out.texcoords = TexCoords::Cubemap(directions.to_vec());
        }
        (other, domain) => {
            return Err(SurfaceError::config(format!(
                "{} coloring is not supported on {} surfaces",
                other.mode(),
                domain.kind_name()
            )));
        }
    }
    Ok(out)
}
