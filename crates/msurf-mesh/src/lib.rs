//! MathSurf mesh construction: sampling grids, icospheres, adaptive implicit
//! polygonization, normals and vertex coloring.

pub mod coloring;
pub mod generate;
pub mod grid;
pub mod icosphere;
pub mod implicit;
pub mod mesh;
pub mod normals;
mod tables;

pub use coloring::{color_vertices, SampleDomain, VertexColoring};
pub use generate::{generate_mesh, ShapeRanges};
pub use grid::ParamGrid;
pub use icosphere::{EdgeRef, Icosphere};
pub use implicit::{polygonize, PolygonizedSurface};
pub use mesh::{GeneratedMesh, TexCoords};
pub use normals::NormalEstimator;
