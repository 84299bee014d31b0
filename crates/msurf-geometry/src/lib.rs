//! MathSurf geometry: generation functions, coloring/normal policies, and the
//! surface descriptor.

pub mod coloring;
pub mod descriptor;
pub mod functions;
pub mod image;
pub mod normals;
pub mod options;
pub mod shapes;

pub use coloring::{Coloring, ColoringMode};
pub use descriptor::SurfaceDescriptor;
pub use functions::{
    ColorInputFn, ColorOutputFn, ExplicitFn, ImplicitFn, NormalInputFn, NormalOutputFn,
    ParametricFn, Shape, SphericalFn, SurfaceKind,
};
pub use image::{Image, TextureKind};
pub use normals::{NormalComputation, NormalMode};
pub use options::SurfaceOptions;
