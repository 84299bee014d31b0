//! Caller-supplied functions that define a surface.

use std::fmt;

use msurf_math::{Color, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// `z = f(x, y)`
pub type ExplicitFn = Box<dyn Fn(f64, f64) -> f64 + Send + Sync>;
/// `radius = f(x, y, z)` evaluated on unit directions.
pub type SphericalFn = Box<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>;
/// `position = f(u, v)`
pub type ParametricFn = Box<dyn Fn(f64, f64) -> Point3 + Send + Sync>;
/// Scalar field whose zero set is the surface.
pub type ImplicitFn = Box<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>;

/// Color from the 2D input coordinates of a grid sample.
pub type ColorInputFn = Box<dyn Fn(f64, f64) -> Color + Send + Sync>;
/// Color from the generated 3D position.
pub type ColorOutputFn = Box<dyn Fn(f64, f64, f64) -> Color + Send + Sync>;

/// Normal from the 2D input coordinates of a grid sample.
pub type NormalInputFn = Box<dyn Fn(f64, f64) -> Vector3 + Send + Sync>;
/// Normal from the generated 3D position.
pub type NormalOutputFn = Box<dyn Fn(f64, f64, f64) -> Vector3 + Send + Sync>;

/// Generation strategy of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Explicit,
    Spherical,
    Parametric,
    Implicit,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 4] = [
        SurfaceKind::Explicit,
        SurfaceKind::Spherical,
        SurfaceKind::Parametric,
        SurfaceKind::Implicit,
    ];

    /// Column in the legality tables.
    pub(crate) fn column(self) -> usize {
        self as usize
    }

    /// Explicit and parametric surfaces are sampled on a flat `(u, v)` grid.
    pub fn is_grid(self) -> bool {
        matches!(self, SurfaceKind::Explicit | SurfaceKind::Parametric)
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceKind::Explicit => "explicit",
            SurfaceKind::Spherical => "spherical",
            SurfaceKind::Parametric => "parametric",
            SurfaceKind::Implicit => "implicit",
        };
        f.write_str(name)
    }
}

/// The generation function of a surface, tagged by kind.
pub enum Shape {
    Explicit(ExplicitFn),
    Spherical(SphericalFn),
    Parametric(ParametricFn),
    Implicit(ImplicitFn),
}

impl Shape {
    pub fn explicit(f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Shape::Explicit(Box::new(f))
    }

    pub fn spherical(f: impl Fn(f64, f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Shape::Spherical(Box::new(f))
    }

    pub fn parametric(f: impl Fn(f64, f64) -> Point3 + Send + Sync + 'static) -> Self {
        Shape::Parametric(Box::new(f))
    }

    pub fn implicit(f: impl Fn(f64, f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Shape::Implicit(Box::new(f))
    }

    pub fn kind(&self) -> SurfaceKind {
        match self {
            Shape::Explicit(_) => SurfaceKind::Explicit,
            Shape::Spherical(_) => SurfaceKind::Spherical,
            Shape::Parametric(_) => SurfaceKind::Parametric,
            Shape::Implicit(_) => SurfaceKind::Implicit,
        }
    }

    /// Surface point at grid coordinates `(u, v)`. Only grid kinds have one.
    pub fn grid_point(&self, u: f64, v: f64) -> Option<Point3> {
        match self {
            Shape::Explicit(f) => Some(Point3::new(u, v, f(u, v))),
            Shape::Parametric(f) => Some(f(u, v)),
            Shape::Spherical(_) | Shape::Implicit(_) => None,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape::{:?}", self.kind())
    }
}
