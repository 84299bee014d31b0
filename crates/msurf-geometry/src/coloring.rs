//! Color-assignment strategies and where each one is legal.

use std::fmt;

use msurf_math::Color;
use serde::{Deserialize, Serialize};

use crate::functions::{ColorInputFn, ColorOutputFn, SurfaceKind};
use crate::image::{Image, TextureKind};

/// How vertex colors are assigned. Each variant carries the data it needs.
pub enum Coloring {
    /// One color for the whole surface, kept in a constant buffer.
    Global(Color),
    /// One color per grid sample, `num_u * num_v` entries in grid order.
    Array(Vec<Color>),
    /// Color computed from the grid's input coordinates.
    InputFunction(ColorInputFn),
    /// Color computed from the generated position.
    OutputFunction(ColorOutputFn),
    /// Planar texture on grid surfaces, cubemap on spherical ones.
    Textured(Image),
}

impl Coloring {
    pub fn input_function(f: impl Fn(f64, f64) -> Color + Send + Sync + 'static) -> Self {
        Coloring::InputFunction(Box::new(f))
    }

    pub fn output_function(f: impl Fn(f64, f64, f64) -> Color + Send + Sync + 'static) -> Self {
        Coloring::OutputFunction(Box::new(f))
    }

    pub fn mode(&self) -> ColoringMode {
        match self {
            Coloring::Global(_) => ColoringMode::Global,
            Coloring::Array(_) => ColoringMode::Array,
            Coloring::InputFunction(_) => ColoringMode::InputFunction,
            Coloring::OutputFunction(_) => ColoringMode::OutputFunction,
            Coloring::Textured(_) => ColoringMode::Textured,
        }
    }
}

impl Default for Coloring {
    fn default() -> Self {
        Coloring::Global(Color::WHITE)
    }
}

impl fmt::Debug for Coloring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coloring::Global(c) => write!(f, "Coloring::Global({:?})", c),
            Coloring::Array(colors) => write!(f, "Coloring::Array(len={})", colors.len()),
            Coloring::Textured(img) => {
                write!(f, "Coloring::Textured({}x{})", img.width, img.height)
            }
            other => write!(f, "Coloring::{:?}", other.mode()),
        }
    }
}

/// Data-free tag of a [`Coloring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColoringMode {
    Global,
    OutputFunction,
    Textured,
    Array,
    InputFunction,
}

/// Rows follow [`ColoringMode`], columns follow [`SurfaceKind`].
const COLORING_LEGALITY: [[bool; 4]; 5] = [
    // Explicit, Spherical, Parametric, Implicit
    [true, true, true, true],    // Global
    [true, true, true, true],    // OutputFunction
    [true, true, true, false],   // Textured
    [true, false, true, false],  // Array
    [true, false, true, false],  // InputFunction
];

impl ColoringMode {
    pub fn is_allowed_for(self, kind: SurfaceKind) -> bool {
        COLORING_LEGALITY[self as usize][kind.column()]
    }

    /// Texture addressing used by textured coloring on `kind`.
    pub fn texture_kind(kind: SurfaceKind) -> Option<TextureKind> {
        match kind {
            SurfaceKind::Explicit | SurfaceKind::Parametric => Some(TextureKind::Planar),
            SurfaceKind::Spherical => Some(TextureKind::Cubemap),
            SurfaceKind::Implicit => None,
        }
    }

    /// Whether vertices carry a per-vertex color.
    pub fn has_vertex_color(self) -> bool {
        matches!(
            self,
            ColoringMode::Array | ColoringMode::InputFunction | ColoringMode::OutputFunction
        )
    }
}

impl fmt::Display for ColoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColoringMode::Global => "global",
            ColoringMode::OutputFunction => "output_function",
            ColoringMode::Textured => "textured",
            ColoringMode::Array => "array",
            ColoringMode::InputFunction => "input_function",
        };
        f.write_str(name)
    }
}
