//! Normal-computation policies and where each one is legal.

use std::fmt;

use msurf_math::Vector3;
use serde::{Deserialize, Serialize};

use crate::functions::{NormalInputFn, NormalOutputFn, SurfaceKind};

/// How per-vertex normals are produced on illuminated surfaces.
pub enum NormalComputation {
    /// Central differences of the generation function, step `delta_value`.
    Derivative,
    /// User function of the grid's input coordinates.
    InputFunction(NormalInputFn),
    /// User function of the generated position.
    OutputFunction(NormalOutputFn),
    /// Differences of neighboring grid vertices.
    ClosestNeighbors,
}

impl NormalComputation {
    pub fn input_function(f: impl Fn(f64, f64) -> Vector3 + Send + Sync + 'static) -> Self {
        NormalComputation::InputFunction(Box::new(f))
    }

    pub fn output_function(f: impl Fn(f64, f64, f64) -> Vector3 + Send + Sync + 'static) -> Self {
        NormalComputation::OutputFunction(Box::new(f))
    }

    pub fn mode(&self) -> NormalMode {
        match self {
            NormalComputation::Derivative => NormalMode::Derivative,
            NormalComputation::InputFunction(_) => NormalMode::InputFunction,
            NormalComputation::OutputFunction(_) => NormalMode::OutputFunction,
            NormalComputation::ClosestNeighbors => NormalMode::ClosestNeighbors,
        }
    }
}

impl Default for NormalComputation {
    fn default() -> Self {
        NormalComputation::Derivative
    }
}

impl fmt::Debug for NormalComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NormalComputation::{:?}", self.mode())
    }
}

/// Data-free tag of a [`NormalComputation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalMode {
    Derivative,
    InputFunction,
    OutputFunction,
    ClosestNeighbors,
}

/// Rows follow [`NormalMode`], columns follow [`SurfaceKind`].
const NORMAL_LEGALITY: [[bool; 4]; 4] = [
    // Explicit, Spherical, Parametric, Implicit
    [true, true, true, true],    // Derivative
    [true, false, true, false],  // InputFunction
    [true, true, true, true],    // OutputFunction
    [true, false, true, false],  // ClosestNeighbors
];

impl NormalMode {
    pub fn is_allowed_for(self, kind: SurfaceKind) -> bool {
        NORMAL_LEGALITY[self as usize][kind.column()]
    }
}
