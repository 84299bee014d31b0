//! Serializable numeric settings and feature toggles of a surface.

use std::path::Path;

use msurf_core::{Result, SurfaceError};
use msurf_math::ParamRange;
use serde::{Deserialize, Serialize};

/// Everything about a surface that is plain data. Missing JSON fields take
/// their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    pub range_u: ParamRange,
    pub range_v: ParamRange,
    /// Third axis of the implicit search box.
    pub range_w: ParamRange,
    pub num_u: usize,
    pub num_v: usize,
    pub border_points_included: bool,

    /// Subdivision count of the spherical base mesh.
    pub icosphere_depth: u32,

    /// Cells per axis at each recursion depth of the implicit search.
    pub refinements: Vec<u32>,
    pub max_refinements: u32,
    pub max_implicit_triangles: usize,

    /// Finite-difference step of derivative normals.
    pub delta_value: f64,

    pub enable_illuminated: bool,
    pub enable_transparency: bool,
    pub enable_updates: bool,
    pub double_sided_rendering: bool,
    pub wire_frame_topology: bool,
    pub pixelated_texture: bool,
    pub default_initial_lights: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            range_u: ParamRange::default(),
            range_v: ParamRange::default(),
            range_w: ParamRange::default(),
            num_u: 50,
            num_v: 50,
            border_points_included: true,
            icosphere_depth: 4,
            refinements: vec![20],
            max_refinements: 1,
            max_implicit_triangles: 100_000,
            delta_value: 1e-4,
            enable_illuminated: true,
            enable_transparency: false,
            enable_updates: false,
            double_sided_rendering: false,
            wire_frame_topology: false,
            pixelated_texture: false,
            default_initial_lights: true,
        }
    }
}

impl SurfaceOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SurfaceError::Parse(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SurfaceError::Parse(e.to_string()))
    }

    /// Read options from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Refinement factors actually used by the implicit search.
    pub fn active_refinements(&self) -> &[u32] {
        let n = (self.max_refinements as usize).min(self.refinements.len());
        &self.refinements[..n]
    }

    /// Number of samples on the `(u, v)` grid.
    pub fn grid_len(&self) -> usize {
        self.num_u * self.num_v
    }
}
