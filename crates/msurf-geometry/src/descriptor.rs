//! Complete description of a surface and its eager validation.

use msurf_core::{Result, SurfaceError, Validate};
use msurf_math::ParamRange;

use crate::coloring::{Coloring, ColoringMode};
use crate::functions::{Shape, SurfaceKind};
use crate::normals::NormalComputation;
use crate::options::SurfaceOptions;

/// Configuration consumed once by surface initialization.
///
/// `kind` selects the generation strategy and `shape` must hold a function of
/// that kind. A descriptor without a shape, or with a shape of another kind,
/// fails validation.
#[derive(Debug)]
pub struct SurfaceDescriptor {
    pub kind: SurfaceKind,
    pub shape: Option<Shape>,
    pub coloring: Coloring,
    pub normals: NormalComputation,
    pub options: SurfaceOptions,
}

impl SurfaceDescriptor {
    /// Descriptor of `kind` with no function attached yet.
    pub fn new(kind: SurfaceKind) -> Self {
        Self {
            kind,
            shape: None,
            coloring: Coloring::default(),
            normals: NormalComputation::default(),
            options: SurfaceOptions::default(),
        }
    }

    /// Descriptor whose kind is taken from `shape`.
    pub fn from_shape(shape: Shape) -> Self {
        let mut desc = Self::new(shape.kind());
        desc.shape = Some(shape);
        desc
    }

    pub fn with_coloring(mut self, coloring: Coloring) -> Self {
        self.coloring = coloring;
        self
    }

    pub fn with_normals(mut self, normals: NormalComputation) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_options(mut self, options: SurfaceOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the ranges a generation run will use for this kind.
    pub fn validate_ranges(&self, u: ParamRange, v: ParamRange, w: ParamRange) -> Result<()> {
        let named: Vec<(&str, ParamRange)> = match self.kind {
            SurfaceKind::Explicit | SurfaceKind::Parametric => vec![("range_u", u), ("range_v", v)],
            SurfaceKind::Implicit => vec![("range_u", u), ("range_v", v), ("range_w", w)],
            SurfaceKind::Spherical => Vec::new(),
        };
        for (name, range) in named {
            if !range.is_valid() {
                return Err(SurfaceError::config(format!(
                    "{} must be finite with min < max, got ({}, {})",
                    name, range.min, range.max
                )));
            }
        }
        Ok(())
    }

    fn validate_shape(&self) -> Result<()> {
        match &self.shape {
            None => Err(SurfaceError::config(format!(
                "{} surface has no generation function",
                self.kind
            ))),
            Some(shape) if shape.kind() != self.kind => Err(SurfaceError::config(format!(
                "{} surface was given a {} generation function",
                self.kind,
                shape.kind()
            ))),
            Some(_) => Ok(()),
        }
    }

    fn validate_grid(&self) -> Result<()> {
        if !self.kind.is_grid() {
            return Ok(());
        }
        let opts = &self.options;
        if opts.num_u < 2 || opts.num_v < 2 {
            return Err(SurfaceError::config(format!(
                "grid resolution must be at least 2x2, got {}x{}",
                opts.num_u, opts.num_v
            )));
        }
        Ok(())
    }

    fn validate_implicit(&self) -> Result<()> {
        if self.kind != SurfaceKind::Implicit {
            return Ok(());
        }
        let opts = &self.options;
        if opts.max_refinements < 1 {
            return Err(SurfaceError::config("max_refinements must be at least 1"));
        }
        if opts.refinements.len() < opts.max_refinements as usize {
            return Err(SurfaceError::config(format!(
                "max_refinements is {} but only {} refinements are specified",
                opts.max_refinements,
                opts.refinements.len()
            )));
        }
        if let Some(depth) = opts.active_refinements().iter().position(|&r| r < 1) {
            return Err(SurfaceError::config(format!(
                "refinement at depth {} must be at least 1",
                depth
            )));
        }
        Ok(())
    }

    fn validate_coloring(&self) -> Result<()> {
        let mode = self.coloring.mode();
        if !mode.is_allowed_for(self.kind) {
            return Err(SurfaceError::config(format!(
                "{} coloring is not supported on {} surfaces",
                mode, self.kind
            )));
        }
        match &self.coloring {
            Coloring::Array(colors) if colors.len() != self.options.grid_len() => {
                Err(SurfaceError::config(format!(
                    "color array has {} entries, grid has {}",
                    colors.len(),
                    self.options.grid_len()
                )))
            }
            Coloring::Textured(image) => match ColoringMode::texture_kind(self.kind) {
                Some(kind) => image.check_for(kind),
                None => Err(SurfaceError::config(format!(
                    "textured coloring is not supported on {} surfaces",
                    self.kind
                ))),
            },
            _ => Ok(()),
        }
    }

    fn validate_normals(&self) -> Result<()> {
        if !self.options.enable_illuminated {
            return Ok(());
        }
        let mode = self.normals.mode();
        if !mode.is_allowed_for(self.kind) {
            return Err(SurfaceError::config(format!(
                "{:?} normals are not supported on {} surfaces",
                mode, self.kind
            )));
        }
        if matches!(self.normals, NormalComputation::Derivative) {
            let delta = self.options.delta_value;
            if delta <= 0.0 || !delta.is_finite() {
                return Err(SurfaceError::config(format!(
                    "derivative normals need a positive finite delta_value, got {}",
                    delta
                )));
            }
        }
        Ok(())
    }
}

impl Validate for SurfaceDescriptor {
    fn validate(&self) -> Result<()> {
        self.validate_shape()?;
        self.validate_grid()?;
        self.validate_ranges(
            self.options.range_u,
            self.options.range_v,
            self.options.range_w,
        )?;
        self.validate_implicit()?;
        self.validate_coloring()?;
        self.validate_normals()
    }
}
