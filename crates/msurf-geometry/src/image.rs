//! Decoded RGBA images handed to textured surfaces.

use msurf_core::{Result, SurfaceError};
use serde::{Deserialize, Serialize};

/// How a texture is addressed by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    /// 2D texture sampled with the grid's `(u, v)` coordinates.
    Planar,
    /// Six square faces sampled with a direction vector.
    Cubemap,
}

/// Row-major 8-bit RGBA pixels.
///
/// A cubemap stores its six faces stacked vertically, so its height is six
/// times its width.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::config("image dimensions must be non-zero"));
        }
        if pixels.len() != width as usize * height as usize {
            return Err(SurfaceError::config(format!(
                "image of {}x{} needs {} pixels, got {}",
                width,
                height,
                width as usize * height as usize,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Single-color image.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    /// Check the image shape against the way it will be sampled.
    pub fn check_for(&self, kind: TextureKind) -> Result<()> {
        if kind == TextureKind::Cubemap && self.height != self.width * 6 {
            return Err(SurfaceError::config(format!(
                "cubemap image must be N x 6N, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}
