//! Render-state bindings a surface registers with the drawing pipeline.

use std::fmt;

use msurf_geometry::{ColoringMode, SurfaceDescriptor, TextureKind};
use serde::{Deserialize, Serialize};

use crate::pipeline::VertexLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    Opaque,
    Additive,
    AlphaBlend,
    /// Weighted blended order-independent transparency.
    OitWeighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    TriangleList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterizerState {
    pub double_sided: bool,
    pub wireframe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplerFilter {
    Point,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressMode {
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplerDesc {
    pub filter: SamplerFilter,
    pub address: AddressMode,
}

impl SamplerDesc {
    pub fn new(filter: SamplerFilter) -> Self {
        Self {
            filter,
            address: AddressMode::Clamp,
        }
    }
}

/// Everything that picks a shader pair. Two surfaces with equal keys draw
/// with the same shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderKey {
    pub coloring: ColoringMode,
    pub texture: Option<TextureKind>,
    pub illuminated: bool,
    pub transparent: bool,
}

impl ShaderKey {
    pub fn for_descriptor(desc: &SurfaceDescriptor) -> Self {
        let coloring = desc.coloring.mode();
        let texture = match coloring {
            ColoringMode::Textured => ColoringMode::texture_kind(desc.kind),
            _ => None,
        };
        Self {
            coloring,
            texture,
            illuminated: desc.options.enable_illuminated,
            transparent: desc.options.enable_transparency,
        }
    }

    fn color_stem(&self) -> &'static str {
        match (self.coloring, self.texture) {
            (ColoringMode::Global, _) => "global",
            (ColoringMode::Textured, Some(TextureKind::Cubemap)) => "cubemap",
            (ColoringMode::Textured, _) => "texture",
            // array, input and output functions all end up as a vertex color
            _ => "vertex_color",
        }
    }

    pub fn vertex_shader(&self) -> String {
        let light = if self.illuminated { "lit" } else { "unlit" };
        format!("surface_{}_{}_vs", self.color_stem(), light)
    }

    pub fn pixel_shader(&self) -> String {
        let light = if self.illuminated { "lit" } else { "unlit" };
        let target = if self.transparent { "oit" } else { "opaque" };
        format!("surface_{}_{}_{}_ps", self.color_stem(), light, target)
    }
}

impl fmt::Display for ShaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.vertex_shader(), self.pixel_shader())
    }
}

/// The full set of state objects a surface is drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderBindings {
    pub shaders: ShaderKey,
    pub layout: VertexLayout,
    pub topology: Topology,
    pub blend: BlendMode,
    pub rasterizer: RasterizerState,
    /// Only textured surfaces sample.
    pub sampler: Option<SamplerDesc>,
}

impl RenderBindings {
    pub fn for_descriptor(desc: &SurfaceDescriptor) -> Self {
        let opts = &desc.options;
        let blend = if opts.enable_transparency {
            BlendMode::OitWeighted
        } else {
            BlendMode::Opaque
        };
        let sampler = (desc.coloring.mode() == ColoringMode::Textured).then(|| {
            SamplerDesc::new(if opts.pixelated_texture {
                SamplerFilter::Point
            } else {
                SamplerFilter::Linear
            })
        });
        Self {
            shaders: ShaderKey::for_descriptor(desc),
            layout: VertexLayout::for_descriptor(desc),
            topology: Topology::TriangleList,
            blend,
            rasterizer: RasterizerState {
                double_sided: opts.double_sided_rendering,
                wireframe: opts.wire_frame_topology,
            },
            sampler,
        }
    }
}
