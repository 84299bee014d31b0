use msurf_core::{Result, SurfaceError};
use msurf_geometry::{ColoringMode, SurfaceDescriptor, TextureKind};
use msurf_math::{Color, DMat4, Point3, SurfaceTransform};
use msurf_mesh::{GeneratedMesh, TexCoords};
use serde::{Deserialize, Serialize};

/// Vertex attribute meaning, named the way the shaders declare it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semantic {
    Position,
    Normal,
    Color,
    TexCoord,
}

impl Semantic {
    pub fn name(self) -> &'static str {
        match self {
            Semantic::Position => "Position",
            Semantic::Normal => "Normal",
            Semantic::Color => "Color",
            Semantic::TexCoord => "TexCoord",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Float2,
    Float3,
    Float4,
}

impl Format {
    pub fn components(self) -> usize {
        match self {
            Format::Float2 => 2,
            Format::Float3 => 3,
            Format::Float4 => 4,
        }
    }

    pub fn size(self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputElement {
    pub semantic: Semantic,
    pub format: Format,
}

impl InputElement {
    pub const fn new(semantic: Semantic, format: Format) -> Self {
        Self { semantic, format }
    }
}

/// Interleaved vertex layout, attributes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    pub elements: Vec<InputElement>,
}

impl VertexLayout {
    /// Position always; normal when lit; color for per-vertex coloring;
    /// texture coordinates for textured surfaces (a direction for cubemaps).
    pub fn for_descriptor(desc: &SurfaceDescriptor) -> Self {
        let mut elements = vec![InputElement::new(Semantic::Position, Format::Float3)];
        if desc.options.enable_illuminated {
            elements.push(InputElement::new(Semantic::Normal, Format::Float3));
        }
        let mode = desc.coloring.mode();
        if mode.has_vertex_color() {
            elements.push(InputElement::new(Semantic::Color, Format::Float4));
        }
        if mode == ColoringMode::Textured {
            let format = match ColoringMode::texture_kind(desc.kind) {
                Some(TextureKind::Cubemap) => Format::Float3,
                _ => Format::Float2,
            };
            elements.push(InputElement::new(Semantic::TexCoord, format));
        }
        Self { elements }
    }

    /// Bytes per vertex.
    pub fn stride(&self) -> usize {
        self.elements.iter().map(|e| e.format.size()).sum()
    }

    pub fn has(&self, semantic: Semantic) -> bool {
        self.elements.iter().any(|e| e.semantic == semantic)
    }

    /// Interleave the attributes of `mesh` as `f32`.
    pub fn pack(&self, mesh: &GeneratedMesh) -> Result<Vec<u8>> {
        let count = mesh.vertex_count();
        for element in &self.elements {
            let available = match element.semantic {
                Semantic::Position => mesh.positions.len(),
                Semantic::Normal => mesh.normals.len(),
                Semantic::Color => mesh.colors.len(),
                Semantic::TexCoord => mesh.texcoords.len(),
            };
            if available != count {
                return Err(SurfaceError::config(format!(
                    "{} attribute has {} entries for {} vertices",
                    element.semantic.name(),
                    available,
                    count
                )));
            }
        }

        let floats_per_vertex = self.stride() / std::mem::size_of::<f32>();
        let mut floats: Vec<f32> = Vec::with_capacity(count * floats_per_vertex);
        for i in 0..count {
            for element in &self.elements {
                match element.semantic {
                    Semantic::Position => push_vec3(&mut floats, mesh.positions[i]),
                    Semantic::Normal => push_vec3(&mut floats, mesh.normals[i]),
                    Semantic::Color => floats.extend_from_slice(&mesh.colors[i].to_array()),
                    Semantic::TexCoord => match &mesh.texcoords {
                        TexCoords::Planar(uvs) => {
                            floats.extend_from_slice(&[uvs[i].x as f32, uvs[i].y as f32])
                        }
                        TexCoords::Cubemap(dirs) => push_vec3(&mut floats, dirs[i]),
                        TexCoords::None => {}
                    },
                }
            }
        }
        Ok(bytemuck::cast_slice::<f32, u8>(&floats).to_vec())
    }
}

fn push_vec3(out: &mut Vec<f32>, v: Point3) {
    out.extend_from_slice(&v.as_vec3().to_array());
}

/// Model and normal matrices, column-major `f32`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_transform(transform: &SurfaceTransform) -> Self {
        let model = transform.to_mat4();
        // a flattening distortion has no inverse; fall back to the model matrix
        let normal = if model.determinant() == 0.0 {
            model
        } else {
            model.inverse().transpose()
        };
        Self {
            model: to_f32(model),
            normal: to_f32(normal),
        }
    }
}

fn to_f32(m: DMat4) -> [[f32; 4]; 4] {
    m.as_mat4().to_cols_array_2d()
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorUniform {
    pub color: [f32; 4],
}

impl From<Color> for ColorUniform {
    fn from(color: Color) -> Self {
        Self {
            color: color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use msurf_geometry::{shapes, Coloring, Image};
    use msurf_math::{DMat3, DQuat, Vector3};

    fn triangle() -> GeneratedMesh {
        GeneratedMesh {
            positions: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            normals: vec![Vector3::Z; 3],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_lit_global_layout() {
        let desc = SurfaceDescriptor::from_shape(shapes::paraboloid());
        let layout = VertexLayout::for_descriptor(&desc);
        assert_eq!(
            layout.elements,
            vec![
                InputElement::new(Semantic::Position, Format::Float3),
                InputElement::new(Semantic::Normal, Format::Float3),
            ]
        );
        assert_eq!(layout.stride(), 24);
    }

    #[test]
    fn test_vertex_color_and_texture_layouts() {
        let mut desc = SurfaceDescriptor::from_shape(shapes::paraboloid())
            .with_coloring(Coloring::output_function(|_, _, _| Color::WHITE));
        desc.options.enable_illuminated = false;
        let layout = VertexLayout::for_descriptor(&desc);
        assert!(layout.has(Semantic::Color));
        assert!(!layout.has(Semantic::Normal));
        assert_eq!(layout.stride(), 28);

        let sphere = SurfaceDescriptor::from_shape(shapes::sphere(1.0))
            .with_coloring(Coloring::Textured(Image::filled(1, 6, [0; 4])));
        let layout = VertexLayout::for_descriptor(&sphere);
        assert_eq!(
            layout.elements.last(),
            Some(&InputElement::new(Semantic::TexCoord, Format::Float3))
        );
    }

    #[test]
    fn test_pack_interleaves() {
        let desc = SurfaceDescriptor::from_shape(shapes::paraboloid());
        let layout = VertexLayout::for_descriptor(&desc);
        let bytes = layout.pack(&triangle()).unwrap();
        assert_eq!(bytes.len(), 3 * layout.stride());
        let f = floats(&bytes);
        assert_eq!(&f[6..12], &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pack_rejects_missing_attribute() {
        let desc = SurfaceDescriptor::from_shape(shapes::paraboloid());
        let layout = VertexLayout::for_descriptor(&desc);
        let mut mesh = triangle();
        mesh.normals.clear();
        assert!(layout.pack(&mesh).is_err());
    }

    #[test]
    fn test_transform_uniform() {
        let mut transform = SurfaceTransform::identity();
        transform.position = Vector3::new(1.0, 2.0, 3.0);
        transform.rotation = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let uniform = TransformUniform::from_transform(&transform);
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);
        // pure rotation: the normal matrix equals the rotation part
        assert_abs_diff_eq!(uniform.normal[0][1], 1.0, epsilon = 1e-6);

        transform.distortion = DMat3::from_diagonal(Vector3::new(1.0, 1.0, 0.0));
        let flat = TransformUniform::from_transform(&transform);
        assert_eq!(flat.normal, flat.model);
        assert_eq!(bytemuck::bytes_of(&flat).len(), 128);
    }
}
