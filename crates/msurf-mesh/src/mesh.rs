use msurf_math::{Aabb3, Color, Point2, Point3, Vector3};

/// Texture coordinates carried by the vertices of a textured surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TexCoords {
    #[default]
    None,
    /// `(u, v)` in `[0, 1]` for planar textures.
    Planar(Vec<Point2>),
    /// Unit lookup directions for cubemaps.
    Cubemap(Vec<Vector3>),
}

impl TexCoords {
    pub fn len(&self) -> usize {
        match self {
            TexCoords::None => 0,
            TexCoords::Planar(uvs) => uvs.len(),
            TexCoords::Cubemap(dirs) => dirs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// CPU-side vertex and index data of a surface.
///
/// `normals`, `colors` and `texcoords` are either empty or hold one entry per
/// position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedMesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub colors: Vec<Color>,
    pub texcoords: TexCoords,
    pub indices: Vec<u32>,
    /// Vertices whose normal came out as a zero vector and was left unnormalized.
    pub degenerate_normals: Vec<u32>,
}

impl GeneratedMesh {
    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Iterate triangles as vertex index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Compute the axis-aligned bounding box of all positions.
    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_points(&self.positions).unwrap_or(Aabb3::new(Point3::ZERO, Point3::ZERO))
    }
}
