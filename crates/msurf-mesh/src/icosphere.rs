//! Unit-sphere topology by repeated edge bisection of an icosahedron.
//!
//! Triangles are stored as three oriented edge references walking the
//! triangle counter-clockwise (seen from outside). Splitting an edge keeps
//! its index family: edge `e` becomes edges `2e` (first half) and `2e + 1`
//! (second half), so every triangle can find its half edges without a lookup.
//! Midpoints are not projected onto the sphere here; callers normalize each
//! vertex when they sample it.

use std::collections::HashMap;

use msurf_math::{Point3, Vector3};

/// Reference to an edge together with the direction it is walked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub edge: u32,
    /// Walk the edge from its second vertex to its first.
    pub reversed: bool,
}

impl EdgeRef {
    pub const fn forward(edge: u32) -> Self {
        Self {
            edge,
            reversed: false,
        }
    }

    pub const fn backward(edge: u32) -> Self {
        Self {
            edge,
            reversed: true,
        }
    }

    pub fn start(self, edges: &[[u32; 2]]) -> u32 {
        let [a, b] = edges[self.edge as usize];
        if self.reversed {
            b
        } else {
            a
        }
    }

    pub fn end(self, edges: &[[u32; 2]]) -> u32 {
        let [a, b] = edges[self.edge as usize];
        if self.reversed {
            a
        } else {
            b
        }
    }

    /// Half of the split edge that is walked first.
    fn first_half(self) -> Self {
        if self.reversed {
            Self::backward(2 * self.edge + 1)
        } else {
            Self::forward(2 * self.edge)
        }
    }

    /// Half of the split edge that is walked second.
    fn second_half(self) -> Self {
        if self.reversed {
            Self::backward(2 * self.edge)
        } else {
            Self::forward(2 * self.edge + 1)
        }
    }
}

/// Vertex, edge and triangle topology of a subdivided icosahedron.
#[derive(Debug, Clone)]
pub struct Icosphere {
    pub vertices: Vec<Point3>,
    pub edges: Vec<[u32; 2]>,
    pub faces: Vec<[EdgeRef; 3]>,
}

const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

impl Icosphere {
    /// The 12-vertex, 30-edge, 20-face icosahedron on golden-ratio coordinates.
    pub fn icosahedron() -> Self {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let vertices = vec![
            Point3::new(-1.0, phi, 0.0), Point3::new(1.0, phi, 0.0),
            Point3::new(-1.0, -phi, 0.0), Point3::new(1.0, -phi, 0.0),
            Point3::new(0.0, -1.0, phi), Point3::new(0.0, 1.0, phi),
            Point3::new(0.0, -1.0, -phi), Point3::new(0.0, 1.0, -phi),
            Point3::new(phi, 0.0, -1.0), Point3::new(phi, 0.0, 1.0),
            Point3::new(-phi, 0.0, -1.0), Point3::new(-phi, 0.0, 1.0),
        ];

        let mut edges: Vec<[u32; 2]> = Vec::with_capacity(30);
        let mut edge_lookup: HashMap<(u32, u32), u32> = HashMap::new();
        let mut faces = Vec::with_capacity(20);

        for tri in &ICOSAHEDRON_FACES {
            let mut refs = [EdgeRef::forward(0); 3];
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                let key = (a.min(b), a.max(b));
                refs[k] = match edge_lookup.get(&key) {
                    Some(&e) => EdgeRef {
                        edge: e,
                        reversed: edges[e as usize][0] != a,
                    },
                    None => {
                        let e = edges.len() as u32;
                        edges.push([a, b]);
                        edge_lookup.insert(key, e);
                        EdgeRef::forward(e)
                    }
                };
            }
            faces.push(refs);
        }

        Self {
            vertices,
            edges,
            faces,
        }
    }

    /// Icosahedron subdivided `depth` times.
    pub fn build(depth: u32) -> Self {
        let mut sphere = Self::icosahedron();
        for _ in 0..depth {
            sphere = sphere.subdivide();
        }
        sphere
    }

    /// Bisect every edge and split every triangle into four.
    pub fn subdivide(&self) -> Self {
        let mid_base = self.vertices.len() as u32;

        let mut vertices = Vec::with_capacity(self.vertices.len() + self.edges.len());
        vertices.extend_from_slice(&self.vertices);
        let mut edges = Vec::with_capacity(2 * self.edges.len() + 3 * self.faces.len());

        for (e, &[a, b]) in self.edges.iter().enumerate() {
            let m = mid_base + e as u32;
            vertices.push((self.vertices[a as usize] + self.vertices[b as usize]) * 0.5);
            edges.push([a, m]);
            edges.push([m, b]);
        }

        let mut faces = Vec::with_capacity(4 * self.faces.len());
        for &[r0, r1, r2] in &self.faces {
            let m01 = mid_base + r0.edge;
            let m12 = mid_base + r1.edge;
            let m20 = mid_base + r2.edge;

            let inner = edges.len() as u32;
            edges.push([m01, m12]);
            edges.push([m12, m20]);
            edges.push([m20, m01]);
            let (ea, eb, ec) = (inner, inner + 1, inner + 2);

            faces.push([r0.first_half(), EdgeRef::backward(ec), r2.second_half()]);
            faces.push([r1.first_half(), EdgeRef::backward(ea), r0.second_half()]);
            faces.push([r2.first_half(), EdgeRef::backward(eb), r1.second_half()]);
            faces.push([EdgeRef::forward(ea), EdgeRef::forward(eb), EdgeRef::forward(ec)]);
        }

        Self {
            vertices,
            edges,
            faces,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Triangles as vertex index triples, counter-clockwise from outside.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.faces
            .iter()
            .map(|refs| refs.map(|r| r.start(&self.edges)))
            .collect()
    }

    /// Flat index list of [`Icosphere::triangles`].
    pub fn indices(&self) -> Vec<u32> {
        self.triangles().into_iter().flatten().collect()
    }

    /// Vertices projected onto the unit sphere.
    pub fn unit_vertices(&self) -> Vec<Vector3> {
        self.vertices.iter().map(|v| v.normalize()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icosahedron_counts() {
        let ico = Icosphere::build(0);
        assert_eq!(ico.vertex_count(), 12);
        assert_eq!(ico.edge_count(), 30);
        assert_eq!(ico.triangle_count(), 20);
    }

    #[test]
    fn test_growth_recurrence() {
        let mut v = 12;
        let mut a = 30;
        let mut c = 20;
        for depth in 0..5 {
            let sphere = Icosphere::build(depth);
            assert_eq!(sphere.vertex_count(), v, "vertices at depth {}", depth);
            assert_eq!(sphere.edge_count(), a, "edges at depth {}", depth);
            assert_eq!(sphere.triangle_count(), c, "triangles at depth {}", depth);
            v += a;
            a *= 4;
            c *= 4;
        }
        assert_eq!(Icosphere::build(3).triangle_count(), 20 * 4usize.pow(3));
    }

    #[test]
    fn test_faces_are_closed_loops() {
        let sphere = Icosphere::build(2);
        for refs in &sphere.faces {
            for k in 0..3 {
                assert_eq!(
                    refs[k].end(&sphere.edges),
                    refs[(k + 1) % 3].start(&sphere.edges)
                );
            }
        }
    }

    #[test]
    fn test_every_edge_shared_by_two_faces() {
        let sphere = Icosphere::build(2);
        let mut uses = vec![0u32; sphere.edge_count()];
        for refs in &sphere.faces {
            for r in refs {
                uses[r.edge as usize] += 1;
            }
        }
        assert!(uses.iter().all(|&n| n == 2));
    }

    #[test]
    fn test_outward_winding() {
        let sphere = Icosphere::build(2);
        let unit = sphere.unit_vertices();
        for [a, b, c] in sphere.triangles() {
            let (pa, pb, pc) = (unit[a as usize], unit[b as usize], unit[c as usize]);
            let n = (pb - pa).cross(pc - pa);
            assert!(n.dot(pa + pb + pc) > 0.0);
        }
    }

    #[test]
    fn test_unit_vertices_on_sphere() {
        for v in Icosphere::build(3).unit_vertices() {
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
    }
}
