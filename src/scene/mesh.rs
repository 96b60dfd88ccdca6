use crate::core::geometry::Vertex;
use crate::core::math::vector::NormalizeOrKeep;
use nalgebra::Vector3;

/// A collection of vertices and indices representing a 3D object.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// List of vertices.
    pub vertices: Vec<Vertex>,
    /// List of indices defining triangles (3 indices per triangle).
    /// The depth sorter reorders this in place.
    pub indices: Vec<u32>,
    /// Largest absolute coordinate over all vertices.
    pub max_size: f32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let max_size = extent(&vertices);
        Self {
            vertices,
            indices,
            max_size,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Replaces every normal with the normalized sum of the face normals around it.
    pub fn compute_smooth_normals(&mut self) {
        let smoothed = self.smoothed_normals();
        for (vertex, normal) in self.vertices.iter_mut().zip(smoothed) {
            vertex.normal = normal;
        }
    }

    /// Per-vertex normalized sum of the face normals around each vertex.
    ///
    /// Face normals are `(v2 - v1) x (v3 - v1)` and are left unnormalized before
    /// summing, so larger faces pull harder. A vertex used by no triangle gets a
    /// zero normal.
    pub fn smoothed_normals(&self) -> Vec<Vector3<f32>> {
        let mut sums = vec![Vector3::<f32>::zeros(); self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p1 = self.vertices[a].position;
            let p2 = self.vertices[b].position;
            let p3 = self.vertices[c].position;
            let face = (p2 - p1).cross(&(p3 - p1));
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }

        sums.into_iter().map(|sum| sum.normalize_or_keep()).collect()
    }

    /// Unit cube centred on the origin, outward faces CCW seen from outside.
    pub fn create_cube() -> Self {
        let corners = [
            (-1.0, -1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, 1.0, -1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        let vertices = corners
            .iter()
            .map(|&(x, y, z)| Vertex::at(x * 0.5, y * 0.5, z * 0.5))
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6,  4, 6, 7, // +z
            1, 0, 3,  1, 3, 2, // -z
            5, 1, 2,  5, 2, 6, // +x
            0, 4, 7,  0, 7, 3, // -x
            7, 6, 2,  7, 2, 3, // +y
            0, 1, 5,  0, 5, 4, // -y
        ];

        let mut mesh = Self::new(vertices, indices);
        mesh.compute_smooth_normals();
        mesh
    }
}

fn extent(vertices: &[Vertex]) -> f32 {
    vertices
        .iter()
        .flat_map(|v| [v.position.x, v.position.y, v.position.z])
        .fold(0.0f32, |acc, c| acc.max(c.abs()))
}
