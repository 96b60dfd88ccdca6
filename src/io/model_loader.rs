use crate::core::geometry::Vertex;
use crate::scene::mesh::Mesh;
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::fs;
use std::path::Path;
use std::str::SplitWhitespace;

/// Loads a mesh, choosing the format from the file extension (`.dat` or `.obj`).
pub fn load_model(path: &str) -> Result<Mesh, String> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        return Err(format!("File not found: {}", path));
    }

    let extension = path_obj
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("dat") => load_dat(path),
        Some("obj") => load_obj(path),
        other => Err(format!(
            "Unsupported model format '{}' for {}",
            other.unwrap_or(""),
            path
        )),
    }
}

/// Loads the plain-text `.dat` format:
///
/// ```text
/// <vertex count>
/// x y z          (one line per vertex)
/// <triangle count>
/// a b c          (one line per triangle, 1-based indices)
/// ```
///
/// Normals are generated by smoothing face normals over shared vertices.
pub fn load_dat(path: &str) -> Result<Mesh, String> {
    info!("Loading DAT file: {}", path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    let mesh = parse_dat(&content).map_err(|e| format!("Failed to parse '{}': {}", path, e))?;

    info!(
        "DAT loaded successfully. Vertices: {}, Triangles: {}, Extent: {:.3}",
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.max_size
    );
    Ok(mesh)
}

/// Parses `.dat` text. Tokens may be separated by any whitespace.
pub fn parse_dat(content: &str) -> Result<Mesh, String> {
    let mut tokens = Tokens::new(content);

    // Counts come from the file, so buffers grow with the data actually read
    let vertex_count: usize = tokens.next("vertex count")?;
    let mut vertices = Vec::new();
    for i in 0..vertex_count {
        let what = format!("coordinate of vertex {}", i + 1);
        let x: f32 = tokens.next(&what)?;
        let y: f32 = tokens.next(&what)?;
        let z: f32 = tokens.next(&what)?;
        vertices.push(Vertex::at(x, y, z));
    }

    let triangle_count: usize = tokens.next("triangle count")?;
    if triangle_count.checked_mul(3).is_none() {
        return Err(format!("Triangle count {} is too large", triangle_count));
    }
    let mut indices = Vec::new();
    for i in 0..triangle_count {
        for _ in 0..3 {
            let index: u32 = tokens.next(&format!("index of triangle {}", i + 1))?;
            if index == 0 || index as usize > vertex_count {
                return Err(format!(
                    "Triangle {} refers to vertex {}, but there are {} vertices",
                    i + 1,
                    index,
                    vertex_count
                ));
            }
            // The file counts from 1
            indices.push(index - 1);
        }
    }

    if tokens.has_more() {
        warn!("Ignoring trailing data after {} triangles", triangle_count);
    }

    let mut mesh = Mesh::new(vertices, indices);
    mesh.compute_smooth_normals();
    Ok(mesh)
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            inner: content.split_whitespace(),
        }
    }

    fn next<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, String> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| format!("Unexpected end of file, expected {}", what))?;
        token
            .parse()
            .map_err(|_| format!("Invalid {}: '{}'", what, token))
    }

    fn has_more(&mut self) -> bool {
        self.inner.clone().next().is_some()
    }
}

/// Loads an OBJ file and returns a unified Mesh.
///
/// All sub-models are merged. Sub-models without normals get smoothed ones; normals
/// supplied by the file are kept.
pub fn load_obj(path: &str) -> Result<Mesh, String> {
    info!("Loading OBJ file: {}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Important: Unifies indices for Position/Normal
        ..Default::default()
    };

    let (models, _materials) = tobj::load_obj(Path::new(path), &load_options)
        .map_err(|e| format!("Failed to load OBJ: {}", e))?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut index_offset = 0;
    // One flag per merged vertex: true where the file gave no normal
    let mut missing_normals = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let num_vertices = mesh.positions.len() / 3;

        let has_normals = mesh.normals.len() == mesh.positions.len();
        if !has_normals {
            warn!(
                "Mesh '{}' is missing normals. Generating smoothed normals.",
                model.name
            );
        }
        missing_normals.resize(missing_normals.len() + num_vertices, !has_normals);

        for i in 0..num_vertices {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vector3::zeros()
            };
            vertices.push(Vertex::new(position, normal));
        }

        // Merged meshes share one vertex list
        indices.extend(mesh.indices.iter().map(|index| index + index_offset));
        index_offset += num_vertices as u32;
    }

    let mut mesh = Mesh::new(vertices, indices);
    if missing_normals.contains(&true) {
        let smoothed = mesh.smoothed_normals();
        let generated = mesh.vertices.iter_mut().zip(smoothed).zip(missing_normals);
        for ((vertex, normal), missing) in generated {
            if missing {
                vertex.normal = normal;
            }
        }
    }

    info!(
        "OBJ loaded successfully. Total vertices: {}, Total indices: {}",
        mesh.vertices.len(),
        mesh.indices.len()
    );

    Ok(mesh)
}
