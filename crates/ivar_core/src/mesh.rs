//! Triangle mesh input.
//!
//! A `TriangleMesh` is an indexed triangle soup with its bounds. It can be
//! populated from a Wavefront OBJ file and handed to the renderer as a list
//! of vertex triples.

use std::path::Path;

use ivar_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur while building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ file '{path}': {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("Face index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// An indexed triangle mesh.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box; `None` when there are no vertices
    pub bounds: Option<Aabb>,
}

impl TriangleMesh {
    /// Create a mesh from positions and triangle indices.
    ///
    /// Every index must refer to an existing vertex.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> MeshResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        let bounds = Aabb::enclosing(positions.iter().copied());
        Ok(Self {
            positions,
            indices,
            bounds,
        })
    }

    /// Load every model of an OBJ file into a single mesh.
    ///
    /// Polygons are triangulated on load; normals and texture coordinates
    /// are ignored.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let base = positions.len() as u32;
            positions.extend(
                model
                    .mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
            indices.extend(model.mesh.indices.iter().map(|i| i + base));
        }

        let mesh = Self::new(positions, indices)?;
        log::info!(
            "Loaded {} triangles, {} vertices from {} model(s) in {}",
            mesh.triangle_count(),
            mesh.vertex_count(),
            models.len(),
            path.display()
        );
        Ok(mesh)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Triangle vertex triples, in index order.
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|face| {
                [
                    self.positions[face[0] as usize],
                    self.positions[face[1] as usize],
                    self.positions[face[2] as usize],
                ]
            })
            .collect()
    }
}
