use cgmath::Point3;
use mini_common::{Aabb, Vec2f, Vec3f, Vec3i};

use super::material::MaterialId;

/// Unique identifier for a mesh in the scene.
pub type MeshId = u32;

/// A triangle mesh.
///
/// `normals` and `texcoords` are either empty or hold one entry per vertex.
/// Every component of every triangle in `indices` is a vertex index in
/// `0..vertices.len()`; [`crate::lint`] checks this.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3f>,
    pub normals: Vec<Vec3f>,
    pub texcoords: Vec<Vec2f>,
    pub indices: Vec<Vec3i>,
    /// Material applied to every triangle of this mesh.
    pub material: MaterialId,
}

impl Mesh {
    /// Creates an empty mesh using the given material.
    pub fn new(material: MaterialId) -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::new(),
            material,
        }
    }

    /// Creates a mesh from positions and triangles, without normals or texcoords.
    pub fn from_triangles(vertices: Vec<Vec3f>, indices: Vec<Vec3i>, material: MaterialId) -> Self {
        Self {
            vertices,
            indices,
            ..Self::new(material)
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3f>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_texcoords(mut self, texcoords: Vec<Vec2f>) -> Self {
        self.texcoords = texcoords;
        self
    }

    /// Number of triangles.
    pub fn num_prims(&self) -> usize {
        self.indices.len()
    }

    /// Bounding box over all vertices, or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|&v| Point3::from(v)))
    }
}
