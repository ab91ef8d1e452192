//! Structural validation of a scene.
//!
//! [`lint`] walks everything reachable from the instance list. Broken
//! structure (dangling handles, out of range indices, empty geometry) is a
//! [`LintError`]; suspicious but loadable content is collected as
//! [`LintWarning`]s and logged.
//!
//! Empty instance slots, instances without an object and empty mesh slots
//! are legal and never reported.

use std::fmt;

use mini_common::Vec3i;
use thiserror::Error;

use super::format::EntityKind;
use super::material::{Material, MaterialId};
use super::mesh::{Mesh, MeshId};
use super::object::ObjectId;
use super::serialized::SerializedScene;
use super::texture::Texture;
use super::Scene;

/// Structural problems that make a scene unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LintError {
    #[error("{kind} handle {id} does not exist in the scene")]
    DanglingHandle { kind: EntityKind, id: u32 },

    #[error("object {0} has no mesh slots")]
    EmptyObject(ObjectId),

    #[error("mesh {0} has no vertices")]
    NoVertices(MeshId),

    #[error("mesh {0} has no indices")]
    NoIndices(MeshId),

    #[error("mesh {mesh} has negative vertex index {index}")]
    NegativeIndex { mesh: MeshId, index: i32 },

    #[error("mesh {mesh} references vertex {index}, but only has {count} {what}")]
    IndexOutOfRange {
        mesh: MeshId,
        index: i32,
        count: usize,
        what: &'static str,
    },
}

/// Content that loads fine but is probably not what the author intended.
#[derive(Debug, Clone, PartialEq)]
pub enum LintWarning {
    EmptyScene,
    NonFinite { location: String, count: usize },
    DegenerateTriangles { mesh: MeshId, count: usize },
    TextureSizeMismatch {
        location: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScene => write!(f, "suspicious: scene has no instances"),
            Self::NonFinite { location, count } => {
                write!(f, "{} non-finite entr{} in {}", count, if *count == 1 { "y" } else { "ies" }, location)
            }
            Self::DegenerateTriangles { mesh, count } => {
                write!(f, "{} degenerate triangle(s) in mesh {}", count, mesh)
            }
            Self::TextureSizeMismatch {
                location,
                expected,
                found,
            } => write!(
                f,
                "{} holds {} bytes, but its size and format need {}",
                location, found, expected
            ),
        }
    }
}

/// What a successful lint pass looked at and found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintReport {
    pub objects_checked: usize,
    pub meshes_checked: usize,
    pub triangles_checked: usize,
    pub warnings: Vec<LintWarning>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, warning: LintWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Warns if `count` entries at `location` hold NaN or infinity.
    fn check_finite(&mut self, location: impl Into<String>, count: usize) {
        if count > 0 {
            self.warn(LintWarning::NonFinite {
                location: location.into(),
                count,
            });
        }
    }
}

/// Checks a scene and returns the warnings found, or the first structural error.
pub fn lint(scene: &Scene) -> Result<LintReport, LintError> {
    let mut report = LintReport::default();

    if scene.instances.is_empty() {
        report.warn(LintWarning::EmptyScene);
    }
    for (index, instance) in scene.instances.iter().enumerate() {
        if let Some(instance) = instance {
            report.check_finite(
                format!("transform of instance {}", index),
                usize::from(!instance.xfm.is_finite()),
            );
        }
    }

    let serialized = SerializedScene::from_scene(scene);

    for id in serialized.objects.iter() {
        let object = scene
            .get_object(id)
            .ok_or(LintError::DanglingHandle { kind: EntityKind::Object, id })?;
        if object.meshes.is_empty() {
            return Err(LintError::EmptyObject(id));
        }
        report.objects_checked += 1;
    }

    for id in serialized.meshes.iter() {
        let mesh = scene
            .get_mesh(id)
            .ok_or(LintError::DanglingHandle { kind: EntityKind::Mesh, id })?;
        if scene.get_material(mesh.material).is_none() {
            return Err(LintError::DanglingHandle {
                kind: EntityKind::Material,
                id: mesh.material,
            });
        }
        lint_mesh(&mut report, id, mesh)?;
    }

    for id in serialized.materials.iter() {
        let material = scene
            .get_material(id)
            .ok_or(LintError::DanglingHandle { kind: EntityKind::Material, id })?;
        lint_material(&mut report, scene, id, material)?;
    }

    for id in serialized.textures.iter().flatten() {
        let texture = scene
            .get_texture(id)
            .ok_or(LintError::DanglingHandle { kind: EntityKind::Texture, id })?;
        lint_texture(&mut report, format!("texture {}", id), texture);
    }

    for (index, light) in scene.quad_lights.iter().enumerate() {
        report.check_finite(format!("quad light {}", index), usize::from(!light.is_finite()));
    }
    for (index, light) in scene.dir_lights.iter().enumerate() {
        report.check_finite(format!("directional light {}", index), usize::from(!light.is_finite()));
    }
    if let Some(env_map) = &scene.env_map_light {
        report.check_finite(
            "environment map transform",
            usize::from(!env_map.transform.is_finite()),
        );
        lint_texture(&mut report, "environment map texture".to_string(), &env_map.texture);
    }

    Ok(report)
}

fn check_index(mesh_id: MeshId, mesh: &Mesh, index: i32) -> Result<usize, LintError> {
    let vertex = usize::try_from(index).map_err(|_| LintError::NegativeIndex { mesh: mesh_id, index })?;

    let out_of_range = |count: usize, what: &'static str| LintError::IndexOutOfRange {
        mesh: mesh_id,
        index,
        count,
        what,
    };
    if vertex >= mesh.vertices.len() {
        return Err(out_of_range(mesh.vertices.len(), "vertices"));
    }
    if !mesh.normals.is_empty() && vertex >= mesh.normals.len() {
        return Err(out_of_range(mesh.normals.len(), "normals"));
    }
    if !mesh.texcoords.is_empty() && vertex >= mesh.texcoords.len() {
        return Err(out_of_range(mesh.texcoords.len(), "texcoords"));
    }
    Ok(vertex)
}

fn lint_mesh(report: &mut LintReport, id: MeshId, mesh: &Mesh) -> Result<(), LintError> {
    if mesh.vertices.is_empty() {
        return Err(LintError::NoVertices(id));
    }
    if mesh.indices.is_empty() {
        return Err(LintError::NoIndices(id));
    }

    let bad_vertices = mesh.vertices.iter().filter(|v| !v.is_finite()).count();
    let bad_normals = mesh.normals.iter().filter(|n| !n.is_finite()).count();
    let bad_texcoords = mesh.texcoords.iter().filter(|t| !t.is_finite()).count();
    report.check_finite(format!("vertices of mesh {}", id), bad_vertices);
    report.check_finite(format!("normals of mesh {}", id), bad_normals);
    report.check_finite(format!("texcoords of mesh {}", id), bad_texcoords);

    let mut degenerate = 0;
    for &Vec3i { x, y, z } in &mesh.indices {
        let a = mesh.vertices[check_index(id, mesh, x)?];
        let b = mesh.vertices[check_index(id, mesh, y)?];
        let c = mesh.vertices[check_index(id, mesh, z)?];
        if a == b || a == c || b == c {
            degenerate += 1;
        }
    }
    if degenerate > 0 {
        report.warn(LintWarning::DegenerateTriangles {
            mesh: id,
            count: degenerate,
        });
    }

    report.meshes_checked += 1;
    report.triangles_checked += mesh.indices.len();
    Ok(())
}

fn lint_material(
    report: &mut LintReport,
    scene: &Scene,
    id: MaterialId,
    material: &Material,
) -> Result<(), LintError> {
    let colors = [material.emission, material.base_color];
    let scalars = [
        material.metallic,
        material.roughness,
        material.transmission,
        material.ior,
    ];
    let bad_fields = colors.iter().filter(|c| !c.is_finite()).count()
        + scalars.iter().filter(|s| !s.is_finite()).count();
    report.check_finite(format!("material {}", id), bad_fields);

    for texture in material.textures().into_iter().flatten() {
        if scene.get_texture(texture).is_none() {
            return Err(LintError::DanglingHandle {
                kind: EntityKind::Texture,
                id: texture,
            });
        }
    }
    Ok(())
}

fn lint_texture(report: &mut LintReport, location: String, texture: &Texture) {
    if let Some(expected) = texture.expected_data_len() {
        if expected != texture.data.len() {
            report.warn(LintWarning::TextureSizeMismatch {
                location,
                expected,
                found: texture.data.len(),
            });
        }
    }
}
