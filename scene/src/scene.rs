use std::collections::HashMap;

use mini_common::Aabb;
use rayon::prelude::*;

pub mod environment;
pub mod instance;
mod merge;

use self::environment::EnvMapLight;
use self::instance::Instance;
use super::light::{DirLight, QuadLight};
use super::material::{Material, MaterialId};
use super::mesh::{Mesh, MeshId};
use super::object::{Object, ObjectId};
use super::texture::{Texture, TextureId};

/// The scene container: arenas for textures, materials, meshes and objects,
/// the instance list, and the light sources.
///
/// Entities reference each other through IDs handed out by the `add_*`
/// methods, so sharing a material between meshes (or an object between
/// instances) is just storing the same ID twice. Dropping the scene drops
/// everything it owns.
///
/// # Examples
///
/// ```
/// use mini_scene::{Scene, Mesh, Material, Object, Instance};
/// use mini_common::{Affine3f, Vec3f, Vec3i};
///
/// let mut scene = Scene::new();
/// let material = scene.add_material(Material::new());
/// let mesh = scene.add_mesh(Mesh::from_triangles(
///     vec![Vec3f::new(0.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0), Vec3f::new(0.0, 1.0, 0.0)],
///     vec![Vec3i::new(0, 1, 2)],
///     material,
/// ));
/// let object = scene.add_object(Object::from_meshes([mesh]));
/// scene.add_instance(Instance::new(object, Affine3f::IDENTITY));
///
/// assert_eq!(scene.instances.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub textures: HashMap<TextureId, Texture>,
    pub materials: HashMap<MaterialId, Material>,
    pub meshes: HashMap<MeshId, Mesh>,
    pub objects: HashMap<ObjectId, Object>,

    /// Instance slots; `None` entries keep global instance indices stable
    /// across partial copies of a scene.
    pub instances: Vec<Option<Instance>>,

    pub quad_lights: Vec<QuadLight>,
    pub dir_lights: Vec<DirLight>,
    pub env_map_light: Option<EnvMapLight>,

    next_texture_id: TextureId,
    next_material_id: MaterialId,
    next_mesh_id: MeshId,
    next_object_id: ObjectId,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Texture API ==========

    /// Adds a texture to the scene and returns its ID.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(id, texture);
        id
    }

    pub fn get_texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    pub fn get_texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(&id)
    }

    // ========== Material API ==========

    /// Adds a material to the scene and returns its ID.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = self.next_material_id;
        self.next_material_id += 1;
        self.materials.insert(id, material);
        id
    }

    pub fn get_material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn get_material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    // ========== Mesh API ==========

    /// Adds a mesh to the scene and returns its ID.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = self.next_mesh_id;
        self.next_mesh_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    pub fn get_mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn get_mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    // ========== Object API ==========

    /// Adds an object to the scene and returns its ID.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id += 1;
        self.objects.insert(id, object);
        id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    // ========== Instance API ==========

    /// Appends an instance and returns its slot index.
    pub fn add_instance(&mut self, instance: Instance) -> usize {
        self.instances.push(Some(instance));
        self.instances.len() - 1
    }

    /// Appends an empty instance slot and returns its index.
    pub fn add_null_instance(&mut self) -> usize {
        self.instances.push(None);
        self.instances.len() - 1
    }

    /// Instances present in this copy of the scene, in slot order.
    pub fn present_instances(&self) -> impl Iterator<Item = &Instance> + '_ {
        self.instances.iter().flatten()
    }

    /// True if the scene has no instance slots and no lights.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
            && self.quad_lights.is_empty()
            && self.dir_lights.is_empty()
            && self.env_map_light.is_none()
    }

    // ========== Bounds ==========

    /// Object-space bounding box of a mesh, or `None` if it is unknown or has no vertices.
    pub fn mesh_bounds(&self, id: MeshId) -> Option<Aabb> {
        self.get_mesh(id)?.bounds()
    }

    /// Object-space bounding box over the meshes present in an object.
    pub fn object_bounds(&self, id: ObjectId) -> Option<Aabb> {
        self.get_object(id)?
            .present_meshes()
            .filter_map(|mesh| self.mesh_bounds(mesh))
            .reduce(|a, b| a.merge(&b))
    }

    /// World-space bounding box of one instance.
    pub fn instance_bounds(&self, instance: &Instance) -> Option<Aabb> {
        let bounds = self.object_bounds(instance.object?)?;
        Some(instance.xfm.transform_aabb(&bounds))
    }

    /// World-space bounding box of the whole scene.
    ///
    /// Object boxes are computed once per object and instance boxes in
    /// parallel, so heavily instanced scenes do not re-scan shared geometry.
    /// Returns `None` if no instance contributes any geometry.
    pub fn bounds(&self) -> Option<Aabb> {
        let object_bounds: HashMap<ObjectId, Aabb> = self
            .objects
            .par_iter()
            .filter_map(|(&id, _)| self.object_bounds(id).map(|bounds| (id, bounds)))
            .collect();

        self.instances
            .par_iter()
            .flatten()
            .filter_map(|instance| {
                let bounds = object_bounds.get(&instance.object?)?;
                Some(instance.xfm.transform_aabb(bounds))
            })
            .reduce_with(|a, b| a.merge(&b))
    }
}
