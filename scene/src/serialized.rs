//! First-encounter registries that turn the scene's handle graph into dense
//! file indices.
//!
//! The traversal runs over instances, then each instance's object, then the
//! object's meshes, then each mesh's material, then the material's color and
//! alpha textures. Every distinct handle gets the next free index the first
//! time it is seen, so running the traversal twice on an unchanged scene
//! produces the same numbering.

use std::collections::HashMap;
use std::hash::Hash;

use super::material::MaterialId;
use super::mesh::MeshId;
use super::object::ObjectId;
use super::texture::TextureId;
use super::Scene;

/// Assigns dense indices to keys in the order they are first added.
#[derive(Debug, Clone)]
pub struct Serialized<K> {
    list: Vec<K>,
    known: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> Serialized<K> {
    pub fn new() -> Self {
        Self {
            list: Vec::new(),
            known: HashMap::new(),
        }
    }

    /// Registers `key` if needed and returns its index.
    pub fn add(&mut self, key: K) -> usize {
        if let Some(&id) = self.known.get(&key) {
            return id;
        }
        let id = self.list.len();
        self.list.push(key);
        self.known.insert(key, id);
        id
    }

    /// Registers `key` and reports whether it had been registered before.
    pub fn add_was_known(&mut self, key: K) -> bool {
        if self.was_known(key) {
            return true;
        }
        self.add(key);
        false
    }

    pub fn was_known(&self, key: K) -> bool {
        self.known.contains_key(&key)
    }

    /// Index of `key`, or `None` if it was never registered.
    pub fn get_id(&self, key: K) -> Option<usize> {
        self.known.get(&key).copied()
    }

    /// Key registered at `id`.
    pub fn get(&self, id: usize) -> Option<K> {
        self.list.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Keys in index order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.list.iter().copied()
    }

    pub fn list(&self) -> &[K] {
        &self.list
    }
}

impl<K: Copy + Eq + Hash> Default for Serialized<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// File-index tables for every shared entity reachable from a scene's instances.
///
/// Slot 0 of the texture table is always the "no texture" entry, so a material
/// without textures still encodes a well-defined texture index.
#[derive(Debug, Clone)]
pub struct SerializedScene {
    pub textures: Serialized<Option<TextureId>>,
    pub materials: Serialized<MaterialId>,
    pub objects: Serialized<ObjectId>,
    pub meshes: Serialized<MeshId>,
}

impl SerializedScene {
    /// Walks the scene once and numbers every entity it reaches.
    ///
    /// Handles that do not resolve in the scene are still numbered but not
    /// descended into; the codec reports them before writing anything.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut textures = Serialized::new();
        textures.add(None);
        let mut serialized = Self {
            textures,
            materials: Serialized::new(),
            objects: Serialized::new(),
            meshes: Serialized::new(),
        };

        for instance in scene.present_instances() {
            let Some(object_id) = instance.object else {
                continue;
            };
            if serialized.objects.add_was_known(object_id) {
                continue;
            }
            let Some(object) = scene.get_object(object_id) else {
                continue;
            };

            for mesh_id in object.present_meshes() {
                if serialized.meshes.add_was_known(mesh_id) {
                    continue;
                }
                let Some(mesh) = scene.get_mesh(mesh_id) else {
                    continue;
                };
                if serialized.materials.add_was_known(mesh.material) {
                    continue;
                }
                let Some(material) = scene.get_material(mesh.material) else {
                    continue;
                };
                for texture in material.textures().into_iter().flatten() {
                    serialized.textures.add(Some(texture));
                }
            }
        }

        log::debug!(
            "Registered {} objects, {} meshes, {} materials, {} textures",
            serialized.objects.len(),
            serialized.meshes.len(),
            serialized.materials.len(),
            serialized.textures.len() - 1
        );

        serialized
    }

    /// File index of a texture reference; `None` maps to the reserved slot 0.
    pub fn texture_id(&self, texture: Option<TextureId>) -> Option<usize> {
        self.textures.get_id(texture)
    }

    pub fn material_id(&self, material: MaterialId) -> Option<usize> {
        self.materials.get_id(material)
    }

    pub fn mesh_id(&self, mesh: MeshId) -> Option<usize> {
        self.meshes.get_id(mesh)
    }

    pub fn object_id(&self, object: ObjectId) -> Option<usize> {
        self.objects.get_id(object)
    }
}
