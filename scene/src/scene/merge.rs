use std::collections::HashMap;

use super::Scene;
use crate::format::{EntityKind, FormatError};
use crate::material::MaterialId;
use crate::mesh::MeshId;
use crate::object::ObjectId;
use crate::texture::TextureId;

/// Old-to-new handle tables for one merge.
#[derive(Default)]
struct HandleMap {
    textures: HashMap<TextureId, TextureId>,
    materials: HashMap<MaterialId, MaterialId>,
    meshes: HashMap<MeshId, MeshId>,
    objects: HashMap<ObjectId, ObjectId>,
}

/// Table keys in ascending order, so merged handles follow the source's creation order.
fn sorted_ids<T>(table: &HashMap<u32, T>) -> Vec<u32> {
    let mut ids: Vec<_> = table.keys().copied().collect();
    ids.sort_unstable();
    ids
}

impl Scene {
    /// Moves every entity of `other` into this scene.
    ///
    /// Textures, materials, meshes and objects get fresh handles here, and
    /// every reference inside `other` is rewritten to match, so whatever
    /// `other` shared stays shared. Instance slots (including empty ones)
    /// and lights are appended. The environment map of `other` is used only
    /// if this scene has none.
    ///
    /// Fails with [`FormatError::DanglingHandle`] if `other` references an
    /// entity it does not contain; this scene is left untouched in that case.
    pub fn merge(&mut self, other: Scene) -> Result<(), FormatError> {
        other.check_references()?;

        let mut map = HandleMap::default();
        let Scene {
            mut textures,
            mut materials,
            mut meshes,
            mut objects,
            instances,
            quad_lights,
            dir_lights,
            env_map_light,
            ..
        } = other;

        for id in sorted_ids(&textures) {
            if let Some(texture) = textures.remove(&id) {
                map.textures.insert(id, self.add_texture(texture));
            }
        }

        for id in sorted_ids(&materials) {
            if let Some(mut material) = materials.remove(&id) {
                material.color_texture = material.color_texture.and_then(|t| map.textures.get(&t).copied());
                material.alpha_texture = material.alpha_texture.and_then(|t| map.textures.get(&t).copied());
                map.materials.insert(id, self.add_material(material));
            }
        }

        for id in sorted_ids(&meshes) {
            if let Some(mut mesh) = meshes.remove(&id) {
                // Resolvable after check_references.
                mesh.material = map.materials[&mesh.material];
                map.meshes.insert(id, self.add_mesh(mesh));
            }
        }

        for id in sorted_ids(&objects) {
            if let Some(mut object) = objects.remove(&id) {
                for slot in object.meshes.iter_mut() {
                    *slot = slot.and_then(|mesh| map.meshes.get(&mesh).copied());
                }
                map.objects.insert(id, self.add_object(object));
            }
        }

        let merged_instances = instances.into_iter().map(|slot| {
            slot.map(|mut instance| {
                instance.object = instance.object.and_then(|o| map.objects.get(&o).copied());
                instance
            })
        });
        self.instances.extend(merged_instances);

        self.quad_lights.extend(quad_lights);
        self.dir_lights.extend(dir_lights);

        if let Some(incoming) = env_map_light {
            if self.env_map_light.is_some() {
                log::warn!("Both scenes have an environment map; keeping the first");
            } else {
                self.env_map_light = Some(incoming);
            }
        }

        log::debug!(
            "Merged {} texture(s), {} material(s), {} mesh(es), {} object(s)",
            map.textures.len(),
            map.materials.len(),
            map.meshes.len(),
            map.objects.len()
        );
        Ok(())
    }

    /// Every handle stored anywhere in the tables or instances resolves.
    fn check_references(&self) -> Result<(), FormatError> {
        for material in self.materials.values() {
            for id in material.textures().into_iter().flatten() {
                if !self.textures.contains_key(&id) {
                    return Err(FormatError::DanglingHandle { kind: EntityKind::Texture, id });
                }
            }
        }
        for mesh in self.meshes.values() {
            if !self.materials.contains_key(&mesh.material) {
                return Err(FormatError::DanglingHandle { kind: EntityKind::Material, id: mesh.material });
            }
        }
        for object in self.objects.values() {
            for id in object.present_meshes() {
                if !self.meshes.contains_key(&id) {
                    return Err(FormatError::DanglingHandle { kind: EntityKind::Mesh, id });
                }
            }
        }
        for id in self.present_instances().filter_map(|instance| instance.object) {
            if !self.objects.contains_key(&id) {
                return Err(FormatError::DanglingHandle { kind: EntityKind::Object, id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Affine3f, Vec2i, Vec3f, Vec3i};
    use crate::environment::EnvMapLight;
    use crate::instance::Instance;
    use crate::light::{DirLight, QuadLight};
    use crate::material::Material;
    use crate::mesh::Mesh;
    use crate::object::Object;
    use crate::texture::{Texture, TextureFormat};

    fn triangle(material: MaterialId) -> Mesh {
        Mesh::from_triangles(
            vec![Vec3f::new(0.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0), Vec3f::new(0.0, 1.0, 0.0)],
            vec![Vec3i::new(0, 1, 2)],
            material,
        )
    }

    fn texture(value: u8) -> Texture {
        Texture::new(Vec2i::new(1, 1), TextureFormat::RgbaUint8, vec![value; 4])
    }

    /// One textured material shared by two meshes; the object is instanced twice.
    fn shared_scene(tag: f32) -> Scene {
        let mut scene = Scene::new();
        let tex = scene.add_texture(texture(tag as u8));
        let material = scene.add_material(
            Material::new()
                .with_roughness(tag)
                .with_color_texture(tex)
                .with_alpha_texture(tex),
        );
        let a = scene.add_mesh(triangle(material));
        let b = scene.add_mesh(triangle(material));
        let object = scene.add_object(Object::new(vec![Some(a), None, Some(b)]));
        scene.add_instance(Instance::new(object, Affine3f::IDENTITY));
        scene.add_null_instance();
        scene.add_instance(Instance::new(object, Affine3f::from_scale(tag)));
        scene
    }

    #[test]
    fn test_merge_keeps_sharing_of_both_scenes() {
        let mut scene = shared_scene(1.0);
        scene.merge(shared_scene(2.0)).unwrap();

        assert_eq!(scene.textures.len(), 2);
        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.meshes.len(), 4);
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.instances.len(), 6);
        assert!(scene.instances[4].is_none());

        let first = scene.instances[0].unwrap().object.unwrap();
        let second = scene.instances[3].unwrap().object.unwrap();
        assert_ne!(first, second);
        assert_eq!(scene.instances[5].unwrap().object, Some(second));
        assert_eq!(scene.instances[5].unwrap().xfm, Affine3f::from_scale(2.0));

        let object = scene.get_object(second).unwrap();
        assert_eq!(object.meshes[1], None);
        let [a, b] = [object.meshes[0].unwrap(), object.meshes[2].unwrap()];
        let material = scene.get_mesh(a).unwrap().material;
        assert_eq!(scene.get_mesh(b).unwrap().material, material);

        let material = scene.get_material(material).unwrap();
        assert_eq!(material.roughness, 2.0);
        assert_eq!(material.color_texture, material.alpha_texture);
        let texture = scene.get_texture(material.color_texture.unwrap()).unwrap();
        assert_eq!(texture.data, vec![2; 4]);
    }

    #[test]
    fn test_merge_into_empty_scene_copies_everything() {
        let mut scene = Scene::new();
        scene.merge(shared_scene(3.0)).unwrap();

        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.instances.len(), 3);
        // Fresh handles start from zero.
        assert_eq!(scene.instances[0].unwrap().object, Some(0));
    }

    #[test]
    fn test_merge_appends_lights() {
        let mut scene = Scene::new();
        scene.dir_lights.push(DirLight::new(Vec3f::new(0.0, -1.0, 0.0), Vec3f::splat(1.0)));

        let mut other = Scene::new();
        other.dir_lights.push(DirLight::new(Vec3f::new(1.0, 0.0, 0.0), Vec3f::splat(2.0)));
        other.quad_lights.push(QuadLight::new(
            Vec3f::ZERO,
            Vec3f::new(1.0, 0.0, 0.0),
            Vec3f::new(0.0, 0.0, 1.0),
            Vec3f::splat(5.0),
        ));
        scene.merge(other).unwrap();

        assert_eq!(scene.dir_lights.len(), 2);
        assert_eq!(scene.dir_lights[1].radiance, Vec3f::splat(2.0));
        assert_eq!(scene.quad_lights.len(), 1);
    }

    #[test]
    fn test_merge_keeps_first_environment_map() {
        let mut scene = Scene::new();
        scene.merge(Scene::new()).unwrap();
        assert!(scene.env_map_light.is_none());

        let mut lit = Scene::new();
        lit.env_map_light = Some(EnvMapLight::new(texture(1)));
        scene.merge(lit).unwrap();
        assert_eq!(scene.env_map_light.as_ref().unwrap().texture.data, vec![1; 4]);

        let mut other = Scene::new();
        other.env_map_light = Some(EnvMapLight::new(texture(9)));
        scene.merge(other).unwrap();
        assert_eq!(scene.env_map_light.as_ref().unwrap().texture.data, vec![1; 4]);
    }

    #[test]
    fn test_merge_rejects_dangling_reference() {
        let mut scene = shared_scene(1.0);
        let before = scene.clone();

        let mut other = Scene::new();
        let mesh = other.add_mesh(triangle(42));
        let object = other.add_object(Object::from_meshes([mesh]));
        other.add_instance(Instance::new(object, Affine3f::IDENTITY));

        let err = scene.merge(other).unwrap_err();
        assert!(matches!(
            err,
            FormatError::DanglingHandle { kind: EntityKind::Material, id: 42 }
        ));
        assert_eq!(scene.instances, before.instances);
        assert_eq!(scene.meshes, before.meshes);
    }

    #[test]
    fn test_merged_scene_round_trips() {
        let mut scene = shared_scene(1.0);
        scene.merge(shared_scene(2.0)).unwrap();

        let loaded = Scene::from_bytes(&scene.to_bytes().unwrap()).unwrap();

        assert_eq!(loaded.instances.len(), 6);
        assert_eq!(loaded.objects.len(), 2);
        assert_eq!(loaded.materials.len(), 2);
        assert_eq!(loaded.textures.len(), 2);
    }
}
