//! Scene statistics.

use serde::Serialize;

use super::serialized::SerializedScene;
use super::texture::TextureFormat;
use super::Scene;

/// World-space bounds in a serializable shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub center: [f32; 3],
    /// Edge lengths of the box.
    pub extent: [f32; 3],
}

/// Counts gathered over everything reachable from a scene's instances.
///
/// "Unique" counts visit every distinct mesh once. "Actual" counts visit a
/// mesh once per instance that uses it, i.e. what a renderer would see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneStats {
    pub instance_slots: usize,
    pub instances: usize,
    pub objects: usize,

    pub unique_meshes: usize,
    pub unique_triangles: usize,
    pub unique_vertices: usize,

    pub actual_meshes: usize,
    pub actual_triangles: usize,
    pub actual_vertices: usize,
    pub actual_normals: usize,
    pub actual_texcoords: usize,

    pub textures: usize,
    pub ptex_textures: usize,
    pub image_textures: usize,
    pub ptex_bytes: usize,
    pub texel_bytes: usize,

    pub materials: usize,
    pub quad_lights: usize,
    pub dir_lights: usize,
    pub has_env_map: bool,
    /// Texel dimensions of the environment map texture.
    pub env_map_size: Option<[i32; 2]>,

    pub bounds: Option<Bounds>,
}

impl SceneStats {
    pub fn gather(scene: &Scene) -> Self {
        let serialized = SerializedScene::from_scene(scene);
        let mut stats = Self {
            instance_slots: scene.instances.len(),
            instances: scene.present_instances().count(),
            objects: serialized.objects.len(),
            materials: serialized.materials.len(),
            quad_lights: scene.quad_lights.len(),
            dir_lights: scene.dir_lights.len(),
            has_env_map: scene.env_map_light.is_some(),
            env_map_size: scene
                .env_map_light
                .as_ref()
                .map(|env| [env.texture.size.x, env.texture.size.y]),
            bounds: scene.bounds().map(|aabb| {
                let (width, height, depth) = aabb.size();
                Bounds {
                    min: aabb.min.into(),
                    max: aabb.max.into(),
                    center: aabb.center().into(),
                    extent: [width, height, depth],
                }
            }),
            ..Self::default()
        };

        for mesh in serialized.meshes.iter().filter_map(|id| scene.get_mesh(id)) {
            stats.unique_meshes += 1;
            stats.unique_triangles += mesh.indices.len();
            stats.unique_vertices += mesh.vertices.len();
        }

        let instanced_meshes = scene
            .present_instances()
            .filter_map(|instance| scene.get_object(instance.object?))
            .flat_map(|object| object.present_meshes())
            .filter_map(|id| scene.get_mesh(id));
        for mesh in instanced_meshes {
            stats.actual_meshes += 1;
            stats.actual_triangles += mesh.indices.len();
            stats.actual_vertices += mesh.vertices.len();
            stats.actual_normals += mesh.normals.len();
            stats.actual_texcoords += mesh.texcoords.len();
        }

        let textures = serialized
            .textures
            .iter()
            .flatten()
            .filter_map(|id| scene.get_texture(id));
        for texture in textures {
            stats.textures += 1;
            if texture.format == TextureFormat::EmbeddedPtex {
                stats.ptex_textures += 1;
                stats.ptex_bytes += texture.data.len();
            } else {
                stats.image_textures += 1;
                stats.texel_bytes += texture.data.len();
            }
        }

        stats
    }

    pub fn texture_bytes(&self) -> usize {
        self.ptex_bytes + self.texel_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnvMapLight, Instance, Material, Mesh, Object, Texture};
    use mini_common::{Affine3f, Vec2i, Vec3f, Vec3i};

    fn quad(material: u32) -> Mesh {
        Mesh::from_triangles(
            vec![
                Vec3f::new(0.0, 0.0, 0.0),
                Vec3f::new(1.0, 0.0, 0.0),
                Vec3f::new(1.0, 1.0, 0.0),
                Vec3f::new(0.0, 1.0, 0.0),
            ],
            vec![Vec3i::new(0, 1, 2), Vec3i::new(0, 2, 3)],
            material,
        )
        .with_normals(vec![Vec3f::new(0.0, 0.0, 1.0); 4])
    }

    #[test]
    fn test_empty_scene() {
        let stats = SceneStats::gather(&Scene::new());

        assert_eq!(stats, SceneStats::default());
        assert_eq!(stats.bounds, None);
    }

    #[test]
    fn test_unique_and_actual_counts() {
        let mut scene = Scene::new();
        let ptex = scene.add_texture(Texture::embedded_ptex(vec![0; 10]));
        let image = scene.add_texture(Texture::new(
            Vec2i::new(2, 2),
            TextureFormat::RgbaUint8,
            vec![0; 16],
        ));
        let material = scene.add_material(
            Material::new().with_color_texture(ptex).with_alpha_texture(image),
        );
        let mesh = scene.add_mesh(quad(material));
        let object = scene.add_object(Object::new(vec![Some(mesh), None]));
        scene.add_instance(Instance::new(object, Affine3f::IDENTITY));
        scene.add_instance(Instance::new(
            object,
            Affine3f::from_translation(Vec3f::new(4.0, 0.0, 0.0)),
        ));
        scene.add_null_instance();
        scene.env_map_light = Some(EnvMapLight::new(Texture::new(
            Vec2i::new(8, 4),
            TextureFormat::Float4,
            vec![0; 512],
        )));

        let stats = SceneStats::gather(&scene);

        assert_eq!(stats.instance_slots, 3);
        assert_eq!(stats.instances, 2);
        assert_eq!(stats.objects, 1);
        assert_eq!(stats.unique_meshes, 1);
        assert_eq!(stats.unique_triangles, 2);
        assert_eq!(stats.unique_vertices, 4);
        assert_eq!(stats.actual_meshes, 2);
        assert_eq!(stats.actual_triangles, 4);
        assert_eq!(stats.actual_normals, 8);
        assert_eq!(stats.actual_texcoords, 0);
        assert_eq!(stats.textures, 2);
        assert_eq!(stats.ptex_textures, 1);
        assert_eq!(stats.image_textures, 1);
        assert_eq!(stats.texture_bytes(), 26);
        assert_eq!(stats.materials, 1);
        assert!(stats.has_env_map);
        assert_eq!(stats.env_map_size, Some([8, 4]));
        assert_eq!(
            stats.bounds,
            Some(Bounds {
                min: [0.0, 0.0, 0.0],
                max: [5.0, 1.0, 0.0],
                center: [2.5, 0.5, 0.0],
                extent: [5.0, 1.0, 0.0],
            })
        );
    }
}
