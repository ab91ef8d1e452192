use mini_common::Vec3f;

use super::texture::TextureId;

/// Default base color for surfaces that come without one.
pub const DEFAULT_BASE_COLOR: Vec3f = Vec3f::splat(0.5);
/// Default index of refraction.
pub const DEFAULT_IOR: f32 = 1.45;

/// Unique identifier for materials.
///
/// Material IDs are assigned sequentially by the Scene starting from 0.
pub type MaterialId = u32;

/// A Disney-style material that can represent metallic, plastic and
/// dielectric surfaces.
///
/// A material may be shared by any number of meshes; sharing is expressed by
/// several meshes holding the same [`MaterialId`].
///
/// # Examples
///
/// ```
/// use mini_scene::{Material, Scene};
/// use mini_common::Vec3f;
///
/// let material = Material::new()
///     .with_base_color(Vec3f::new(0.8, 0.1, 0.1))
///     .with_roughness(0.3);
///
/// let mut scene = Scene::new();
/// let mat_id = scene.add_material(material);
/// assert!(scene.materials.contains_key(&mat_id));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub emission: Vec3f,
    pub base_color: Vec3f,
    pub metallic: f32,
    pub roughness: f32,
    pub transmission: f32,
    pub ior: f32,

    /// Replaces `base_color` when present.
    pub color_texture: Option<TextureId>,
    /// The `w` channel of this texture replaces `transmission` when present.
    /// May be the same texture as `color_texture`.
    pub alpha_texture: Option<TextureId>,
}

impl Material {
    /// Create a new material with default values.
    ///
    /// Defaults: no emission, grey base color, metallic=0, roughness=0,
    /// transmission=0, ior=1.45, no textures.
    pub fn new() -> Self {
        Self {
            emission: Vec3f::ZERO,
            base_color: DEFAULT_BASE_COLOR,
            metallic: 0.0,
            roughness: 0.0,
            transmission: 0.0,
            ior: DEFAULT_IOR,
            color_texture: None,
            alpha_texture: None,
        }
    }

    pub fn with_emission(mut self, emission: Vec3f) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_base_color(mut self, base_color: Vec3f) -> Self {
        self.base_color = base_color;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_transmission(mut self, transmission: f32) -> Self {
        self.transmission = transmission;
        self
    }

    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }

    pub fn with_color_texture(mut self, texture: TextureId) -> Self {
        self.color_texture = Some(texture);
        self
    }

    pub fn with_alpha_texture(mut self, texture: TextureId) -> Self {
        self.alpha_texture = Some(texture);
        self
    }

    /// Whether any emission channel is non-zero.
    pub fn is_emissive(&self) -> bool {
        self.emission.max_component() != 0.0
    }

    /// The textures this material references, color before alpha.
    pub fn textures(&self) -> [Option<TextureId>; 2] {
        [self.color_texture, self.alpha_texture]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults() {
        let material = Material::new();

        assert_eq!(material.emission, Vec3f::ZERO);
        assert_eq!(material.base_color, Vec3f::new(0.5, 0.5, 0.5));
        assert_eq!(material.metallic, 0.0);
        assert_eq!(material.roughness, 0.0);
        assert_eq!(material.transmission, 0.0);
        assert_eq!(material.ior, 1.45);
        assert_eq!(material.textures(), [None, None]);
    }

    #[test]
    fn test_material_builder() {
        let material = Material::new()
            .with_metallic(1.0)
            .with_roughness(0.25)
            .with_transmission(0.5)
            .with_ior(1.5)
            .with_color_texture(3)
            .with_alpha_texture(3);

        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.25);
        assert_eq!(material.transmission, 0.5);
        assert_eq!(material.ior, 1.5);
        assert_eq!(material.textures(), [Some(3), Some(3)]);
    }

    #[test]
    fn test_is_emissive() {
        assert!(!Material::new().is_emissive());
        assert!(Material::new().with_emission(Vec3f::new(0.0, 2.0, 0.0)).is_emissive());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Material::new().with_roughness(0.1);
        let mut copy = original.clone();
        copy.roughness = 0.9;

        assert_eq!(original.roughness, 0.1);
        assert_ne!(original, copy);
    }
}
