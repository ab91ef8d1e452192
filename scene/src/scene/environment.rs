use mini_common::Affine3f;

use crate::texture::Texture;

/// An environment light, typically a (HDR, `Float4`) scan of a sky dome.
///
/// The environment texture is owned here rather than shared through the
/// scene's texture table; scene files store it inline.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvMapLight {
    pub texture: Texture,
    /// Aligns the environment map with world space.
    pub transform: Affine3f,
}

impl EnvMapLight {
    pub fn new(texture: Texture) -> Self {
        Self {
            texture,
            transform: Affine3f::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Affine3f) -> Self {
        self.transform = transform;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureFormat;
    use mini_common::Vec2i;

    #[test]
    fn test_env_map_defaults_to_identity() {
        let texture = Texture::new(Vec2i::new(1, 1), TextureFormat::Float4, vec![0; 16]);
        let light = EnvMapLight::new(texture.clone());

        assert_eq!(light.transform, Affine3f::IDENTITY);
        assert_eq!(light.texture, texture);
    }

    #[test]
    fn test_with_transform() {
        let light = EnvMapLight::new(Texture::default()).with_transform(Affine3f::from_scale(2.0));
        assert_eq!(light.transform, Affine3f::from_scale(2.0));
    }
}
