use image::DynamicImage;
use mini_common::Vec2i;

use super::format::FormatError;

/// Unique identifier for a texture in the scene.
pub type TextureId = u32;

/// How the bytes in [`Texture::data`] are to be interpreted.
#[repr(u16)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    #[default]
    Undefined = 0,
    /// The data is the verbatim content of a .ptex file; it is stored but never decoded.
    EmbeddedPtex = 1,
    /// Four `f32` channels per texel.
    Float4 = 2,
    /// One `f32` channel per texel.
    Float1 = 3,
    /// Four `u8` channels per texel.
    RgbaUint8 = 4,
}

impl TextureFormat {
    /// Size of one texel in bytes, or `None` for formats that are not texel grids.
    pub fn bytes_per_texel(self) -> Option<usize> {
        match self {
            Self::Float4 => Some(16),
            Self::Float1 => Some(4),
            Self::RgbaUint8 => Some(4),
            Self::Undefined | Self::EmbeddedPtex => None,
        }
    }
}

impl TryFrom<u16> for TextureFormat {
    type Error = FormatError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Undefined),
            1 => Ok(Self::EmbeddedPtex),
            2 => Ok(Self::Float4),
            3 => Ok(Self::Float1),
            4 => Ok(Self::RgbaUint8),
            _ => Err(FormatError::InvalidTextureFormat(value)),
        }
    }
}

/// Filtering a renderer should apply when sampling the texture.
#[repr(u16)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    #[default]
    Bilinear = 0,
    Nearest = 1,
}

impl TryFrom<u16> for FilterMode {
    type Error = FormatError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bilinear),
            1 => Ok(Self::Nearest),
            _ => Err(FormatError::InvalidFilterMode(value)),
        }
    }
}

/// Raw texture payload plus the metadata needed to interpret it.
///
/// Image textures store `size.x * size.y` texels in `data`. Embedded ptex
/// textures always have a size of `(0, 0)` and carry the original file bytes.
///
/// # Examples
///
/// ```
/// use mini_scene::{Texture, TextureFormat, FilterMode};
/// use mini_common::Vec2i;
///
/// let texture = Texture::new(Vec2i::new(2, 2), TextureFormat::RgbaUint8, vec![255; 16])
///     .with_filter_mode(FilterMode::Nearest);
/// assert_eq!(texture.expected_data_len(), Some(16));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    pub size: Vec2i,
    pub format: TextureFormat,
    pub filter_mode: FilterMode,
    pub data: Vec<u8>,
}

impl Texture {
    pub fn new(size: Vec2i, format: TextureFormat, data: Vec<u8>) -> Self {
        Self {
            size,
            format,
            filter_mode: FilterMode::Bilinear,
            data,
        }
    }

    /// Wraps the content of a .ptex file.
    pub fn embedded_ptex(data: Vec<u8>) -> Self {
        Self::new(Vec2i::new(0, 0), TextureFormat::EmbeddedPtex, data)
    }

    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    /// Number of payload bytes an image texture of this size and format must carry.
    ///
    /// Returns `None` for formats without a texel layout, or for negative sizes.
    pub fn expected_data_len(&self) -> Option<usize> {
        let texel = self.format.bytes_per_texel()?;
        let width = usize::try_from(self.size.x).ok()?;
        let height = usize::try_from(self.size.y).ok()?;
        width.checked_mul(height)?.checked_mul(texel)
    }

    /// Converts a decoded image into a texture.
    ///
    /// Floating point images become `Float4` textures; everything else is
    /// converted to `RgbaUint8`.
    pub fn from_image(image: &DynamicImage) -> Self {
        let size = Vec2i::new(image.width() as i32, image.height() as i32);
        match image {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                let texels = image.to_rgba32f().into_raw();
                Self::new(size, TextureFormat::Float4, bytemuck::cast_slice(&texels).to_vec())
            }
            _ => Self::new(size, TextureFormat::RgbaUint8, image.to_rgba8().into_raw()),
        }
    }

    /// Decodes the payload into an image.
    ///
    /// Returns `None` for ptex or undefined payloads, for `Float1` (no matching
    /// image layout), and when the payload is shorter than the declared size.
    pub fn to_image(&self) -> Option<DynamicImage> {
        let width = u32::try_from(self.size.x).ok()?;
        let height = u32::try_from(self.size.y).ok()?;
        match self.format {
            TextureFormat::RgbaUint8 => {
                image::RgbaImage::from_raw(width, height, self.data.clone())
                    .map(DynamicImage::ImageRgba8)
            }
            TextureFormat::Float4 => {
                let texels: Vec<f32> = bytemuck::pod_collect_to_vec(&self.data);
                image::Rgba32FImage::from_raw(width, height, texels)
                    .map(DynamicImage::ImageRgba32F)
            }
            TextureFormat::Float1 | TextureFormat::EmbeddedPtex | TextureFormat::Undefined => None,
        }
    }
}
