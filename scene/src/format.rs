//! Scene file format serialization.
//!
//! Scenes are stored in the `.mini` binary format: a fixed sequence of
//! sections framed by a magic number that also encodes the format version.
//! Shared textures, materials and objects are written once and referenced
//! by their index in the file; meshes are written inline in their object.
//!
//! # File Structure
//!
//! ```text
//! magic: u64                 4321000000 + version
//! textures: u64 count        per slot: i32 flag, then if 1:
//!                              size: Vec2i, format: u16, filter: u16 (v11+), data: u8 vector
//! quad lights: vector        QuadLight records
//! dir lights: vector         DirLight records
//! env map: i32 flag          if 1: transform: Affine3f, then texture fields as above
//! materials: u64 count       emission, base color, metallic, roughness,
//!                              transmission, ior, color texture: i32, alpha texture: i32
//! objects: u64 count         per object: u64 mesh count, per slot: i32 flag, then if 1:
//!                              indices, vertices, normals, texcoords vectors, material: i32
//! instances: u64 count       per slot: i32 flag, then if 1: xfm: Affine3f, object: i32
//! magic: u64                 same as the opening magic
//! ```
//!
//! All values are written in host byte order.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use mini_common::{Affine3f, Vec2i, Vec3f};
use thiserror::Error;

use super::io::{read_element, read_vector, write_element, write_vector};
use super::{
    environment::EnvMapLight,
    instance::Instance,
    material::{Material, MaterialId},
    mesh::Mesh,
    object::{Object, ObjectId},
    serialized::SerializedScene,
    texture::{FilterMode, Texture, TextureFormat, TextureId},
    Scene,
};

// ============================================================================
// Constants
// ============================================================================

/// The file magic is this base plus the format version.
pub const MAGIC_BASE: u64 = 4_321_000_000;

/// Index value meaning "no reference" for instance objects and material textures.
const NO_REFERENCE: i32 = -1;

/// Known revisions of the file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatVersion {
    /// Layout without the texture filter mode; textures load as `Bilinear`.
    V10,
    V11,
}

impl FormatVersion {
    pub const CURRENT: Self = Self::V11;

    pub fn number(self) -> u32 {
        match self {
            Self::V10 => 10,
            Self::V11 => 11,
        }
    }

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            10 => Some(Self::V10),
            11 => Some(Self::V11),
            _ => None,
        }
    }

    pub fn magic(self) -> u64 {
        MAGIC_BASE + u64::from(self.number())
    }

    pub fn from_magic(magic: u64) -> Option<Self> {
        let number = magic.checked_sub(MAGIC_BASE)?;
        Self::from_number(u32::try_from(number).ok()?)
    }

    /// Whether texture records carry a filter mode.
    pub fn has_filter_mode(self) -> bool {
        self >= Self::V11
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Kinds of entities referenced by index in a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Texture,
    Material,
    Mesh,
    Object,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Texture => "texture",
            Self::Material => "material",
            Self::Mesh => "mesh",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during scene serialization/deserialization.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid or incompatible scene file (magic {0})")]
    InvalidMagic(u64),

    #[error("incomplete or incompatible scene file (trailing magic {found}, expected {expected})")]
    IncompleteFile { expected: u64, found: u64 },

    #[error("partial read: scene file is truncated")]
    PartialRead,

    #[error("Invalid texture format: {0}")]
    InvalidTextureFormat(u16),

    #[error("Invalid filter mode: {0}")]
    InvalidFilterMode(u16),

    #[error("Invalid {what} flag: {value}")]
    InvalidFlag { what: &'static str, value: i32 },

    #[error("{kind} index {id} out of range (table has {count} entries)")]
    InvalidReference { kind: EntityKind, id: i32, count: usize },

    #[error("mesh has no material")]
    MissingMaterial,

    #[error("{kind} handle {id} does not exist in the scene")]
    DanglingHandle { kind: EntityKind, id: u32 },

    #[error("length {0} does not fit the file format")]
    LengthOverflow(usize),

    #[error("Invalid length: {0}")]
    InvalidLength(i64),

    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

// ============================================================================
// Save Options
// ============================================================================

/// Options for saving scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Layout revision to write.
    pub version: FormatVersion,
}

impl SaveOptions {
    pub fn with_version(version: FormatVersion) -> Self {
        Self { version }
    }
}

// ============================================================================
// Writing
// ============================================================================

fn write_flag<W: Write>(writer: &mut W, present: bool) -> Result<(), FormatError> {
    write_element(writer, &i32::from(present))
}

fn write_count<W: Write>(writer: &mut W, count: usize) -> Result<(), FormatError> {
    write_element(writer, &(count as u64))
}

fn write_index<W: Write>(writer: &mut W, index: Option<usize>) -> Result<(), FormatError> {
    let value = match index {
        Some(index) => i32::try_from(index).map_err(|_| FormatError::LengthOverflow(index))?,
        None => NO_REFERENCE,
    };
    write_element(writer, &value)
}

fn write_texture_fields<W: Write>(
    writer: &mut W,
    texture: &Texture,
    version: FormatVersion,
) -> Result<(), FormatError> {
    write_element(writer, &texture.size)?;
    write_element(writer, &(texture.format as u16))?;
    if version.has_filter_mode() {
        write_element(writer, &(texture.filter_mode as u16))?;
    }
    write_vector(writer, &texture.data)
}

/// Writes every section. Handles must have been checked by [`Scene::check_handles`].
struct SceneWriter<'a> {
    scene: &'a Scene,
    serialized: &'a SerializedScene,
    version: FormatVersion,
}

impl SceneWriter<'_> {
    fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let magic = self.version.magic();
        write_element(writer, &magic)?;

        self.write_textures(writer)?;
        write_vector(writer, &self.scene.quad_lights)?;
        write_vector(writer, &self.scene.dir_lights)?;
        self.write_env_map(writer)?;
        self.write_materials(writer)?;
        self.write_objects(writer)?;
        self.write_instances(writer)?;

        write_element(writer, &magic)
    }

    fn write_textures<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let textures = &self.serialized.textures;
        write_count(writer, textures.len())?;
        for key in textures.iter() {
            match key.and_then(|id| self.scene.get_texture(id)) {
                Some(texture) => {
                    write_flag(writer, true)?;
                    write_texture_fields(writer, texture, self.version)?;
                }
                None => write_flag(writer, false)?,
            }
        }
        log::debug!("Wrote {} texture slots", textures.len());
        Ok(())
    }

    fn write_env_map<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let Some(env_map) = &self.scene.env_map_light else {
            return write_flag(writer, false);
        };
        write_flag(writer, true)?;
        write_element(writer, &env_map.transform)?;
        write_texture_fields(writer, &env_map.texture, self.version)
    }

    fn write_materials<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let materials = &self.serialized.materials;
        write_count(writer, materials.len())?;
        for id in materials.iter() {
            let material = self
                .scene
                .get_material(id)
                .ok_or(FormatError::DanglingHandle { kind: EntityKind::Material, id })?;

            write_element(writer, &material.emission)?;
            write_element(writer, &material.base_color)?;
            write_element(writer, &material.metallic)?;
            write_element(writer, &material.roughness)?;
            write_element(writer, &material.transmission)?;
            write_element(writer, &material.ior)?;
            write_index(writer, self.serialized.texture_id(material.color_texture))?;
            write_index(writer, self.serialized.texture_id(material.alpha_texture))?;
        }
        log::debug!("Wrote {} materials", materials.len());
        Ok(())
    }

    fn write_objects<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let objects = &self.serialized.objects;
        write_count(writer, objects.len())?;
        for id in objects.iter() {
            let object = self
                .scene
                .get_object(id)
                .ok_or(FormatError::DanglingHandle { kind: EntityKind::Object, id })?;

            write_count(writer, object.meshes.len())?;
            for slot in &object.meshes {
                let Some(mesh_id) = *slot else {
                    write_flag(writer, false)?;
                    continue;
                };
                let mesh = self.scene.get_mesh(mesh_id).ok_or(FormatError::DanglingHandle {
                    kind: EntityKind::Mesh,
                    id: mesh_id,
                })?;
                let material = self
                    .serialized
                    .material_id(mesh.material)
                    .ok_or(FormatError::MissingMaterial)?;

                write_flag(writer, true)?;
                write_vector(writer, &mesh.indices)?;
                write_vector(writer, &mesh.vertices)?;
                write_vector(writer, &mesh.normals)?;
                write_vector(writer, &mesh.texcoords)?;
                write_index(writer, Some(material))?;
            }
        }
        log::debug!("Wrote {} objects", objects.len());
        Ok(())
    }

    fn write_instances<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        write_count(writer, self.scene.instances.len())?;
        for slot in &self.scene.instances {
            let Some(instance) = slot else {
                write_flag(writer, false)?;
                continue;
            };
            write_flag(writer, true)?;
            write_element(writer, &instance.xfm)?;
            let object = instance.object.and_then(|id| self.serialized.object_id(id));
            write_index(writer, object)?;
        }
        log::debug!("Wrote {} instance slots", self.scene.instances.len());
        Ok(())
    }
}

// ============================================================================
// Reading
// ============================================================================

fn read_flag<R: Read>(reader: &mut R, what: &'static str) -> Result<bool, FormatError> {
    match read_element::<_, i32>(reader)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(FormatError::InvalidFlag { what, value }),
    }
}

fn read_count<R: Read>(reader: &mut R) -> Result<usize, FormatError> {
    let count: u64 = read_element(reader)?;
    usize::try_from(count).map_err(|_| FormatError::InvalidLength(count as i64))
}

/// Resolves a file index against a table of loaded entities.
fn resolve<T: Copy>(table: &[T], kind: EntityKind, id: i32) -> Result<T, FormatError> {
    usize::try_from(id)
        .ok()
        .and_then(|index| table.get(index).copied())
        .ok_or(FormatError::InvalidReference {
            kind,
            id,
            count: table.len(),
        })
}

fn read_texture_fields<R: Read>(
    reader: &mut R,
    version: FormatVersion,
) -> Result<Texture, FormatError> {
    let size: Vec2i = read_element(reader)?;
    let format = TextureFormat::try_from(read_element::<_, u16>(reader)?)?;
    let filter_mode = if version.has_filter_mode() {
        FilterMode::try_from(read_element::<_, u16>(reader)?)?
    } else {
        FilterMode::Bilinear
    };
    let data = read_vector(reader)?;
    Ok(Texture {
        size,
        format,
        filter_mode,
        data,
    })
}

/// Reads every section after the opening magic into a fresh scene.
struct SceneReader {
    scene: Scene,
    version: FormatVersion,
    /// Scene handle for each file texture slot; slot entries may be empty.
    textures: Vec<Option<TextureId>>,
    materials: Vec<MaterialId>,
    objects: Vec<ObjectId>,
}

impl SceneReader {
    fn new(version: FormatVersion) -> Self {
        Self {
            scene: Scene::new(),
            version,
            textures: Vec::new(),
            materials: Vec::new(),
            objects: Vec::new(),
        }
    }

    fn read<R: Read>(mut self, reader: &mut R) -> Result<Scene, FormatError> {
        self.read_textures(reader)?;
        self.scene.quad_lights = read_vector(reader)?;
        self.scene.dir_lights = read_vector(reader)?;
        self.read_env_map(reader)?;
        self.read_materials(reader)?;
        self.read_objects(reader)?;
        self.read_instances(reader)?;

        let expected = self.version.magic();
        let found: u64 = read_element(reader)?;
        if found != expected {
            return Err(FormatError::IncompleteFile { expected, found });
        }
        Ok(self.scene)
    }

    fn read_textures<R: Read>(&mut self, reader: &mut R) -> Result<(), FormatError> {
        let count = read_count(reader)?;
        for _ in 0..count {
            let texture = if read_flag(reader, "texture")? {
                let texture = read_texture_fields(reader, self.version)?;
                Some(self.scene.add_texture(texture))
            } else {
                None
            };
            self.textures.push(texture);
        }
        log::debug!("Read {} texture slots", count);
        Ok(())
    }

    fn read_env_map<R: Read>(&mut self, reader: &mut R) -> Result<(), FormatError> {
        if read_flag(reader, "environment map")? {
            let transform: Affine3f = read_element(reader)?;
            let texture = read_texture_fields(reader, self.version)?;
            self.scene.env_map_light = Some(EnvMapLight { texture, transform });
        }
        Ok(())
    }

    /// Texture reference of a material. Both -1 and the reserved empty slot mean "none".
    fn texture_ref(&self, id: i32) -> Result<Option<TextureId>, FormatError> {
        if id == NO_REFERENCE {
            return Ok(None);
        }
        resolve(&self.textures, EntityKind::Texture, id)
    }

    fn read_materials<R: Read>(&mut self, reader: &mut R) -> Result<(), FormatError> {
        let count = read_count(reader)?;
        for _ in 0..count {
            let emission: Vec3f = read_element(reader)?;
            let base_color: Vec3f = read_element(reader)?;
            let metallic: f32 = read_element(reader)?;
            let roughness: f32 = read_element(reader)?;
            let transmission: f32 = read_element(reader)?;
            let ior: f32 = read_element(reader)?;
            let color_texture = self.texture_ref(read_element(reader)?)?;
            let alpha_texture = self.texture_ref(read_element(reader)?)?;

            let material = Material {
                emission,
                base_color,
                metallic,
                roughness,
                transmission,
                ior,
                color_texture,
                alpha_texture,
            };
            self.materials.push(self.scene.add_material(material));
        }
        log::debug!("Read {} materials", count);
        Ok(())
    }

    fn read_mesh<R: Read>(&mut self, reader: &mut R) -> Result<Mesh, FormatError> {
        let indices = read_vector(reader)?;
        let vertices = read_vector(reader)?;
        let normals = read_vector(reader)?;
        let texcoords = read_vector(reader)?;
        let material = match read_element::<_, i32>(reader)? {
            NO_REFERENCE => return Err(FormatError::MissingMaterial),
            id => resolve(&self.materials, EntityKind::Material, id)?,
        };
        Ok(Mesh {
            vertices,
            normals,
            texcoords,
            indices,
            material,
        })
    }

    fn read_objects<R: Read>(&mut self, reader: &mut R) -> Result<(), FormatError> {
        let count = read_count(reader)?;
        for _ in 0..count {
            let mesh_count = read_count(reader)?;
            let mut meshes = Vec::new();
            for _ in 0..mesh_count {
                let slot = if read_flag(reader, "mesh")? {
                    let mesh = self.read_mesh(reader)?;
                    Some(self.scene.add_mesh(mesh))
                } else {
                    None
                };
                meshes.push(slot);
            }
            self.objects.push(self.scene.add_object(Object::new(meshes)));
        }
        log::debug!("Read {} objects", count);
        Ok(())
    }

    fn read_instances<R: Read>(&mut self, reader: &mut R) -> Result<(), FormatError> {
        let count = read_count(reader)?;
        for _ in 0..count {
            if !read_flag(reader, "instance")? {
                self.scene.add_null_instance();
                continue;
            }
            let xfm: Affine3f = read_element(reader)?;
            let object = match read_element::<_, i32>(reader)? {
                NO_REFERENCE => None,
                id => Some(resolve(&self.objects, EntityKind::Object, id)?),
            };
            self.scene.add_instance(Instance { xfm, object });
        }
        log::debug!("Read {} instance slots", count);
        Ok(())
    }
}

// ============================================================================
// Scene Serialization
// ============================================================================

impl Scene {
    /// Checks that every handle reachable from the instances resolves.
    fn check_handles(&self, serialized: &SerializedScene) -> Result<(), FormatError> {
        for id in serialized.objects.iter() {
            if self.get_object(id).is_none() {
                return Err(FormatError::DanglingHandle { kind: EntityKind::Object, id });
            }
        }
        for id in serialized.meshes.iter() {
            if self.get_mesh(id).is_none() {
                return Err(FormatError::DanglingHandle { kind: EntityKind::Mesh, id });
            }
        }
        for id in serialized.materials.iter() {
            if self.get_material(id).is_none() {
                return Err(FormatError::DanglingHandle { kind: EntityKind::Material, id });
            }
        }
        for id in serialized.textures.iter().flatten() {
            if self.get_texture(id).is_none() {
                return Err(FormatError::DanglingHandle { kind: EntityKind::Texture, id });
            }
        }
        Ok(())
    }

    /// Registers and checks the scene ahead of writing.
    fn prepare_save(&self, options: &SaveOptions) -> Result<SerializedScene, FormatError> {
        let serialized = SerializedScene::from_scene(self);
        self.check_handles(&serialized)?;

        if !options.version.has_filter_mode() {
            let filtered = serialized
                .textures
                .iter()
                .flatten()
                .filter_map(|id| self.get_texture(id))
                .chain(self.env_map_light.as_ref().map(|env| &env.texture))
                .filter(|texture| texture.filter_mode != FilterMode::Bilinear)
                .count();
            if filtered > 0 {
                log::warn!(
                    "{} texture(s) use a non-default filter mode that format {} cannot store",
                    filtered,
                    options.version
                );
            }
        }
        Ok(serialized)
    }

    /// Writes the scene to `writer`.
    ///
    /// Dangling handles are reported before any byte is written.
    pub fn write_to<W: Write>(&self, mut writer: W, options: &SaveOptions) -> Result<(), FormatError> {
        let serialized = self.prepare_save(options)?;
        SceneWriter {
            scene: self,
            serialized: &serialized,
            version: options.version,
        }
        .write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a scene from `reader`.
    ///
    /// The returned scene assigns handles in file order, starting from 0 for
    /// every entity kind.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Scene, FormatError> {
        let magic: u64 = read_element(&mut reader)?;
        let version = FormatVersion::from_magic(magic).ok_or(FormatError::InvalidMagic(magic))?;
        log::debug!("Reading scene format {}", version);
        SceneReader::new(version).read(&mut reader)
    }

    /// Serializes the scene to bytes with default options.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        self.to_bytes_with_options(&SaveOptions::default())
    }

    /// Serializes the scene to bytes with custom options.
    pub fn to_bytes_with_options(&self, options: &SaveOptions) -> Result<Vec<u8>, FormatError> {
        let mut output = Vec::new();
        self.write_to(&mut output, options)?;
        Ok(output)
    }

    /// Deserializes a scene from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Scene, FormatError> {
        Self::read_from(Cursor::new(bytes))
    }

    /// Saves the scene to a file with default options.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        self.save_with_options(path, &SaveOptions::default())
    }

    /// Saves the scene to a file with custom options.
    ///
    /// The file is not created if the scene contains dangling handles.
    pub fn save_with_options(
        &self,
        path: impl AsRef<Path>,
        options: &SaveOptions,
    ) -> Result<(), FormatError> {
        let path = path.as_ref();
        let serialized = self.prepare_save(options)?;

        log::debug!("Saving scene to {} ({})", path.display(), options.version);
        let mut writer = BufWriter::new(File::create(path)?);
        SceneWriter {
            scene: self,
            serialized: &serialized,
            version: options.version,
        }
        .write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a scene from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Scene, FormatError> {
        let path = path.as_ref();
        log::debug!("Loading scene from {}", path.display());
        Self::read_from(BufReader::new(File::open(path)?))
    }
}

// ============================================================================
// Tests
// ============================================================================
