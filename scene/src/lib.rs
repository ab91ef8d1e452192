//! In-memory "mini" scene model and its binary `.mini` serialization.
//!
//! A [`Scene`] owns arenas of textures, materials, meshes and objects that
//! reference each other through integer handles. [`Scene::save`] and
//! [`Scene::load`] stream the whole graph in a fixed section order, with
//! shared entities written once and referenced by index.

pub mod format;
pub mod io;
pub mod light;
pub mod lint;
pub mod material;
pub mod mesh;
pub mod object;
mod scene;
pub mod serialized;
pub mod stats;
pub mod texture;


pub use mini_common as common;

pub use environment::EnvMapLight;
pub use format::{EntityKind, FormatError, FormatVersion, SaveOptions};
pub use instance::Instance;
pub use light::{DirLight, QuadLight};
pub use lint::{lint, LintError, LintReport, LintWarning};
pub use material::{Material, MaterialId};
pub use mesh::{Mesh, MeshId};
pub use object::{Object, ObjectId};
pub use scene::{environment, instance, Scene};
pub use serialized::{Serialized, SerializedScene};
pub use stats::SceneStats;
pub use texture::{FilterMode, Texture, TextureFormat, TextureId};
