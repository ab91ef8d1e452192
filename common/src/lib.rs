mod aabb;
mod affine;
mod vector;

pub use aabb::Aabb;
pub use affine::Affine3f;
pub use vector::{Vec2f, Vec2i, Vec3f, Vec3i};

/// Tolerance for floating point comparisons.
pub const EPSILON: f32 = 1e-5;
