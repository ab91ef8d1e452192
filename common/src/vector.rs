//! Plain-old-data vector types.
//!
//! These are laid out exactly like the scene file stores them (tightly packed
//! `f32`/`i32` components), so slices of them can be written and read as raw
//! bytes. Arithmetic goes through `cgmath` via the `From` conversions.

use bytemuck::{Pod, Zeroable};
use cgmath::{Point3, Vector2, Vector3};

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

/// Integer triple; in meshes each component is a vertex index.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Vec3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Vec3f {
    pub const ZERO: Vec3f = Vec3f::splat(0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Largest of the three components.
    pub fn max_component(&self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Vec3i {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for Vec3f {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<Vector3<f32>> for Vec3f {
    fn from(v: Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3f> for Vector3<f32> {
    fn from(v: Vec3f) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Point3<f32>> for Vec3f {
    fn from(p: Point3<f32>) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

impl From<Vec3f> for Point3<f32> {
    fn from(v: Vec3f) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

impl From<Vector2<f32>> for Vec2f {
    fn from(v: Vector2<f32>) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vec2f> for Vector2<f32> {
    fn from(v: Vec2f) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl From<[f32; 3]> for Vec3f {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3f> for [f32; 3] {
    fn from(v: Vec3f) -> Self {
        [v.x, v.y, v.z]
    }
}

impl From<[i32; 3]> for Vec3i {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_sizes_match_file_layout() {
        assert_eq!(std::mem::size_of::<Vec2f>(), 8);
        assert_eq!(std::mem::size_of::<Vec3f>(), 12);
        assert_eq!(std::mem::size_of::<Vec2i>(), 8);
        assert_eq!(std::mem::size_of::<Vec3i>(), 12);
    }

    #[test]
    fn test_vec3f_bytes_are_packed_components() {
        let v = Vec3f::new(1.0, 2.0, 3.0);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cgmath_round_trip() {
        let v = Vec3f::new(0.5, -1.0, 8.0);
        let cg: Vector3<f32> = v.into();
        assert_eq!(Vec3f::from(cg), v);

        let p: Point3<f32> = v.into();
        assert_eq!(Vec3f::from(p), v);
    }

    #[test]
    fn test_max_component_and_finite() {
        assert_eq!(Vec3f::new(0.0, 3.0, -7.0).max_component(), 3.0);
        assert!(Vec3f::ZERO.is_finite());
        assert!(!Vec3f::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec2f::new(0.0, f32::INFINITY).is_finite());
    }
}
