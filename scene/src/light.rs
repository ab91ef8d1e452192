use std::fmt;

use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Vector3};
use mini_common::Vec3f;

/// A quadrilateral area light emitting into the half space its normal points to.
///
/// The shape is spanned by `edge0` and `edge1` starting at `corner`. `normal`
/// and `area` are derivable from the edges but stored for renderers.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadLight {
    pub corner: Vec3f,
    pub edge0: Vec3f,
    pub edge1: Vec3f,
    pub emission: Vec3f,
    pub normal: Vec3f,
    pub area: f32,
}

impl QuadLight {
    /// Creates a quad light, deriving `normal` and `area` from the edges.
    pub fn new(corner: Vec3f, edge0: Vec3f, edge1: Vec3f, emission: Vec3f) -> Self {
        let cross = Vector3::from(edge0).cross(Vector3::from(edge1));
        let area = cross.magnitude();
        let normal = if area > 0.0 { cross / area } else { cross };
        Self {
            corner,
            edge0,
            edge1,
            emission,
            normal: normal.into(),
            area,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.corner.is_finite()
            && self.edge0.is_finite()
            && self.edge1.is_finite()
            && self.emission.is_finite()
            && self.normal.is_finite()
            && self.area.is_finite()
    }
}

/// A directional light at infinity shining *into* `direction`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DirLight {
    pub direction: Vec3f,
    pub radiance: Vec3f,
}

impl DirLight {
    pub fn new(direction: Vec3f, radiance: Vec3f) -> Self {
        Self { direction, radiance }
    }

    pub fn is_finite(&self) -> bool {
        self.direction.is_finite() && self.radiance.is_finite()
    }
}

impl fmt::Display for DirLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirLight{{dir={}, rad={}}}", self.direction, self.radiance)
    }
}
