use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix3, Point3, Vector3};

use crate::aabb::Aabb;
use crate::vector::Vec3f;

/// An affine 3D transform: a 3x3 linear part stored as three column vectors,
/// followed by a translation.
///
/// The field order (`x`, `y`, `z`, `p`) is the on-disk order of the twelve floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Affine3f {
    /// First column of the linear part (image of the x axis).
    pub x: Vec3f,
    /// Second column of the linear part.
    pub y: Vec3f,
    /// Third column of the linear part.
    pub z: Vec3f,
    /// Translation.
    pub p: Vec3f,
}

impl Affine3f {
    pub const IDENTITY: Affine3f = Affine3f {
        x: Vec3f::new(1.0, 0.0, 0.0),
        y: Vec3f::new(0.0, 1.0, 0.0),
        z: Vec3f::new(0.0, 0.0, 1.0),
        p: Vec3f::ZERO,
    };

    pub fn from_translation(translation: Vec3f) -> Self {
        Self {
            p: translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_scale(scale: f32) -> Self {
        Self {
            x: Vec3f::new(scale, 0.0, 0.0),
            y: Vec3f::new(0.0, scale, 0.0),
            z: Vec3f::new(0.0, 0.0, scale),
            p: Vec3f::ZERO,
        }
    }

    /// The linear part as a cgmath matrix.
    pub fn linear(&self) -> Matrix3<f32> {
        Matrix3::from_cols(self.x.into(), self.y.into(), self.z.into())
    }

    pub fn transform_point(&self, point: Vec3f) -> Vec3f {
        (self.linear() * Vector3::from(point) + Vector3::from(self.p)).into()
    }

    /// World-space box of `aabb` after applying this transform.
    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let [first, rest @ ..] = aabb
            .corners()
            .map(|corner| Point3::from(self.transform_point(corner.into())));
        rest.into_iter()
            .fold(Aabb::new(first, first), |bounds, corner| bounds.expand(corner))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.p.is_finite()
    }
}

impl Default for Affine3f {
    fn default() -> Self {
        Self::IDENTITY
    }
}
