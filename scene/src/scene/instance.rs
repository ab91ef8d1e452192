use mini_common::Affine3f;

use crate::object::ObjectId;

/// An instance places an object in the world with an affine transform.
///
/// `object` may be `None` for an instance slot that is intentionally left
/// empty on this copy of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub xfm: Affine3f,
    pub object: Option<ObjectId>,
}

impl Instance {
    /// Creates a new instance of the given object.
    pub fn new(object: ObjectId, xfm: Affine3f) -> Self {
        Self {
            xfm,
            object: Some(object),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            xfm: Affine3f::IDENTITY,
            object: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mini_common::Vec3f;

    #[test]
    fn test_instance_new() {
        let xfm = Affine3f::from_translation(Vec3f::new(1.0, 0.0, 0.0));
        let instance = Instance::new(42, xfm);

        assert_eq!(instance.object, Some(42));
        assert_eq!(instance.xfm, xfm);
    }

    #[test]
    fn test_instance_default_is_empty_identity() {
        let instance = Instance::default();

        assert_eq!(instance.object, None);
        assert_eq!(instance.xfm, Affine3f::IDENTITY);
    }

    #[test]
    fn test_instances_share_object() {
        let a = Instance::new(3, Affine3f::IDENTITY);
        let b = Instance::new(3, Affine3f::from_scale(2.0));

        assert_eq!(a.object, b.object);
        assert_ne!(a.xfm, b.xfm);
    }
}
