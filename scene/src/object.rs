use super::mesh::MeshId;

/// Unique identifier for an object in the scene.
pub type ObjectId = u32;

/// An ordered collection of meshes that is instantiated as a unit.
///
/// Entries may be `None`. A scene split across several nodes keeps the same
/// number of mesh slots on every node so that "mesh #3" refers to the same
/// logical mesh everywhere; a node that does not own a mesh stores `None` in
/// its slot. Consumers treat `None` as "not present here", not as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    pub meshes: Vec<Option<MeshId>>,
}

impl Object {
    pub fn new(meshes: Vec<Option<MeshId>>) -> Self {
        Self { meshes }
    }

    /// Creates an object in which every slot is present.
    pub fn from_meshes(meshes: impl IntoIterator<Item = MeshId>) -> Self {
        Self {
            meshes: meshes.into_iter().map(Some).collect(),
        }
    }

    /// Meshes present in this copy of the object, in slot order.
    pub fn present_meshes(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.meshes.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_meshes_fills_every_slot() {
        let object = Object::from_meshes([4, 5]);
        assert_eq!(object.meshes, vec![Some(4), Some(5)]);
    }

    #[test]
    fn test_present_meshes_skips_null_slots() {
        let object = Object::new(vec![Some(1), None, Some(3), None]);

        assert_eq!(object.meshes.len(), 4);
        assert_eq!(object.present_meshes().collect::<Vec<_>>(), vec![1, 3]);
    }
}
