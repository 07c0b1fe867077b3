use crate::geometry::PlaneGeometry;
use crate::material::ShaderMaterial;
use sketch_common::{EulerRotation, Transform};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a mesh in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub Uuid);

impl MeshId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeshId {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry + material + transform.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: PlaneGeometry,
    pub material: ShaderMaterial,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(geometry: PlaneGeometry, material: ShaderMaterial) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::default(),
        }
    }
}

/// Scene graph root. Flat: meshes have no parents.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: BTreeMap<MeshId, Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its id. Adding the same mesh twice yields two entries.
    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId::new();
        self.meshes.insert(id, mesh);
        tracing::debug!(mesh = %id.0, count = self.meshes.len(), "mesh added to scene");
        id
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn meshes(&self) -> &BTreeMap<MeshId, Mesh> {
        &self.meshes
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    /// Set a mesh's rotation. Returns false if the id is unknown.
    pub fn set_rotation(&mut self, id: MeshId, rotation: EulerRotation) -> bool {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.transform.rotation = rotation;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane_mesh() -> Mesh {
        Mesh::new(
            PlaneGeometry::new(300.0, 200.0, 10, 10),
            ShaderMaterial::new("vs", "fs"),
        )
    }

    #[test]
    fn scene_starts_empty() {
        assert_eq!(Scene::new().mesh_count(), 0);
    }

    #[test]
    fn add_returns_distinct_ids() {
        let mut scene = Scene::new();
        let a = scene.add(plane_mesh());
        let b = scene.add(plane_mesh());
        assert_ne!(a, b);
        assert_eq!(scene.mesh_count(), 2);
        assert!(scene.get(a).is_some());
    }

    #[test]
    fn set_rotation_updates_transform() {
        let mut scene = Scene::new();
        let id = scene.add(plane_mesh());
        let rot = EulerRotation {
            x: 0.5,
            y: 1.0,
            z: 0.0,
        };
        assert!(scene.set_rotation(id, rot));
        assert_eq!(scene.get(id).unwrap().transform.rotation, rot);
    }

    #[test]
    fn set_rotation_unknown_id() {
        let mut scene = Scene::new();
        assert!(!scene.set_rotation(MeshId::new(), EulerRotation::ZERO));
    }

    #[test]
    fn new_mesh_has_identity_transform() {
        let mesh = plane_mesh();
        assert_eq!(mesh.transform, Transform::default());
    }
}
