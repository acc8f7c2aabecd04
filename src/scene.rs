use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;

use crate::geometry::TextGeometry;
use crate::math::{Aabb, Rgb};
use crate::params::MaterialParams;
use crate::texture::TextureHandle;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Live PBR material attached to the mesh. Patchable in place; the dirty
/// flag mirrors what a renderer would need to re-upload.
#[derive(Clone, Debug)]
pub struct Material {
    pub base_color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub map: Option<TextureHandle>,
    pub needs_update: bool,
}

impl Material {
    pub fn from_params(params: &MaterialParams) -> Self {
        Self {
            base_color: params.base_color,
            metalness: params.metalness,
            roughness: params.roughness,
            map: params.texture.clone(),
            needs_update: false,
        }
    }

    /// Applies a new appearance snapshot without touching geometry.
    pub fn patch(&mut self, params: &MaterialParams) {
        self.base_color = params.base_color;
        self.metalness = params.metalness;
        self.roughness = params.roughness;
        self.map = params.texture.clone();
        self.needs_update = true;
    }
}

/// One displayed piece of text: shared geometry, its material, and where it
/// sits in the world.
#[derive(Debug)]
pub struct TextMesh {
    pub id: MeshId,
    pub geometry: Arc<TextGeometry>,
    pub material: Material,
    pub translation: Vec3,
}

impl TextMesh {
    pub fn new(geometry: Arc<TextGeometry>, material: Material) -> Self {
        Self {
            id: MeshId::next(),
            geometry,
            material,
            translation: Vec3::ZERO,
        }
    }

    pub fn world_bounds(&self) -> Aabb {
        self.geometry.bounds().translated(self.translation)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: Rgb,
}

#[derive(Clone, Copy, Debug)]
pub struct LightRig {
    pub ambient_intensity: f32,
    pub ambient_color: Rgb,
    pub directional: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.8,
            ambient_color: Rgb::WHITE,
            directional: DirectionalLight {
                position: Vec3::new(5.0, 10.0, 5.0),
                intensity: 1.0,
                color: Rgb::WHITE,
            },
        }
    }
}

/// Holds at most one text mesh. The slot is private so every swap funnels
/// through [`SceneState::replace_mesh`], which releases the old geometry
/// before the new mesh lands.
#[derive(Debug)]
pub struct SceneState {
    pub background: Rgb,
    pub lights: LightRig,
    mesh: Option<TextMesh>,
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            background: Rgb::WHITE,
            lights: LightRig::default(),
            mesh: None,
        }
    }

    pub fn replace_mesh(&mut self, mesh: TextMesh) -> MeshId {
        if let Some(old) = self.mesh.take() {
            log::debug!(
                "detaching mesh {:?} ({} triangles)",
                old.id,
                old.geometry.triangle_count()
            );
            drop(old);
        }
        let id = mesh.id;
        self.mesh = Some(mesh);
        id
    }

    pub fn mesh(&self) -> Option<&TextMesh> {
        self.mesh.as_ref()
    }

    pub fn mesh_mut(&mut self) -> Option<&mut TextMesh> {
        self.mesh.as_mut()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_geometry() -> Arc<TextGeometry> {
        Arc::new(TextGeometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![0, 1, 2],
        ))
    }

    #[test]
    fn test_replace_mesh_keeps_single_slot() {
        let mut scene = SceneState::new();
        assert!(!scene.has_mesh());

        let first = scene.replace_mesh(TextMesh::new(
            tiny_geometry(),
            Material::from_params(&MaterialParams::default()),
        ));
        let second = scene.replace_mesh(TextMesh::new(
            tiny_geometry(),
            Material::from_params(&MaterialParams::default()),
        ));
        assert_ne!(first, second);
        assert_eq!(scene.mesh().map(|m| m.id), Some(second));
    }

    #[test]
    fn test_replace_mesh_releases_old_geometry() {
        let mut scene = SceneState::new();
        let geometry = tiny_geometry();
        scene.replace_mesh(TextMesh::new(
            Arc::clone(&geometry),
            Material::from_params(&MaterialParams::default()),
        ));
        assert_eq!(Arc::strong_count(&geometry), 2);

        scene.replace_mesh(TextMesh::new(
            tiny_geometry(),
            Material::from_params(&MaterialParams::default()),
        ));
        assert_eq!(Arc::strong_count(&geometry), 1);
    }

    #[test]
    fn test_material_patch_sets_dirty_flag() {
        let mut material = Material::from_params(&MaterialParams::default());
        assert!(!material.needs_update);

        let mut params = MaterialParams::default();
        params.roughness = 0.9;
        material.patch(&params);
        assert!(material.needs_update);
        assert_eq!(material.roughness, 0.9);
    }

    #[test]
    fn test_world_bounds_follow_translation() {
        let mut mesh = TextMesh::new(
            tiny_geometry(),
            Material::from_params(&MaterialParams::default()),
        );
        mesh.translation = Vec3::new(0.0, 0.0, 5.0);
        assert_eq!(mesh.world_bounds().min.z, 5.0);
    }

    #[test]
    fn test_default_lights_match_viewer_rig() {
        let rig = LightRig::default();
        assert_eq!(rig.ambient_intensity, 0.8);
        assert_eq!(rig.directional.position, Vec3::new(5.0, 10.0, 5.0));
    }
}
