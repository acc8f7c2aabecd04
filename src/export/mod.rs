mod glb;

pub use glb::encode_glb;

use crate::error::{Error, Result};

/// File name the viewer's download defaults to.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "3d-text.glb";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Just the text mesh with its material.
    #[default]
    MeshOnly,
    /// Mesh plus the light rig, for viewers that honor KHR_lights_punctual.
    FullScene,
}

#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub scope: ExportScope,
}

/// What a re-import of an exported file found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub images: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Parses `bytes` back through the glTF importer and tallies what is in
/// them. Used by the `--validate` flag to prove the written file loads.
pub fn validate_glb(bytes: &[u8]) -> Result<ModelStats> {
    let (document, buffers, images) =
        gltf::import_slice(bytes).map_err(|e| Error::Export(format!("re-import failed: {e}")))?;

    let mut vertices = 0;
    let mut triangles = 0;
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            if let Some(positions) = reader.read_positions() {
                vertices += positions.count();
            }
            if let Some(indices) = reader.read_indices() {
                triangles += indices.into_u32().count() / 3;
            }
        }
    }

    Ok(ModelStats {
        nodes: document.nodes().count(),
        meshes: document.meshes().count(),
        materials: document.materials().count(),
        images: images.len(),
        vertices,
        triangles,
    })
}
