use bytemuck::cast_slice;
use glam::{Quat, Vec3};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::export::{ExportOptions, ExportScope};
use crate::scene::SceneState;

const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_F32: u32 = 5126;
const COMPONENT_U32: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const MODE_TRIANGLES: u32 = 4;

const GENERATOR: &str = concat!("glyphcast ", env!("CARGO_PKG_VERSION"));

struct BinBuilder {
    bin: Vec<u8>,
    views: Vec<Value>,
}

impl BinBuilder {
    fn new() -> Self {
        Self {
            bin: Vec::new(),
            views: Vec::new(),
        }
    }

    /// Appends a byte run as a buffer view, 4-aligned so accessor offsets
    /// stay legal for f32 and u32 components.
    fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        let mut view = json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        });
        if let Some(target) = target {
            view["target"] = json!(target);
        }
        self.views.push(view);
        self.views.len() - 1
    }
}

/// Serializes the scene's mesh (and, in full scope, its lights) into a
/// self-contained binary glTF payload. Fails if no mesh is attached.
pub fn encode_glb(scene: &SceneState, options: &ExportOptions) -> Result<Vec<u8>> {
    let mesh = scene
        .mesh()
        .ok_or_else(|| Error::Export("no mesh attached".to_string()))?;
    let geometry = &mesh.geometry;
    let material = &mesh.material;

    let mut bin = BinBuilder::new();
    let positions = bin.push_view(cast_slice(geometry.positions()), Some(TARGET_ARRAY_BUFFER));
    let normals = bin.push_view(cast_slice(geometry.normals()), Some(TARGET_ARRAY_BUFFER));
    let uvs = bin.push_view(cast_slice(geometry.uvs()), Some(TARGET_ARRAY_BUFFER));
    let indices = bin.push_view(
        cast_slice(geometry.indices()),
        Some(TARGET_ELEMENT_ARRAY_BUFFER),
    );

    let bounds = geometry.bounds();
    let accessors = json!([
        {
            "bufferView": positions,
            "componentType": COMPONENT_F32,
            "count": geometry.vertex_count(),
            "type": "VEC3",
            "min": [bounds.min.x, bounds.min.y, bounds.min.z],
            "max": [bounds.max.x, bounds.max.y, bounds.max.z],
        },
        {
            "bufferView": normals,
            "componentType": COMPONENT_F32,
            "count": geometry.vertex_count(),
            "type": "VEC3",
        },
        {
            "bufferView": uvs,
            "componentType": COMPONENT_F32,
            "count": geometry.vertex_count(),
            "type": "VEC2",
        },
        {
            "bufferView": indices,
            "componentType": COMPONENT_U32,
            "count": geometry.indices().len(),
            "type": "SCALAR",
        },
    ]);

    // The factor multiplies the texture, exactly as the live material
    // multiplies color and map.
    let mut material_json = json!({
        "name": "text-material",
        "pbrMetallicRoughness": {
            "baseColorFactor": [
                material.base_color.r,
                material.base_color.g,
                material.base_color.b,
                1.0,
            ],
            "metallicFactor": material.metalness,
            "roughnessFactor": material.roughness,
        },
    });

    let mut root = json!({
        "asset": {
            "version": "2.0",
            "generator": GENERATOR,
            "extras": { "exportedAt": chrono::Utc::now().to_rfc3339() },
        },
        "scene": 0,
        "meshes": [{
            "name": "text",
            "primitives": [{
                "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 },
                "indices": 3,
                "material": 0,
                "mode": MODE_TRIANGLES,
            }],
        }],
    });

    if let Some(map) = &material.map {
        let image_view = bin.push_view(&map.png, None);
        material_json["pbrMetallicRoughness"]["baseColorTexture"] = json!({ "index": 0 });
        root["samplers"] = json!([{}]);
        root["images"] = json!([{ "mimeType": "image/png", "bufferView": image_view }]);
        root["textures"] = json!([{ "sampler": 0, "source": 0 }]);
    }
    root["materials"] = json!([material_json]);

    let mesh_node = json!({
        "name": "text",
        "mesh": 0,
        "translation": [mesh.translation.x, mesh.translation.y, mesh.translation.z],
    });

    match options.scope {
        ExportScope::MeshOnly => {
            root["nodes"] = json!([mesh_node]);
            root["scenes"] = json!([{ "nodes": [0] }]);
        }
        ExportScope::FullScene => {
            let light = scene.lights.directional;
            let direction = (-light.position).normalize_or_zero();
            let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
            let light_node = json!({
                "name": "key-light",
                "translation": [light.position.x, light.position.y, light.position.z],
                "rotation": [rotation.x, rotation.y, rotation.z, rotation.w],
                "extensions": { "KHR_lights_punctual": { "light": 0 } },
            });

            root["nodes"] = json!([mesh_node, light_node]);
            root["scenes"] = json!([{
                "nodes": [0, 1],
                "extras": {
                    "ambient": {
                        "color": scene.lights.ambient_color.to_array(),
                        "intensity": scene.lights.ambient_intensity,
                    },
                },
            }]);
            root["extensionsUsed"] = json!(["KHR_lights_punctual"]);
            root["extensions"] = json!({
                "KHR_lights_punctual": {
                    "lights": [{
                        "type": "directional",
                        "color": light.color.to_array(),
                        "intensity": light.intensity,
                        "name": "key",
                    }],
                },
            });
        }
    }

    root["accessors"] = accessors;
    root["bufferViews"] = Value::Array(bin.views);
    root["buffers"] = json!([{ "byteLength": bin.bin.len() }]);

    write_glb(&root, &bin.bin)
}

/// Assembles the two-chunk GLB container: 12-byte header, JSON chunk padded
/// with spaces, binary chunk padded with zeros.
fn write_glb(root: &Value, bin: &[u8]) -> Result<Vec<u8>> {
    let mut json_bytes = serde_json::to_vec(root).map_err(|e| Error::Export(e.to_string()))?;
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    let mut bin_bytes = bin.to_vec();
    while bin_bytes.len() % 4 != 0 {
        bin_bytes.push(0);
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin_bytes.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_bytes);

    out.extend_from_slice(&(bin_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin_bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_glb_header_and_padding() {
        let root = json!({ "asset": { "version": "2.0" } });
        let out = write_glb(&root, &[1, 2, 3]).unwrap();

        assert_eq!(&out[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(out[8..12].try_into().unwrap()) as usize,
            out.len()
        );

        let json_len = u32::from_le_bytes(out[12..16].try_into().unwrap()) as usize;
        assert_eq!(json_len % 4, 0);
        assert_eq!(u32::from_le_bytes(out[16..20].try_into().unwrap()), CHUNK_JSON);

        let bin_len_at = 20 + json_len;
        let bin_len =
            u32::from_le_bytes(out[bin_len_at..bin_len_at + 4].try_into().unwrap()) as usize;
        assert_eq!(bin_len % 4, 0);
        assert_eq!(
            u32::from_le_bytes(out[bin_len_at + 4..bin_len_at + 8].try_into().unwrap()),
            CHUNK_BIN
        );
        // Zero-padded binary payload.
        assert_eq!(&out[bin_len_at + 8..], &[1, 2, 3, 0]);
    }

    #[test]
    fn test_json_chunk_is_space_padded() {
        let root = json!({ "a": 1 });
        let out = write_glb(&root, &[]).unwrap();
        let json_len = u32::from_le_bytes(out[12..16].try_into().unwrap()) as usize;
        let json_text = std::str::from_utf8(&out[20..20 + json_len]).unwrap();
        assert!(json_text.trim_end().ends_with('}'));
        assert!(json_text.len() == json_text.trim_end().len() || json_text.ends_with(' '));
    }
}
