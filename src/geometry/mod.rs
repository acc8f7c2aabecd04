mod extrude;
mod outline;

pub use extrude::{ExtrudedTextEngine, TextEngine, BEVEL_SEGMENTS, GLYPH_SIZE};

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::math::Aabb;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one built geometry. Survives into exports and
/// logs so a rebuilt mesh is distinguishable from the one it replaced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Indexed triangle mesh for one piece of extruded text. Immutable once
/// built; regeneration always produces a fresh geometry with a fresh id.
#[derive(Debug)]
pub struct TextGeometry {
    id: GeometryId,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl TextGeometry {
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        debug_assert_eq!(positions.len(), uvs.len());
        debug_assert_eq!(indices.len() % 3, 0);
        let bounds = Aabb::from_points(positions.iter().map(|p| Vec3::from_array(*p)));
        Self {
            id: GeometryId::next(),
            positions,
            normals,
            uvs,
            indices,
            bounds,
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Object-space bounding box, cached at construction.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
