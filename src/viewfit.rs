use glam::Vec3;

use crate::camera::{OrbitAnchor, PerspectiveCamera};
use crate::scene::TextMesh;

/// Extra distance so the mesh does not touch the viewport edges.
pub const MARGIN_FACTOR: f32 = 1.5;

/// The camera sits slightly above the mesh, looking down at it.
pub const VERTICAL_OFFSET_FACTOR: f32 = 0.5;

/// Extents below this are treated as degenerate and clamped, keeping the
/// fit finite for single-dot or zero-area meshes.
pub const MIN_EXTENT: f32 = 1e-4;

/// Distance at which a span of `max_dim` fills the vertical field of view,
/// scaled by [`MARGIN_FACTOR`].
pub fn fitting_distance(max_dim: f32, fov_y_deg: f32) -> f32 {
    let span = max_dim.max(MIN_EXTENT);
    let half_fov = fov_y_deg.to_radians() / 2.0;
    span / (2.0 * half_fov.tan()) * MARGIN_FACTOR
}

/// Recenters the mesh at the world origin and places the camera so the whole
/// mesh is in frame. The orbit anchor follows the camera target so the next
/// drag rotates around the newly framed mesh.
pub fn fit_view(mesh: &mut TextMesh, camera: &mut PerspectiveCamera, orbit: &mut OrbitAnchor) {
    let bounds = mesh.world_bounds();

    // Move the mesh, not the camera target: keeping the pivot at the origin
    // means the look-at math never accumulates drift across regenerations.
    mesh.translation -= bounds.center();

    let max_dim = bounds.max_extent().max(MIN_EXTENT);
    let distance = fitting_distance(max_dim, camera.fov_y_deg);

    camera.position = Vec3::new(0.0, max_dim * VERTICAL_OFFSET_FACTOR, distance);
    camera.look_at(Vec3::ZERO);
    orbit.sync(Vec3::ZERO);
}
