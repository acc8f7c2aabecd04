use glam::Vec3;

pub const DEFAULT_FOV_Y_DEG: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Camera position before any mesh has been framed.
pub const INITIAL_POSITION: Vec3 = Vec3::new(0.0, 2.0, 6.0);

#[derive(Clone, Copy, Debug)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new() -> Self {
        Self {
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            aspect: 800.0 / 600.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            position: INITIAL_POSITION,
            target: Vec3::ZERO,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn fov_y_rad(&self) -> f32 {
        self.fov_y_deg.to_radians()
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.target - self.position).length()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Pivot the interactive orbit controls revolve around. Kept separate from
/// the camera because framing must update both in lockstep.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrbitAnchor {
    pub target: Vec3,
}

impl OrbitAnchor {
    pub fn sync(&mut self, target: Vec3) {
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = PerspectiveCamera::new();
        assert_eq!(camera.fov_y_deg, 45.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, Vec3::new(0.0, 2.0, 6.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_set_viewport_updates_aspect() {
        let mut camera = PerspectiveCamera::new();
        camera.set_viewport(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_viewport_survives_zero_height() {
        let mut camera = PerspectiveCamera::new();
        camera.set_viewport(800, 0);
        assert!(camera.aspect.is_finite());
    }

    #[test]
    fn test_forward_points_at_target() {
        let mut camera = PerspectiveCamera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.look_at(Vec3::ZERO);
        let forward = camera.forward();
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }
}
