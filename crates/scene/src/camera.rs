use glam::{DMat4, DVec3, Mat4};

/// Perspective camera looking from `position` towards `target`.
///
/// `fov` is the vertical field of view in degrees. The projection matrix is
/// cached: after changing `fov`, `aspect`, `near` or `far`, call
/// [`update_projection_matrix`](Self::update_projection_matrix).
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: DVec3,
    pub target: DVec3,
    pub up: DVec3,
    projection: DMat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut cam = Self {
            fov,
            aspect,
            near,
            far,
            position: DVec3::ZERO,
            target: DVec3::NEG_Z,
            up: DVec3::Y,
            projection: DMat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Vertical fov (degrees) at which a plane `distance` units away spans
    /// exactly `viewport_height` world units, so one unit maps to one pixel.
    pub fn fov_for_pixel_plane(viewport_height: f64, distance: f64) -> f64 {
        2.0 * (viewport_height / 2.0 / distance).atan() * (180.0 / std::f64::consts::PI)
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            DMat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: DVec3) {
        self.target = target;
    }

    /// Unit vector from the camera towards its target.
    pub fn forward(&self) -> DVec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(DVec3::NEG_Z)
    }

    pub fn distance_to_target(&self) -> f64 {
        self.position.distance(self.target)
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        self.projection
    }

    /// Combined matrix in GPU precision.
    pub fn view_projection(&self) -> Mat4 {
        (self.projection * self.view_matrix()).as_mat4()
    }
}
