use crate::action::CameraAction;
use glam::DVec3;
use sketch_common::Size;
use sketch_scene::PerspectiveCamera;
use std::f64::consts::{PI, TAU};

/// Polar angle margin that keeps the camera off the poles.
const POLE_EPSILON: f64 = 1e-6;

/// Camera offset from the target in spherical coordinates (Y up).
///
/// `theta` is the azimuth around Y measured from +Z, `phi` the angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f64,
    theta: f64,
    phi: f64,
}

impl Spherical {
    fn from_offset(v: DVec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> DVec3 {
        let s = self.phi.sin() * self.radius;
        DVec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

/// Orbit camera controller: rotate around, dolly towards and pan across a target.
///
/// Controls apply each action straight to the camera (no damping), then
/// re-aim it at the target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: DVec3,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pub pan_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
    saved_target: DVec3,
    saved_position: DVec3,
}

impl OrbitControls {
    /// Attach to a camera, taking its current target and position as the reset state.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            enabled: true,
            target: camera.target,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            saved_target: camera.target,
            saved_position: camera.position,
        }
    }

    /// Apply one action. `viewport` is the size of the surface the pointer moved on.
    /// Returns true if the camera moved.
    pub fn apply(
        &mut self,
        camera: &mut PerspectiveCamera,
        action: CameraAction,
        viewport: Size,
    ) -> bool {
        if !self.enabled || viewport.is_empty() {
            return false;
        }
        let height = viewport.height as f64;
        match action {
            CameraAction::Rotate { dx, dy } => {
                self.rotate(camera, TAU * dx / height, TAU * dy / height)
            }
            CameraAction::Pan { dx, dy } => self.pan(camera, dx, dy, height),
            CameraAction::Dolly(steps) => self.dolly(camera, steps),
            CameraAction::Reset => {
                self.reset(camera);
                true
            }
            CameraAction::Noop => false,
        }
    }

    /// Restore the target and position saved at construction.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        self.target = self.saved_target;
        camera.position = self.saved_position;
        camera.look_at(self.target);
        tracing::debug!("orbit controls reset");
    }

    fn rotate(&mut self, camera: &mut PerspectiveCamera, left: f64, up: f64) -> bool {
        let mut s = Spherical::from_offset(camera.position - self.target);
        s.theta -= left * self.rotate_speed;
        s.phi -= up * self.rotate_speed;
        s.phi = s
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.place(camera, s);
        true
    }

    fn dolly(&mut self, camera: &mut PerspectiveCamera, steps: f64) -> bool {
        if steps == 0.0 {
            return false;
        }
        let scale = 0.95_f64.powf(self.zoom_speed * steps.abs());
        let mut s = Spherical::from_offset(camera.position - self.target);
        s.radius = if steps > 0.0 { s.radius * scale } else { s.radius / scale };
        s.radius = s.radius.clamp(self.min_distance, self.max_distance);
        self.place(camera, s);
        true
    }

    /// Shift camera and target so a drag of `dx, dy` pixels moves the target
    /// plane by the same number of pixels on screen.
    fn pan(&mut self, camera: &mut PerspectiveCamera, dx: f64, dy: f64, height: f64) -> bool {
        let offset = camera.position - self.target;
        let half_extent = offset.length() * (camera.fov.to_radians() / 2.0).tan();
        let forward = camera.forward();
        let right = forward.cross(camera.up).try_normalize().unwrap_or(DVec3::X);
        let up = right.cross(forward);

        let delta = (-right * (2.0 * dx * half_extent / height)
            + up * (2.0 * dy * half_extent / height))
            * self.pan_speed;
        self.target += delta;
        camera.position += delta;
        camera.look_at(self.target);
        true
    }

    fn place(&self, camera: &mut PerspectiveCamera, s: Spherical) {
        camera.position = self.target + s.to_offset();
        camera.look_at(self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_500() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(45.0, 1.0, 10.0, 2000.0);
        cam.position = DVec3::new(0.0, 0.0, 500.0);
        cam.look_at(DVec3::ZERO);
        cam
    }

    const VIEW: Size = Size::new(800, 800);

    #[test]
    fn spherical_round_trip() {
        let v = DVec3::new(3.0, -4.0, 12.0);
        assert!(Spherical::from_offset(v).to_offset().abs_diff_eq(v, 1e-9));
    }

    #[test]
    fn zero_rotate_keeps_camera() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Rotate { dx: 0.0, dy: 0.0 }, VIEW);
        assert!(cam.position.abs_diff_eq(DVec3::new(0.0, 0.0, 500.0), 1e-9));
    }

    #[test]
    fn quarter_height_drag_orbits_ninety_degrees() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Rotate { dx: 200.0, dy: 0.0 }, VIEW);
        assert!(cam.position.abs_diff_eq(DVec3::new(-500.0, 0.0, 0.0), 1e-9));
        assert_eq!(cam.target, DVec3::ZERO);
    }

    #[test]
    fn vertical_rotate_stops_at_pole() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Rotate { dx: 0.0, dy: 10_000.0 }, VIEW);
        assert!(cam.position.y > 499.0);
        assert!(cam.position.y < 500.0);
        assert!((cam.distance_to_target() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn dolly_in_and_out_are_inverse() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Dolly(1.0), VIEW);
        assert!((cam.distance_to_target() - 475.0).abs() < 1e-9);
        controls.apply(&mut cam, CameraAction::Dolly(-1.0), VIEW);
        assert!((cam.distance_to_target() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn dolly_respects_min_distance() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.min_distance = 400.0;
        controls.apply(&mut cam, CameraAction::Dolly(100.0), VIEW);
        assert!((cam.distance_to_target() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Pan { dx: 100.0, dy: 0.0 }, VIEW);
        assert!(controls.target.x < 0.0);
        assert!((cam.position.x - controls.target.x).abs() < 1e-9);
        assert!((cam.distance_to_target() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn pan_matches_pixels_at_target_depth() {
        let mut cam = PerspectiveCamera::new(
            PerspectiveCamera::fov_for_pixel_plane(800.0, 500.0),
            1.0,
            10.0,
            2000.0,
        );
        cam.position = DVec3::new(0.0, 0.0, 500.0);
        cam.look_at(DVec3::ZERO);
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Pan { dx: 0.0, dy: 40.0 }, VIEW);
        assert!((controls.target.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.enabled = false;
        assert!(!controls.apply(&mut cam, CameraAction::Dolly(3.0), VIEW));
        assert_eq!(cam.position, DVec3::new(0.0, 0.0, 500.0));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        controls.apply(&mut cam, CameraAction::Rotate { dx: 37.0, dy: 12.0 }, VIEW);
        controls.apply(&mut cam, CameraAction::Pan { dx: 5.0, dy: 5.0 }, VIEW);
        controls.apply(&mut cam, CameraAction::Reset, VIEW);
        assert_eq!(cam.position, DVec3::new(0.0, 0.0, 500.0));
        assert_eq!(controls.target, DVec3::ZERO);
        assert_eq!(cam.target, DVec3::ZERO);
    }

    #[test]
    fn empty_viewport_is_ignored() {
        let mut cam = camera_at_500();
        let mut controls = OrbitControls::new(&cam);
        assert!(!controls.apply(&mut cam, CameraAction::Rotate { dx: 1.0, dy: 1.0 }, Size::new(0, 0)));
    }
}
