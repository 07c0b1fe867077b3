use glam::{DQuat, DVec3, EulerRot, Mat4};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a container or render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height. Callers check `is_empty` first.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Euler rotation in radians, applied about X, then Y, then Z (intrinsic).
///
/// Angles are kept as-is; a value of 7.0 is not folded back into `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerRotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerRotation {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn to_quat(&self) -> DQuat {
        DQuat::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: EulerRotation,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: EulerRotation::ZERO,
            scale: DVec3::ONE,
        }
    }
}

impl Transform {
    /// Model matrix in GPU precision (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.as_vec3(),
            self.rotation.to_quat().as_quat(),
            self.position.as_vec3(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn size_aspect_and_empty() {
        let s = Size::new(1024, 768);
        assert_eq!(s.aspect(), 1024.0 / 768.0);
        assert!(!s.is_empty());
        assert!(Size::new(0, 10).is_empty());
        assert!(Size::new(10, 0).is_empty());
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, DVec3::ZERO);
        assert_eq!(t.rotation, EulerRotation::ZERO);
        assert_eq!(t.scale, DVec3::ONE);
        assert!(t.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn rotation_about_y_turns_x_into_minus_z() {
        let t = Transform {
            rotation: EulerRotation {
                y: std::f64::consts::FRAC_PI_2,
                ..EulerRotation::ZERO
            },
            ..Transform::default()
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn euler_order_is_x_then_y() {
        let r = EulerRotation {
            x: 0.3,
            y: 0.7,
            z: 0.0,
        };
        let expected = DQuat::from_rotation_x(0.3) * DQuat::from_rotation_y(0.7);
        assert!(r.to_quat().abs_diff_eq(expected, 1e-12));
    }

    #[test]
    fn large_angles_are_not_wrapped() {
        let r = EulerRotation {
            x: 50.0,
            y: 100.0,
            z: 0.0,
        };
        assert_eq!(r.x, 50.0);
        assert_eq!(r.y, 100.0);
    }
}
