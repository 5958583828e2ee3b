use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Camera pose and projection parameters.
///
/// The pose lives inside the scene state and is only changed through the
/// scene API by the embedding application; the engine itself never moves
/// the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Rotation around the X axis, radians.
    pub pitch: f32,
    /// Rotation around the Y axis, radians.
    pub yaw: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraPose {
    /// The slightly tilted view the reference scene uses.
    pub fn tilted() -> Self {
        Self {
            pitch: 0.5,
            yaw: 0.5,
            ..Self::default()
        }
    }

    /// Combined orientation: pitch applied first, then yaw.
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    pub fn rotate(&mut self, dpitch: f32, dyaw: f32) {
        self.pitch += dpitch;
        self.yaw += dyaw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity_pose() {
        let cam = CameraPose::default();
        assert_eq!(cam.position, Vec3::ZERO);
        assert_eq!(cam.pitch, 0.0);
        assert_eq!(cam.yaw, 0.0);
        assert_eq!(cam.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn tilted_pose() {
        let cam = CameraPose::tilted();
        assert_eq!(cam.pitch, 0.5);
        assert_eq!(cam.yaw, 0.5);
        assert_ne!(cam.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn rotate_accumulates() {
        let mut cam = CameraPose::default();
        cam.rotate(0.1, -0.2);
        cam.rotate(0.1, -0.2);
        assert!((cam.pitch - 0.2).abs() < 1e-6);
        assert!((cam.yaw + 0.4).abs() < 1e-6);
    }

    #[test]
    fn orientation_is_finite() {
        let cam = CameraPose::tilted();
        let q = cam.orientation();
        assert!(q.is_finite());
        assert!((q.length() - 1.0).abs() < 1e-5);
    }
}
