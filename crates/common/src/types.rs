use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a renderable object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial transform: translation, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Viewport dimensions in physical pixels. Zero is legal on both axes
/// (a minimized or not-yet-laid-out host window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero. Degenerate viewports pause all
    /// scale-dependent computation; they never cause a division by zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Width/height ratio, falling back to 1.0 when either dimension is zero.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// The backdrop panel color of the reference scene.
    pub const DEEP_BLUE: Self = Self::new(0.0, 0.0, 0.5, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.translation, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn viewport_aspect_never_divides_by_zero() {
        assert_eq!(Viewport::new(0, 0).aspect(), 1.0);
        assert_eq!(Viewport::new(800, 0).aspect(), 1.0);
        assert_eq!(Viewport::new(800, 600).aspect(), 800.0 / 600.0);
    }

    #[test]
    fn viewport_empty() {
        assert!(Viewport::new(0, 600).is_empty());
        assert!(!Viewport::new(800, 600).is_empty());
        assert_eq!(Viewport::new(800, 600).min_dimension(), 600);
    }

    #[test]
    fn color_to_array() {
        assert_eq!(Color::DEEP_BLUE.to_array(), [0.0, 0.0, 0.5, 1.0]);
    }
}
