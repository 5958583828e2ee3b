use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use wavescope_common::{Color, ObjectId, Transform, Viewport};

use crate::camera::CameraPose;

/// Fraction of the smaller viewport dimension covered by the display rect.
pub const DISPLAY_FILL: f32 = 0.9;

/// Milliseconds of elapsed time per radian of wave phase.
const PHASE_PERIOD_MS: f32 = 100.0;

/// Rejected `update` input. The scene state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("elapsed time must be non-negative, got {0}")]
    NegativeElapsed(i64),
    #[error("viewport dimensions must be non-negative, got {width}x{height}")]
    NegativeViewport { width: i32, height: i32 },
    #[error("elapsed time regressed from {previous} to {requested}")]
    ElapsedRegression { previous: u64, requested: u64 },
}

/// The centered square region the scene is displayed in, in pixels.
///
/// Covers [`DISPLAY_FILL`] of the smaller viewport dimension; collapses to
/// zero size for a degenerate viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub bottom: f32,
    pub top: f32,
    pub left: f32,
    pub right: f32,
}

impl DisplayRect {
    pub fn from_viewport(viewport: Viewport) -> Self {
        let width = viewport.width as f32;
        let height = viewport.height as f32;
        let size = DISPLAY_FILL * viewport.min_dimension() as f32;
        Self {
            bottom: (height - size) / 2.0,
            top: (height + size) / 2.0,
            left: (width - size) / 2.0,
            right: (width + size) / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// What an object is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Animated wave-surface grid with `resolution` cells per side.
    Surface { resolution: usize },
    /// Flat colored backdrop quad.
    Panel { color: Color },
}

/// Constant-rate rotation around a fixed axis.
///
/// The derived pose is a pure function of elapsed time, never an
/// accumulation, so repeated updates at the same time are exact no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    axis: Vec3,
    radians_per_sec: f32,
}

impl Spin {
    /// A spin around `axis` (normalized here; falls back to +Y for a
    /// zero-length axis).
    pub fn new(axis: Vec3, radians_per_sec: f32) -> Self {
        Self {
            axis: axis.try_normalize().unwrap_or(Vec3::Y),
            radians_per_sec,
        }
    }

    pub fn angle_at(&self, elapsed_ms: u64) -> f32 {
        self.radians_per_sec * (elapsed_ms as f32 / 1000.0)
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }
}

/// One renderable object: immutable identity, mutable pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    id: ObjectId,
    kind: ObjectKind,
    /// Authored transform, only changed through `set_transform`.
    base: Transform,
    /// Current pose, recomputed from `base` and elapsed time each update.
    pose: Transform,
    spin: Option<Spin>,
}

impl SceneObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn base(&self) -> Transform {
        self.base
    }

    pub fn pose(&self) -> Transform {
        self.pose
    }

    pub fn spin(&self) -> Option<Spin> {
        self.spin
    }

    fn pose_at(&self, elapsed_ms: u64) -> Transform {
        match self.spin {
            None => self.base,
            Some(spin) => Transform {
                rotation: self.base.rotation
                    * Quat::from_axis_angle(spin.axis(), spin.angle_at(elapsed_ms)),
                ..self.base
            },
        }
    }
}

/// All mutable simulation data: camera pose, ordered objects, viewport,
/// elapsed time, and the values derived from them.
///
/// Mutated in place by every accepted update; read-only for the render
/// step. Objects draw in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    camera: CameraPose,
    objects: Vec<SceneObject>,
    viewport: Viewport,
    elapsed_ms: u64,
    display_rect: DisplayRect,
    phase: f32,
}

impl SceneState {
    /// Empty scene: identity camera, no objects, elapsed time 0.
    pub fn new() -> Self {
        Self {
            camera: CameraPose::default(),
            objects: Vec::new(),
            viewport: Viewport::default(),
            elapsed_ms: 0,
            display_rect: DisplayRect::default(),
            phase: 0.0,
        }
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraPose {
        &mut self.camera
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn display_rect(&self) -> DisplayRect {
        self.display_rect
    }

    /// Current wave phase in radians, `elapsed_ms / 100`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Add an object at the end of the draw order. Returns its id.
    pub fn spawn(&mut self, kind: ObjectKind, transform: Transform) -> ObjectId {
        let id = ObjectId::new();
        self.objects.push(SceneObject {
            id,
            kind,
            base: transform,
            pose: transform,
            spin: None,
        });
        id
    }

    /// Remove an object, keeping the relative order of the survivors.
    pub fn despawn(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Replace an object's authored transform. Returns false for an
    /// unknown id.
    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) -> bool {
        let elapsed = self.elapsed_ms;
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(object) => {
                object.base = transform;
                object.pose = object.pose_at(elapsed);
                true
            }
            None => false,
        }
    }

    /// Attach a spin animation. Returns false for an unknown id.
    pub fn set_spin(&mut self, id: ObjectId, spin: Spin) -> bool {
        let elapsed = self.elapsed_ms;
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(object) => {
                object.spin = Some(spin);
                object.pose = object.pose_at(elapsed);
                true
            }
            None => false,
        }
    }

    /// The update step: validate, then advance to the given elapsed time
    /// and viewport.
    ///
    /// Validation precedes any mutation; on error the state is exactly what
    /// it was before the call. Equal elapsed time is the steady-state case
    /// under a throttled caller and recomputes to identical values.
    pub fn advance(
        &mut self,
        elapsed_ms: i64,
        height: i32,
        width: i32,
    ) -> Result<(), InvalidInput> {
        if elapsed_ms < 0 {
            return Err(InvalidInput::NegativeElapsed(elapsed_ms));
        }
        if width < 0 || height < 0 {
            return Err(InvalidInput::NegativeViewport { width, height });
        }
        let elapsed = elapsed_ms as u64;
        if elapsed < self.elapsed_ms {
            return Err(InvalidInput::ElapsedRegression {
                previous: self.elapsed_ms,
                requested: elapsed,
            });
        }

        self.elapsed_ms = elapsed;
        self.viewport = Viewport::new(width as u32, height as u32);
        self.display_rect = DisplayRect::from_viewport(self.viewport);
        self.phase = elapsed as f32 / PHASE_PERIOD_MS;
        for object in &mut self.objects {
            let pose = object.pose_at(elapsed);
            object.pose = pose;
        }

        tracing::trace!(
            elapsed_ms = elapsed,
            width = self.viewport.width,
            height = self.viewport.height,
            objects = self.objects.len(),
            "scene advanced"
        );
        Ok(())
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_starts_empty() {
        let scene = SceneState::new();
        assert_eq!(scene.object_count(), 0);
        assert_eq!(scene.elapsed_ms(), 0);
        assert_eq!(scene.viewport(), Viewport::default());
        assert_eq!(*scene.camera(), CameraPose::default());
    }

    #[test]
    fn spawn_and_despawn_keep_order() {
        let mut scene = SceneState::new();
        let a = scene.spawn(ObjectKind::Panel { color: Color::BLACK }, Transform::default());
        let b = scene.spawn(ObjectKind::Surface { resolution: 10 }, Transform::default());
        let c = scene.spawn(ObjectKind::Panel { color: Color::DEEP_BLUE }, Transform::default());

        assert_eq!(scene.object_count(), 3);
        scene.despawn(b);
        let ids: Vec<ObjectId> = scene.objects().iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(scene.get(b).is_none());
    }

    #[test]
    fn negative_elapsed_rejected_state_unchanged() {
        let mut scene = SceneState::new();
        scene.spawn(ObjectKind::Surface { resolution: 4 }, Transform::default());
        scene.advance(100, 600, 800).unwrap();

        let before = scene.clone();
        let err = scene.advance(-1, 600, 800).unwrap_err();
        assert_eq!(err, InvalidInput::NegativeElapsed(-1));
        assert_eq!(scene, before);
    }

    #[test]
    fn negative_viewport_rejected_state_unchanged() {
        let mut scene = SceneState::new();
        scene.advance(10, 600, 800).unwrap();

        let before = scene.clone();
        let err = scene.advance(20, -5, 800).unwrap_err();
        assert!(matches!(err, InvalidInput::NegativeViewport { .. }));
        assert_eq!(scene, before);
    }

    #[test]
    fn elapsed_regression_rejected() {
        let mut scene = SceneState::new();
        scene.advance(100, 600, 800).unwrap();

        let before = scene.clone();
        let err = scene.advance(50, 600, 800).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::ElapsedRegression {
                previous: 100,
                requested: 50
            }
        );
        assert_eq!(scene, before);
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let mut scene = SceneState::new();
        let id = scene.spawn(ObjectKind::Surface { resolution: 8 }, Transform::default());
        scene.set_spin(id, Spin::new(Vec3::Y, 1.0));

        scene.advance(16, 600, 800).unwrap();
        let after_first = scene.clone();
        scene.advance(16, 600, 800).unwrap();
        assert_eq!(scene, after_first);
    }

    #[test]
    fn spin_pose_is_pure_in_elapsed_time() {
        let mut scene = SceneState::new();
        let id = scene.spawn(ObjectKind::Panel { color: Color::BLACK }, Transform::default());
        scene.set_spin(id, Spin::new(Vec3::Y, std::f32::consts::PI));

        scene.advance(500, 600, 800).unwrap();
        let half_turn = scene.get(id).unwrap().pose();
        scene.advance(1500, 600, 800).unwrap();
        scene.advance(2500, 600, 800).unwrap();

        // 2500 ms at pi rad/s differs from 500 ms by a full turn.
        let full_cycle = scene.get(id).unwrap().pose();
        assert!(half_turn.rotation.dot(full_cycle.rotation).abs() > 0.999);
    }

    #[test]
    fn zero_viewport_is_tolerated() {
        let mut scene = SceneState::new();
        scene.advance(100, 600, 800).unwrap();
        scene.advance(200, 0, 0).unwrap();

        assert_eq!(scene.viewport(), Viewport::new(0, 0));
        let rect = scene.display_rect();
        assert_eq!(rect.width(), 0.0);
        assert_eq!(rect.height(), 0.0);
        assert!(scene.viewport().aspect().is_finite());
    }

    #[test]
    fn display_rect_centers_square() {
        let rect = DisplayRect::from_viewport(Viewport::new(800, 600));
        // 0.9 * 600 = 540, centered in both axes.
        assert_eq!(rect.bottom, 30.0);
        assert_eq!(rect.top, 570.0);
        assert_eq!(rect.left, 130.0);
        assert_eq!(rect.right, 670.0);
        assert_eq!(rect.width(), rect.height());
    }

    #[test]
    fn phase_tracks_elapsed_time() {
        let mut scene = SceneState::new();
        scene.advance(250, 600, 800).unwrap();
        assert!((scene.phase() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn set_transform_updates_pose() {
        let mut scene = SceneState::new();
        let id = scene.spawn(ObjectKind::Panel { color: Color::BLACK }, Transform::default());
        let moved = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..Transform::default()
        };
        assert!(scene.set_transform(id, moved));
        assert_eq!(scene.get(id).unwrap().pose().translation, moved.translation);
        assert!(!scene.set_transform(ObjectId::new(), moved));
    }
}
