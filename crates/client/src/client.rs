use wavescope_common::{ObjectId, Transform};
use wavescope_render::{render_frame, FrameStats, GraphicsContext, RenderError};
use wavescope_scene::{CameraPose, InvalidInput, ObjectKind, SceneState, Spin};

/// The engine facade: one scene state plus an optionally bound graphics
/// context, dispatching the update and render steps.
///
/// Two logical states: `Uninitialized` (no context yet) and `Ready`.
/// Binding a context is the only transition; `render` in the
/// uninitialized state fails with [`RenderError::ContextUnavailable`].
pub struct Client<C: GraphicsContext> {
    scene: SceneState,
    context: Option<C>,
}

impl<C: GraphicsContext> Client<C> {
    /// New client with a fresh scene (identity camera, no objects,
    /// elapsed time 0) and no context bound. Never fails.
    pub fn new() -> Self {
        Self {
            scene: SceneState::new(),
            context: None,
        }
    }

    /// New client that is immediately ready to render.
    pub fn with_context(context: C) -> Self {
        Self {
            scene: SceneState::new(),
            context: Some(context),
        }
    }

    /// Bind (or replace) the graphics context. Replacement supports
    /// drivers that recreate a lost context.
    pub fn bind_context(&mut self, context: C) {
        let replaced = self.context.is_some();
        self.context = Some(context);
        tracing::debug!(replaced, "graphics context bound");
    }

    pub fn is_ready(&self) -> bool {
        self.context.is_some()
    }

    /// Mutable access to the bound context, for driver-side operations
    /// such as surface reconfiguration on resize.
    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    /// Add an object to the scene. Drawn after all earlier objects.
    pub fn spawn(&mut self, kind: ObjectKind, transform: Transform) -> ObjectId {
        self.scene.spawn(kind, transform)
    }

    pub fn despawn(&mut self, id: ObjectId) -> bool {
        self.scene.despawn(id).is_some()
    }

    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) -> bool {
        self.scene.set_transform(id, transform)
    }

    pub fn set_spin(&mut self, id: ObjectId, spin: Spin) -> bool {
        self.scene.set_spin(id, spin)
    }

    pub fn set_camera(&mut self, camera: CameraPose) {
        *self.scene.camera_mut() = camera;
    }

    /// Advance the scene to the given elapsed time and viewport.
    ///
    /// Negative input or an elapsed-time regression is rejected with
    /// [`InvalidInput`] and the prior state is fully retained. Repeating a
    /// call with identical arguments is an exact no-op on time-derived
    /// state.
    pub fn update(&mut self, elapsed_ms: i64, height: i32, width: i32) -> Result<(), InvalidInput> {
        self.scene.advance(elapsed_ms, height, width)
    }

    /// Render the current scene through the bound context.
    ///
    /// Reads the scene, never mutates it. Completes synchronously; a
    /// missing context fails before any context call is issued.
    pub fn render(&mut self) -> Result<FrameStats, RenderError> {
        match self.context.as_mut() {
            None => Err(RenderError::ContextUnavailable),
            Some(ctx) => render_frame(&self.scene, ctx),
        }
    }
}

impl<C: GraphicsContext> Default for Client<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use wavescope_common::{Color, Viewport};
    use wavescope_render::{RecordedCall, RecordingContext, CLEAR_COLOR};

    #[test]
    fn render_before_binding_fails_with_no_calls() {
        let mut client: Client<RecordingContext> = Client::new();
        client.update(0, 600, 800).unwrap();

        let err = client.render().unwrap_err();
        assert!(matches!(err, RenderError::ContextUnavailable));
        assert!(client.context_mut().is_none());
    }

    #[test]
    fn binding_makes_client_ready() {
        let mut client = Client::new();
        assert!(!client.is_ready());
        client.bind_context(RecordingContext::new());
        assert!(client.is_ready());
    }

    #[test]
    fn fresh_client_renders_empty_frame() {
        let mut client = Client::with_context(RecordingContext::new());
        client.update(0, 600, 800).unwrap();

        let stats = client.render().unwrap();
        assert_eq!(stats.drawn, 0);

        let ctx = client.context_mut().unwrap();
        assert_eq!(
            ctx.calls(),
            &[
                RecordedCall::SetViewport(Viewport::new(800, 600)),
                RecordedCall::Clear(CLEAR_COLOR),
                RecordedCall::Finish,
            ]
        );
    }

    #[test]
    fn update_render_cycle_draws_spawned_objects() {
        let mut client = Client::with_context(RecordingContext::new());
        let panel = client.spawn(
            ObjectKind::Panel { color: Color::DEEP_BLUE },
            Transform::default(),
        );
        let surface = client.spawn(ObjectKind::Surface { resolution: 8 }, Transform::default());

        client.update(33, 600, 800).unwrap();
        let stats = client.render().unwrap();
        assert_eq!(stats.drawn, 2);
        assert!(stats.is_clean());

        let ctx = client.context_mut().unwrap();
        assert_eq!(ctx.drawn_objects(), vec![panel, surface]);
    }

    #[test]
    fn invalid_update_keeps_prior_state() {
        let mut client = Client::with_context(RecordingContext::new());
        client.spawn(ObjectKind::Surface { resolution: 4 }, Transform::default());
        client.update(100, 600, 800).unwrap();

        assert!(client.update(-7, 600, 800).is_err());
        assert!(client.update(50, 600, 800).is_err());
        assert_eq!(client.scene().elapsed_ms(), 100);
        assert_eq!(client.scene().viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn steady_state_updates_are_idempotent() {
        let mut client = Client::with_context(RecordingContext::new());
        let id = client.spawn(ObjectKind::Panel { color: Color::BLACK }, Transform::default());
        client.set_spin(id, Spin::new(Vec3::Y, 2.0));

        client.update(16, 600, 800).unwrap();
        let pose = client.scene().get(id).unwrap().pose();
        client.update(16, 600, 800).unwrap();
        assert_eq!(client.scene().get(id).unwrap().pose(), pose);
    }

    #[test]
    fn despawned_object_is_not_drawn() {
        let mut client = Client::with_context(RecordingContext::new());
        let keep = client.spawn(ObjectKind::Panel { color: Color::BLACK }, Transform::default());
        let gone = client.spawn(ObjectKind::Surface { resolution: 4 }, Transform::default());
        assert!(client.despawn(gone));

        client.update(10, 600, 800).unwrap();
        client.render().unwrap();
        let ctx = client.context_mut().unwrap();
        assert_eq!(ctx.drawn_objects(), vec![keep]);
    }

    #[test]
    fn zero_viewport_session_survives() {
        let mut client = Client::with_context(RecordingContext::new());
        client.spawn(ObjectKind::Surface { resolution: 4 }, Transform::default());

        client.update(100, 600, 800).unwrap();
        client.render().unwrap();
        client.update(200, 0, 0).unwrap();
        let stats = client.render().unwrap();
        assert_eq!(stats.drawn, 1);

        let ctx = client.context_mut().unwrap();
        assert!(ctx
            .calls()
            .contains(&RecordedCall::SetViewport(Viewport::new(0, 0))));
    }
}
