use wavescope_common::Color;
use wavescope_scene::{ObjectKind, SceneObject, SceneState};
use wavescope_surface::{
    grid_normals, height_field, model_matrix, normal_rotation, rect_transform, view_projection,
    WaveParams,
};

use crate::context::{DrawCall, DrawError, GraphicsContext, PanelDraw, RenderError, SurfaceDraw};

/// Background color issued by every frame.
pub const CLEAR_COLOR: Color = Color::BLACK;

/// A draw that failed, tagged with the object's index in draw order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawFailure {
    pub index: usize,
    pub error: DrawError,
}

/// Outcome of one rendered frame.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Objects successfully drawn.
    pub drawn: usize,
    /// Recoverable per-object failures, in draw order.
    pub failures: Vec<DrawFailure>,
}

impl FrameStats {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "drawn={} failures={}", self.drawn, self.failures.len())
    }
}

/// The render step: translate the scene into context calls.
///
/// Issues `set_viewport` once from the scene viewport, clears, then one
/// draw per object in insertion order. A failed draw is recorded and the
/// remaining objects still draw; failures of the whole-frame operations
/// abort with [`RenderError`]. The scene is never mutated.
pub fn render_frame<C: GraphicsContext>(
    scene: &SceneState,
    ctx: &mut C,
) -> Result<FrameStats, RenderError> {
    ctx.set_viewport(scene.viewport())?;
    ctx.clear(CLEAR_COLOR)?;

    let view_proj = view_projection(scene.camera(), scene.viewport(), scene.display_rect());
    let normals_rot = normal_rotation(scene.camera());
    let rect = rect_transform(scene.viewport(), scene.display_rect());

    let mut stats = FrameStats::default();
    for (index, object) in scene.objects().iter().enumerate() {
        let call = build_draw_call(object, scene.phase(), view_proj, normals_rot, rect);
        match ctx.draw(&call) {
            Ok(()) => stats.drawn += 1,
            Err(error) => {
                tracing::warn!(index, %error, "object draw failed, continuing frame");
                stats.failures.push(DrawFailure { index, error });
            }
        }
    }

    ctx.finish()?;
    tracing::trace!(drawn = stats.drawn, failed = stats.failures.len(), "frame complete");
    Ok(stats)
}

fn build_draw_call(
    object: &SceneObject,
    phase: f32,
    view_projection: glam::Mat4,
    normal_rotation: glam::Mat4,
    rect: glam::Mat4,
) -> DrawCall {
    let model = model_matrix(&object.pose());
    match object.kind() {
        ObjectKind::Surface { resolution } => {
            let params = WaveParams::default();
            let heights = height_field(resolution, phase, &params);
            let normals = grid_normals(resolution, &heights);
            DrawCall::Surface(SurfaceDraw {
                object: object.id(),
                resolution,
                model,
                view_projection,
                normal_rotation,
                heights,
                normals,
            })
        }
        ObjectKind::Panel { color } => DrawCall::Panel(PanelDraw {
            object: object.id(),
            color,
            transform: rect * model,
        }),
    }
}
