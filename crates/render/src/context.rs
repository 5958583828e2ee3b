use glam::Mat4;
use wavescope_common::{Color, ObjectId, Viewport};

/// Whole-frame rendering failure. Fatal to the current frame; the caller
/// decides whether to keep the loop running.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Graphics context missing or lost. No retry inside the engine.
    #[error("graphics context unavailable")]
    ContextUnavailable,
    /// A non-draw context operation failed.
    #[error("context operation `{op}` failed: {message}")]
    Context { op: &'static str, message: String },
}

/// A single object failed to draw. Recoverable: the frame continues with
/// the remaining objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DrawError(pub String);

/// One object translated into backend-ready draw data.
#[derive(Debug, Clone)]
pub enum DrawCall {
    Surface(SurfaceDraw),
    Panel(PanelDraw),
}

impl DrawCall {
    pub fn object(&self) -> ObjectId {
        match self {
            Self::Surface(draw) => draw.object,
            Self::Panel(draw) => draw.object,
        }
    }
}

/// Wave-surface draw data: static topology resolution plus the dynamic
/// height and normal fields at the current phase.
#[derive(Debug, Clone)]
pub struct SurfaceDraw {
    pub object: ObjectId,
    pub resolution: usize,
    pub model: Mat4,
    pub view_projection: Mat4,
    pub normal_rotation: Mat4,
    pub heights: Vec<f32>,
    pub normals: Vec<[f32; 3]>,
}

/// Flat colored quad draw data. The transform maps the unit square onto
/// the display rect in normalized device coordinates.
#[derive(Debug, Clone)]
pub struct PanelDraw {
    pub object: ObjectId,
    pub color: Color,
    pub transform: Mat4,
}

/// Capability set the render step needs from a backend, called in a fixed
/// order once per frame: `set_viewport`, `clear`, zero or more `draw`s,
/// `finish`.
///
/// `finish` is the frame submission boundary; recording backends treat it
/// as a marker, GPU backends submit and present there.
pub trait GraphicsContext {
    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError>;

    fn clear(&mut self, color: Color) -> Result<(), RenderError>;

    fn draw(&mut self, call: &DrawCall) -> Result<(), DrawError>;

    fn finish(&mut self) -> Result<(), RenderError>;
}
