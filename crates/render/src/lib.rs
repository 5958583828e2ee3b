//! Render step and the graphics-context seam.
//!
//! # Invariants
//! - The render step never mutates scene state.
//! - Draw calls are issued in object insertion order.
//! - One failed draw never aborts the frame; whole-frame context failures
//!   do.
//!
//! Backends implement [`GraphicsContext`]; the trait is stable, so a GPU
//! implementation can replace the recording one without changing
//! consumers.

pub mod context;
pub mod frame;
pub mod recording;

pub use context::{DrawCall, DrawError, GraphicsContext, PanelDraw, RenderError, SurfaceDraw};
pub use frame::{render_frame, DrawFailure, FrameStats, CLEAR_COLOR};
pub use recording::{RecordedCall, RecordingContext};
