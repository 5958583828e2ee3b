//! wgpu implementation of the graphics context.
//!
//! Renders backdrop panels in screen space and the wave surface as a
//! height-displaced grid with per-frame height/normal uploads.
//!
//! # Invariants
//! - The context never touches scene state; it only consumes draw calls.
//! - `set_viewport`/`clear`/`draw` record into the pending frame; all GPU
//!   work happens in `finish`.
//! - A lost or outdated swapchain surfaces as `ContextUnavailable` after
//!   one in-place reconfigure attempt.

mod gpu;
mod shaders;

pub use gpu::{GpuInitError, WgpuContext};
