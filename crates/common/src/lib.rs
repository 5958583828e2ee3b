//! Shared leaf types for the wavescope engine.
//!
//! # Invariants
//! - Types here have no dependency on any other wavescope crate.
//! - `Viewport` helpers never divide by zero.

pub mod types;

pub use types::{Color, ObjectId, Transform, Viewport};
