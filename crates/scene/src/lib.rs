//! Scene state and the update step.
//!
//! # Invariants
//! - Accepted elapsed time never decreases; rejected input leaves the state
//!   untouched.
//! - Object order is insertion order, stable for the life of each object.
//! - All time-derived data is a pure function of elapsed time and prior
//!   state, so repeating an update with identical arguments is a no-op.

pub mod camera;
pub mod state;

pub use camera::CameraPose;
pub use state::{
    DisplayRect, InvalidInput, ObjectKind, SceneObject, SceneState, Spin, DISPLAY_FILL,
};
