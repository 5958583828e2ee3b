use std::collections::HashSet;

use wavescope_common::{Color, ObjectId, Viewport};

use crate::context::{DrawCall, DrawError, GraphicsContext, RenderError};

/// One recorded context operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    SetViewport(Viewport),
    Clear(Color),
    Draw(ObjectId),
    Finish,
}

/// Recording implementation of [`GraphicsContext`].
///
/// Captures the call sequence for assertions and can inject draw failures
/// by position. Used by tests and the headless CLI driver; swap in a GPU
/// context without changing consumers.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<RecordedCall>,
    fail_draws: HashSet<usize>,
    draws_attempted: usize,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the n-th attempted draw (0-based, over the context lifetime)
    /// fail with an injected error.
    pub fn fail_draw_at(mut self, attempt: usize) -> Self {
        self.fail_draws.insert(attempt);
        self
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Ids of successfully drawn objects, in draw order.
    pub fn drawn_objects(&self) -> Vec<ObjectId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Draw(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.drawn_objects().len()
    }
}

impl GraphicsContext for RecordingContext {
    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.calls.push(RecordedCall::SetViewport(viewport));
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        self.calls.push(RecordedCall::Clear(color));
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), DrawError> {
        let attempt = self.draws_attempted;
        self.draws_attempted += 1;
        if self.fail_draws.contains(&attempt) {
            return Err(DrawError(format!("injected failure for draw {attempt}")));
        }
        self.calls.push(RecordedCall::Draw(call.object()));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.calls.push(RecordedCall::Finish);
        Ok(())
    }
}
