//! The library state machine: context registry, sticky error register,
//! lifecycle and attribute commands.
//!
//! Every command runs an ordered chain of guards first; a failing guard
//! records its code in the error register and the command returns without
//! touching any other state. The register is sticky: only the first failure
//! since the last [`SoftGl::get_error`] is kept.

use crate::color::Color;
use crate::context::Context;
use crate::error::Error;
use crate::state::{AreaMode, Capability, COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT};

/// The top-level library object: owns every context and the error register.
///
/// Mirrors the classical fixed-function model: one context is current at a
/// time, and commands implicitly target it.
#[derive(Default)]
pub struct SoftGl {
    pub(crate) contexts: Vec<Option<Context>>,
    pub(crate) current: Option<usize>,
    pub(crate) error: Error,
}

impl SoftGl {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Error register
    // ------------------------------------------------------------------

    /// Record an error; only lands when the register holds `NoError`.
    pub(crate) fn set_error(&mut self, error: Error) {
        if self.error == Error::NoError {
            self.error = error;
        }
    }

    /// Read and reset the error register.
    pub fn get_error(&mut self) -> Error {
        std::mem::take(&mut self.error)
    }

    // ------------------------------------------------------------------
    // Context lifecycle
    // ------------------------------------------------------------------

    /// Create a context and return its handle. Handles stay valid until the
    /// context is destroyed; destroying one never renumbers the others.
    pub fn create_context(&mut self, width: i32, height: i32) -> Option<usize> {
        if width <= 0 || height <= 0 {
            self.set_error(Error::InvalidValue);
            return None;
        }
        let context = Context::new(width, height);
        match self.contexts.iter_mut().position(|c| c.is_none()) {
            Some(slot) => {
                self.contexts[slot] = Some(context);
                Some(slot)
            }
            None => {
                self.contexts.push(Some(context));
                Some(self.contexts.len() - 1)
            }
        }
    }

    fn is_valid_id(&self, id: usize) -> bool {
        matches!(self.contexts.get(id), Some(Some(_)))
    }

    /// Destroy a context. Destroying the current context is refused.
    pub fn destroy_context(&mut self, id: usize) {
        if !self.is_valid_id(id) {
            self.set_error(Error::InvalidValue);
            return;
        }
        if Some(id) == self.current {
            self.set_error(Error::InvalidOperation);
            return;
        }
        self.contexts[id] = None;
    }

    pub fn set_context(&mut self, id: usize) {
        if !self.is_valid_id(id) {
            self.set_error(Error::InvalidValue);
            return;
        }
        self.current = Some(id);
    }

    /// Handle of the current context, or `None` (with `InvalidOperation`
    /// recorded) when no context has been made current.
    pub fn current_context(&mut self) -> Option<usize> {
        if self.current.is_none() {
            self.set_error(Error::InvalidOperation);
        }
        self.current
    }

    /// Color buffer of the current context, row-major with interleaved RGB
    /// pixels.
    pub fn color_buffer(&self) -> Option<&[Color]> {
        self.current_ref().map(|c| c.color_buffer.as_slice())
    }

    /// The same buffer viewed as `3 * width * height` floats.
    pub fn color_buffer_floats(&self) -> Option<&[f32]> {
        self.color_buffer().map(|pixels| unsafe {
            std::slice::from_raw_parts(pixels.as_ptr() as *const f32, pixels.len() * 3)
        })
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    pub(crate) fn current_ref(&self) -> Option<&Context> {
        self.current
            .and_then(|id| self.contexts.get(id))
            .and_then(Option::as_ref)
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Context> {
        match self.current {
            Some(id) => self.contexts.get_mut(id).and_then(Option::as_mut),
            None => None,
        }
    }

    /// Guard for state commands: a context exists and we are outside
    /// begin/end.
    pub(crate) fn state_context(&mut self) -> Option<&mut Context> {
        let ok = matches!(self.current_ref(), Some(c) if !c.inside_begin);
        if !ok {
            self.set_error(Error::InvalidOperation);
            return None;
        }
        self.current_mut()
    }

    /// Guard for vertex commands: a context exists and we are inside
    /// begin/end.
    pub(crate) fn vertex_context(&mut self) -> Option<&mut Context> {
        let ok = matches!(self.current_ref(), Some(c) if c.inside_begin);
        if !ok {
            self.set_error(Error::InvalidOperation);
            return None;
        }
        self.current_mut()
    }

    /// Guard for scene construction commands: additionally requires an open
    /// scene block.
    pub(crate) fn scene_context(&mut self) -> Option<&mut Context> {
        let ok = matches!(self.current_ref(), Some(c) if !c.inside_begin && c.inside_scene);
        if !ok {
            self.set_error(Error::InvalidOperation);
            return None;
        }
        self.current_mut()
    }

    /// Guard for terminal scene commands: requires the scene block to be
    /// closed.
    pub(crate) fn closed_scene_context(&mut self) -> Option<&mut Context> {
        let ok = matches!(self.current_ref(), Some(c) if !c.inside_begin && !c.inside_scene);
        if !ok {
            self.set_error(Error::InvalidOperation);
            return None;
        }
        self.current_mut()
    }

    // ------------------------------------------------------------------
    // Attribute commands
    // ------------------------------------------------------------------

    /// Set the color used by `clear`. The alpha component is accepted for
    /// API compatibility and ignored.
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, _alpha: f32) {
        if let Some(ctx) = self.state_context() {
            ctx.clear_color = Color::new(r, g, b);
        }
    }

    /// Set the current drawing color.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        if let Some(ctx) = self.state_context() {
            ctx.current_color = Color::new(r, g, b);
        }
    }

    pub fn set_area_mode(&mut self, mode: AreaMode) {
        if let Some(ctx) = self.state_context() {
            ctx.area_mode = mode;
        }
    }

    /// Set the point stamp size in pixels; must be positive.
    pub fn set_point_size(&mut self, size: f32) {
        if self.state_context().is_none() {
            return;
        }
        if size <= 0.0 {
            self.set_error(Error::InvalidValue);
            return;
        }
        if let Some(ctx) = self.current_mut() {
            ctx.point_size = size;
        }
    }

    pub fn enable(&mut self, capability: Capability) {
        if let Some(ctx) = self.state_context() {
            match capability {
                Capability::DepthTest => ctx.depth_test = true,
            }
        }
    }

    pub fn disable(&mut self, capability: Capability) {
        if let Some(ctx) = self.state_context() {
            match capability {
                Capability::DepthTest => ctx.depth_test = false,
            }
        }
    }

    /// Clear the buffers selected by `mask` (an OR of [`COLOR_BUFFER_BIT`]
    /// and [`DEPTH_BUFFER_BIT`]). Unknown bits fail with `InvalidValue` and
    /// clear nothing.
    pub fn clear(&mut self, mask: u32) {
        if self.state_context().is_none() {
            return;
        }
        if mask & !(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT) != 0 {
            self.set_error(Error::InvalidValue);
            return;
        }
        let ctx = match self.current_mut() {
            Some(ctx) => ctx,
            None => return,
        };
        if mask & COLOR_BUFFER_BIT != 0 {
            let clear_color = ctx.clear_color;
            ctx.color_buffer.fill(clear_color);
        }
        if mask & DEPTH_BUFFER_BIT != 0 {
            ctx.depth_buffer.fill(f32::INFINITY);
        }
    }
}
