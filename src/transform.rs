//! Matrix stack commands.
//!
//! Two stacks live on each context, selected by the matrix mode. All
//! transformation commands right-multiply the top of the active stack, so
//! transforms compose in call order the way classical fixed-function
//! pipelines do.

use crate::error::Error;
use crate::gl::SoftGl;
use crate::math::Mat4;
use crate::state::MatrixMode;

impl SoftGl {
    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        if let Some(ctx) = self.state_context() {
            ctx.matrix_mode = mode;
        }
    }

    /// Duplicate the top of the active stack.
    pub fn push_matrix(&mut self) {
        if let Some(ctx) = self.state_context() {
            let stack = ctx.current_stack_mut();
            let top = *stack.last().expect("matrix stacks never empty");
            stack.push(top);
        }
    }

    /// Discard the top of the active stack. Popping the last element fails
    /// with `StackUnderflow` and leaves the stack intact.
    pub fn pop_matrix(&mut self) {
        let underflow = match self.state_context() {
            Some(ctx) => {
                let stack = ctx.current_stack_mut();
                if stack.len() == 1 {
                    true
                } else {
                    stack.pop();
                    false
                }
            }
            None => return,
        };
        if underflow {
            self.set_error(Error::StackUnderflow);
        }
    }

    /// Replace the top of the active stack with the identity.
    pub fn load_identity(&mut self) {
        if let Some(ctx) = self.state_context() {
            *ctx
                .current_stack_mut()
                .last_mut()
                .expect("matrix stacks never empty") = Mat4::identity();
        }
    }

    /// Replace the top of the active stack with a caller-supplied
    /// column-major matrix.
    pub fn load_matrix(&mut self, matrix: &[f32; 16]) {
        if let Some(ctx) = self.state_context() {
            *ctx
                .current_stack_mut()
                .last_mut()
                .expect("matrix stacks never empty") = Mat4::from_column_major(matrix);
        }
    }

    /// Right-multiply the top of the active stack by a caller-supplied
    /// column-major matrix.
    pub fn mult_matrix(&mut self, matrix: &[f32; 16]) {
        self.mult_with_current(Mat4::from_column_major(matrix));
    }

    /// Shared tail of every transformation command: guards, then
    /// `top <- top * other`.
    fn mult_with_current(&mut self, other: Mat4) {
        if let Some(ctx) = self.state_context() {
            let top = ctx
                .current_stack_mut()
                .last_mut()
                .expect("matrix stacks never empty");
            *top = *top * other;
        }
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.mult_with_current(Mat4::translation(x, y, z));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.mult_with_current(Mat4::scaling(x, y, z));
    }

    /// Rotate in the XY plane around the point (center_x, center_y):
    /// translate to the center, rotate around z, translate back.
    pub fn rotate_2d(&mut self, angle: f32, center_x: f32, center_y: f32) {
        self.translate(center_x, center_y, 0.0);
        self.mult_with_current(Mat4::rotation_z(angle));
        self.translate(-center_x, -center_y, 0.0);
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.mult_with_current(Mat4::rotation_y(angle));
    }

    /// Right-multiply by an orthographic projection. Degenerate intervals
    /// fail with `InvalidValue` before any guard runs.
    pub fn ortho(&mut self, l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) {
        if l == r || b == t || n == f {
            self.set_error(Error::InvalidValue);
            return;
        }
        self.mult_with_current(Mat4::ortho(l, r, b, t, n, f));
    }

    /// Right-multiply by a perspective projection. Degenerate windows and
    /// non-positive plane distances fail with `InvalidValue`.
    pub fn frustum(&mut self, l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) {
        if l == r || b == t || n <= 0.0 || f <= 0.0 {
            self.set_error(Error::InvalidValue);
            return;
        }
        self.mult_with_current(Mat4::frustum(l, r, b, t, n, f));
    }

    /// Store the viewport transform on the context. It joins the composite
    /// matrix at the next rasterized begin/end; it lives on neither stack.
    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            self.set_error(Error::InvalidValue);
            return;
        }
        if let Some(ctx) = self.state_context() {
            ctx.viewport = Mat4::viewport(x, y, width, height);
        }
    }
}
