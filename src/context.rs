//! Per-context drawing state: buffers, matrix stacks, current attributes,
//! the vertex accumulator and the scene under construction.

use crate::color::Color;
use crate::math::{Mat4, Vec4};
use crate::raster::{ScreenVertex, Surface};
use crate::scene::Scene;
use crate::state::{AreaMode, ElementType, MatrixMode};

/// All state owned by one drawing context. Commands reach it through the
/// state machine's guard helpers.
pub struct Context {
    pub(crate) width: i32,
    pub(crate) height: i32,

    pub(crate) color_buffer: Vec<Color>,
    pub(crate) depth_buffer: Vec<f32>,

    pub(crate) primitive_mode: ElementType,
    pub(crate) area_mode: AreaMode,
    pub(crate) matrix_mode: MatrixMode,

    pub(crate) current_color: Color,
    pub(crate) clear_color: Color,
    pub(crate) point_size: f32,
    pub(crate) scale_factor: f32,

    pub(crate) inside_begin: bool,
    pub(crate) inside_scene: bool,
    pub(crate) depth_test: bool,

    /// Matrix stacks indexed by [`MatrixMode`]; each always holds at least
    /// one matrix.
    pub(crate) stacks: [Vec<Mat4>; 2],
    pub(crate) vertices: Vec<Vec4>,
    pub(crate) screen_vertices: Vec<ScreenVertex>,

    pub(crate) viewport: Mat4,
    /// Composite viewport * projection * model-view, refreshed before each
    /// rasterized begin/end and before circles.
    pub(crate) vpm: Mat4,

    pub(crate) scene: Scene,
}

impl Context {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            color_buffer: vec![Color::BLACK; size],
            depth_buffer: vec![1.0; size],
            primitive_mode: ElementType::Points,
            area_mode: AreaMode::Fill,
            matrix_mode: MatrixMode::ModelView,
            current_color: Color::BLACK,
            clear_color: Color::BLACK,
            point_size: 1.0,
            scale_factor: 1.0,
            inside_begin: false,
            inside_scene: false,
            depth_test: true,
            stacks: [vec![Mat4::identity()], vec![Mat4::identity()]],
            vertices: Vec::new(),
            screen_vertices: Vec::new(),
            viewport: Mat4::identity(),
            vpm: Mat4::identity(),
            scene: Scene::default(),
        }
    }

    pub(crate) fn stack_mut(&mut self, mode: MatrixMode) -> &mut Vec<Mat4> {
        &mut self.stacks[mode as usize]
    }

    pub(crate) fn current_stack_mut(&mut self) -> &mut Vec<Mat4> {
        self.stack_mut(self.matrix_mode)
    }

    fn stack_top(&self, mode: MatrixMode) -> Mat4 {
        *self.stacks[mode as usize]
            .last()
            .expect("matrix stacks never empty")
    }

    /// Refresh the composite viewport * projection * model-view matrix. The
    /// projection * model-view product is renormalized by its homogeneous w
    /// first when that is not 1.
    pub(crate) fn recalculate_vpm(&mut self) {
        let mut pm = self.stack_top(MatrixMode::Projection) * self.stack_top(MatrixMode::ModelView);
        let w = pm.homogeneous_w();
        if w != 1.0 {
            pm = pm / w;
        }
        self.vpm = self.viewport * pm;
    }

    /// Derive the world-to-pixel scale from the 2x2 linear part of the
    /// composite matrix. Used to turn circle radii into pixels.
    pub(crate) fn update_scale_factor(&mut self) {
        let m = &self.vpm;
        self.scale_factor =
            (m.get(0, 0) * m.get(1, 1) - m.get(0, 1) * m.get(1, 0)).abs().sqrt();
    }

    /// Projection * model-view composite used by the ray tracer; the
    /// viewport plays no part there.
    pub(crate) fn pvm(&self) -> Mat4 {
        self.stack_top(MatrixMode::Projection) * self.stack_top(MatrixMode::ModelView)
    }

    /// Push a point through the composite matrix, perspective-divide, and
    /// remap depth from NDC [-1, 1] into the [0, 1] range the depth buffer
    /// stores.
    pub(crate) fn transform_point(&self, v: Vec4) -> Vec4 {
        let mut result = self.vpm * v;
        if result.w != 0.0 {
            let inv_w = 1.0 / result.w;
            result.x *= inv_w;
            result.y *= inv_w;
            result.z *= inv_w;
            result.w = 1.0;
        }
        result.z = (result.z + 1.0) * 0.5;
        result
    }

    /// Borrow the drawing surface and the accumulated screen vertices
    /// together.
    pub(crate) fn draw_parts(&mut self) -> (Surface<'_>, &[ScreenVertex]) {
        let surface = Surface::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
            self.depth_test,
        );
        (surface, &self.screen_vertices)
    }

    pub(crate) fn surface(&mut self) -> Surface<'_> {
        Surface::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
            self.depth_test,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_context_has_identity_stacks_and_far_depth() {
        let ctx = Context::new(4, 3);
        assert_eq!(ctx.color_buffer.len(), 12);
        assert!(ctx.depth_buffer.iter().all(|d| *d == 1.0));
        assert_eq!(ctx.stacks[0].len(), 1);
        assert_eq!(ctx.stacks[1].len(), 1);
        assert_eq!(ctx.stacks[0][0], Mat4::identity());
    }

    #[test]
    fn transform_point_remaps_depth() {
        let mut ctx = Context::new(10, 10);
        ctx.viewport = Mat4::viewport(0, 0, 10, 10);
        ctx.recalculate_vpm();
        let v = ctx.transform_point(Vec4::point(0.0, 0.0, 0.0));
        assert_relative_eq!(v.x, 5.0);
        assert_relative_eq!(v.y, 5.0);
        assert_relative_eq!(v.z, 0.5);
    }

    #[test]
    fn scale_factor_tracks_viewport_scaling() {
        let mut ctx = Context::new(100, 100);
        ctx.viewport = Mat4::viewport(0, 0, 100, 100);
        ctx.recalculate_vpm();
        ctx.update_scale_factor();
        assert_relative_eq!(ctx.scale_factor, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn vpm_renormalizes_homogeneous_w() {
        let mut ctx = Context::new(10, 10);
        ctx.viewport = Mat4::viewport(0, 0, 10, 10);
        // projection top scaled by 2 throughout, so its homogeneous w is 2
        ctx.stacks[MatrixMode::Projection as usize][0] = Mat4::from_rows([
            2.0, 0.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, 0.0, //
            0.0, 0.0, 2.0, 0.0, //
            0.0, 0.0, 0.0, 2.0,
        ]);
        ctx.recalculate_vpm();
        // after renormalization the composite equals the plain viewport
        assert_eq!(ctx.vpm, ctx.viewport);
    }
}
