//! Scene construction commands and the ray tracing entry point.
//!
//! Geometry and lights are collected between `begin_scene` and `end_scene`;
//! each primitive binds to the most recently declared material at append
//! time. `ray_trace_scene` then renders the collected scene into the color
//! buffer using the projection * model-view composite; the viewport matrix
//! plays no part in ray generation.

use crate::error::Error;
use crate::gl::SoftGl;
use crate::primitive::Primitive;
use crate::scene::{EmissiveMaterial, EnvironmentMap, Material, PointLight};
use crate::tracer::Tracer;
use crate::color::Color;
use crate::math::Vec4;

impl SoftGl {
    /// Open a scene block, discarding the previous scene's geometry, lights
    /// and materials. The environment map and emissive materials persist.
    pub fn begin_scene(&mut self) {
        if let Some(ctx) = self.state_context() {
            ctx.scene.restart();
            ctx.inside_scene = true;
        }
    }

    pub fn end_scene(&mut self) {
        if let Some(ctx) = self.state_context() {
            ctx.inside_scene = false;
        }
    }

    /// Append a sphere to the open scene block, bound to the latest
    /// material.
    pub fn sphere(&mut self, x: f32, y: f32, z: f32, radius: f32) {
        if let Some(ctx) = self.scene_context() {
            let mut sphere = Primitive::sphere(x, y, z, radius);
            sphere.material_id = ctx.scene.latest_material_id();
            ctx.scene.primitives.push(sphere);
        }
    }

    /// Declare a material; subsequent primitives bind to it.
    #[allow(clippy::too_many_arguments)]
    pub fn material(
        &mut self,
        r: f32,
        g: f32,
        b: f32,
        kd: f32,
        ks: f32,
        shininess: f32,
        transmittance: f32,
        ior: f32,
    ) {
        if let Some(ctx) = self.state_context() {
            ctx.scene.materials.push(Material {
                color: Color::new(r, g, b),
                k_diffuse: kd,
                k_specular: ks,
                shininess,
                transmittance,
                ior,
            });
        }
    }

    /// Declare an emissive material with constant/linear/quadratic
    /// attenuation coefficients.
    pub fn emissive_material(&mut self, r: f32, g: f32, b: f32, c0: f32, c1: f32, c2: f32) {
        if let Some(ctx) = self.state_context() {
            ctx.scene.emissive_materials.push(EmissiveMaterial {
                emissive_color: Color::new(r, g, b),
                attenuation: Color::new(c0, c1, c2),
            });
        }
    }

    /// Add a point light to the open scene block.
    pub fn point_light(&mut self, x: f32, y: f32, z: f32, r: f32, g: f32, b: f32) {
        if let Some(ctx) = self.scene_context() {
            ctx.scene.lights.push(PointLight {
                center: Vec4::point(x, y, z),
                color: Color::new(r, g, b),
            });
        }
    }

    /// Install an environment map sampled by rays that leave the scene.
    /// `texels` must hold exactly `3 * width * height` floats.
    pub fn environment_map(&mut self, width: usize, height: usize, texels: &[f32]) {
        if texels.len() != 3 * width * height {
            self.set_error(Error::InvalidValue);
            return;
        }
        if let Some(ctx) = self.state_context() {
            ctx.scene.env_map = Some(EnvironmentMap::new(width, height, texels.to_vec()));
        }
    }

    /// Render the collected scene into the color buffer. Scanlines are
    /// partitioned across the available threads; the pass replaces every
    /// pixel and ignores the depth buffer.
    pub fn ray_trace_scene(&mut self) {
        let Some(ctx) = self.closed_scene_context() else {
            return;
        };

        let pvm = ctx.pvm();
        let Some(inv_pvm) = pvm.inverse() else {
            log::error!("unable to invert the projection * model-view matrix; render aborted");
            return;
        };

        let width = ctx.width as usize;
        let height = ctx.height as usize;
        let clear_color = ctx.clear_color;
        let tracer = Tracer::new(&ctx.scene, inv_pvm, clear_color, width, height);
        tracer.render(&mut ctx.color_buffer);
        if cfg!(feature = "antialiasing") {
            tracer.antialias(&mut ctx.color_buffer);
        }
    }

    /// Reserved: rasterize the collected scene with the polygon pipeline.
    pub fn rasterize_scene(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MatrixMode;

    fn gl_with_context(size: i32) -> SoftGl {
        let mut gl = SoftGl::new();
        let id = gl.create_context(size, size).unwrap();
        gl.set_context(id);
        gl
    }

    fn pixel(gl: &SoftGl, x: usize, y: usize, width: usize) -> Color {
        gl.color_buffer().unwrap()[x + y * width]
    }

    #[test]
    fn sphere_outside_scene_block_is_invalid_operation() {
        let mut gl = gl_with_context(4);
        gl.sphere(0.0, 0.0, -3.0, 1.0);
        assert_eq!(gl.get_error(), Error::InvalidOperation);
        assert!(gl.current_ref().unwrap().scene.primitives.is_empty());

        gl.point_light(0.0, 2.0, 0.0, 1.0, 1.0, 1.0);
        assert_eq!(gl.get_error(), Error::InvalidOperation);
    }

    #[test]
    fn ray_trace_inside_scene_block_is_invalid_operation() {
        let mut gl = gl_with_context(4);
        gl.begin_scene();
        gl.ray_trace_scene();
        assert_eq!(gl.get_error(), Error::InvalidOperation);
    }

    #[test]
    fn begin_scene_clears_previous_geometry() {
        let mut gl = gl_with_context(4);
        gl.begin_scene();
        gl.material(1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        gl.sphere(0.0, 0.0, -3.0, 1.0);
        gl.point_light(0.0, 2.0, 0.0, 1.0, 1.0, 1.0);
        gl.end_scene();

        gl.begin_scene();
        let scene = &gl.current_ref().unwrap().scene;
        assert!(scene.primitives.is_empty());
        assert!(scene.lights.is_empty());
        assert!(scene.materials.is_empty());
    }

    #[test]
    fn primitives_bind_to_the_latest_material() {
        let mut gl = gl_with_context(4);
        gl.begin_scene();
        gl.sphere(0.0, 0.0, -1.0, 1.0); // before any material
        gl.material(1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        gl.sphere(0.0, 0.0, -2.0, 1.0);
        gl.material(0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        gl.sphere(0.0, 0.0, -3.0, 1.0);
        gl.end_scene();

        let scene = &gl.current_ref().unwrap().scene;
        let ids: Vec<i32> = scene.primitives.iter().map(|p| p.material_id).collect();
        assert_eq!(ids, vec![-1, 0, 1]);
    }

    #[test]
    fn scene_block_triangles_truncate_to_three_vertices() {
        let mut gl = gl_with_context(4);
        gl.begin_scene();
        gl.material(1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        gl.begin(crate::state::ElementType::Polygon);
        gl.vertex3(0.0, 0.0, -2.0);
        gl.vertex3(1.0, 0.0, -2.0);
        gl.vertex3(0.0, 1.0, -2.0);
        gl.vertex3(5.0, 5.0, -2.0); // ignored
        gl.end();
        gl.end_scene();

        let scene = &gl.current_ref().unwrap().scene;
        assert_eq!(scene.primitives.len(), 1);
        assert_eq!(scene.primitives[0].material_id, 0);
        match &scene.primitives[0].shape {
            crate::primitive::Shape::Triangle { points } => {
                assert_eq!(points[2], Vec4::point(0.0, 1.0, -2.0));
            }
            other => panic!("expected a triangle, got {other:?}"),
        }
    }

    #[test]
    fn two_vertex_scene_block_appends_nothing() {
        let mut gl = gl_with_context(4);
        gl.begin_scene();
        gl.begin(crate::state::ElementType::Polygon);
        gl.vertex3(0.0, 0.0, -2.0);
        gl.vertex3(1.0, 0.0, -2.0);
        gl.end();
        gl.end_scene();
        assert!(gl.current_ref().unwrap().scene.primitives.is_empty());
    }

    #[test]
    fn environment_map_validates_texel_count() {
        let mut gl = gl_with_context(4);
        gl.environment_map(2, 2, &[0.0; 6]);
        assert_eq!(gl.get_error(), Error::InvalidValue);
        assert!(gl.current_ref().unwrap().scene.env_map.is_none());

        gl.environment_map(2, 2, &[0.5; 12]);
        assert_eq!(gl.get_error(), Error::NoError);
        assert!(gl.current_ref().unwrap().scene.env_map.is_some());
    }

    #[test]
    fn environment_map_survives_scene_restart() {
        let mut gl = gl_with_context(4);
        gl.environment_map(1, 1, &[0.1, 0.2, 0.3]);
        gl.emissive_material(1.0, 1.0, 1.0, 1.0, 0.0, 0.0);
        gl.begin_scene();
        let scene = &gl.current_ref().unwrap().scene;
        assert!(scene.env_map.is_some());
        assert_eq!(scene.emissive_materials.len(), 1);
    }

    #[test]
    fn ray_traced_sphere_lights_center_and_leaves_corners() {
        let mut gl = gl_with_context(50);
        gl.viewport(0, 0, 50, 50);
        gl.set_matrix_mode(MatrixMode::Projection);
        gl.ortho(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        gl.set_matrix_mode(MatrixMode::ModelView);
        gl.set_clear_color(0.0, 0.0, 0.25, 1.0);

        gl.begin_scene();
        gl.material(1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        gl.sphere(0.0, 0.0, -3.0, 1.0);
        gl.point_light(0.0, 2.0, 0.0, 1.0, 1.0, 1.0);
        gl.end_scene();
        gl.ray_trace_scene();

        assert_eq!(gl.get_error(), Error::NoError);
        let center = pixel(&gl, 25, 25, 50);
        assert!(center.r > 0.0, "sphere center should catch red light");
        let corner = pixel(&gl, 0, 0, 50);
        assert_eq!(corner, Color::new(0.0, 0.0, 0.25));
    }

    #[test]
    fn singular_projection_aborts_render_untouched() {
        let mut gl = gl_with_context(4);
        gl.set_matrix_mode(MatrixMode::Projection);
        gl.scale(0.0, 1.0, 1.0); // singular composite
        gl.set_matrix_mode(MatrixMode::ModelView);
        gl.set_clear_color(0.5, 0.5, 0.5, 1.0);
        gl.clear(crate::state::COLOR_BUFFER_BIT);

        gl.begin_scene();
        gl.end_scene();
        gl.ray_trace_scene();

        // buffer keeps the cleared color; no register error either
        assert!(gl
            .color_buffer()
            .unwrap()
            .iter()
            .all(|c| *c == Color::new(0.5, 0.5, 0.5)));
        assert_eq!(gl.get_error(), Error::NoError);
    }
}
