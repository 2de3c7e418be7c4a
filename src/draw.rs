//! Vertex accumulation and primitive dispatch.
//!
//! Vertices collect between `begin` and `end`. On `end` the path forks:
//! inside a scene block the first three vertices become a ray-traceable
//! triangle; otherwise every vertex is pushed through the composite
//! viewport * projection * model-view matrix and the screen-space list is
//! handed to the rasterizer selected by the primitive mode. Circles,
//! ellipses and arcs build on the same machinery.

use std::f32::consts::{PI, TAU};

use crate::error::Error;
use crate::gl::SoftGl;
use crate::math::Vec4;
use crate::primitive::Primitive;
use crate::raster::{circle, line, polygon, ScreenVertex};
use crate::state::{AreaMode, ElementType};

/// Segments used for a full ellipse revolution; arcs use a proportional
/// share.
const CURVE_SEGMENTS: i32 = 40;

fn to_screen(v: Vec4) -> ScreenVertex {
    ScreenVertex::new(v.x.round() as i32, v.y.round() as i32, v.z)
}

impl SoftGl {
    /// Open a begin/end block collecting vertices for `mode`. Outside a
    /// scene block this also refreshes the composite matrix and the circle
    /// scale factor.
    pub fn begin(&mut self, mode: ElementType) {
        let Some(ctx) = self.state_context() else {
            return;
        };
        ctx.primitive_mode = mode;
        ctx.inside_begin = true;
        ctx.screen_vertices.clear();
        ctx.vertices.clear();
        if !ctx.inside_scene {
            ctx.recalculate_vpm();
            ctx.update_scale_factor();
        }
    }

    /// Append a vertex; only legal inside begin/end.
    pub fn vertex3(&mut self, x: f32, y: f32, z: f32) {
        if let Some(ctx) = self.vertex_context() {
            ctx.vertices.push(Vec4::point(x, y, z));
        }
    }

    pub fn vertex2(&mut self, x: f32, y: f32) {
        self.vertex3(x, y, 0.0);
    }

    /// Accepted for API compatibility; homogeneous vertices are not part of
    /// any dispatch path yet.
    pub fn vertex4(&mut self, _x: f32, _y: f32, _z: f32, _w: f32) {}

    /// Close the block and realize the collected vertices.
    pub fn end(&mut self) {
        let Some(ctx) = self.vertex_context() else {
            return;
        };
        ctx.inside_begin = false;

        if ctx.inside_scene {
            // scene-block polygons truncate to their first three vertices
            if ctx.vertices.len() >= 3 {
                let mut tri =
                    Primitive::triangle(ctx.vertices[0], ctx.vertices[1], ctx.vertices[2]);
                tri.material_id = ctx.scene.latest_material_id();
                ctx.scene.primitives.push(tri);
            }
            return;
        }

        let transformed: Vec<ScreenVertex> = ctx
            .vertices
            .iter()
            .map(|v| to_screen(ctx.transform_point(*v)))
            .collect();
        ctx.screen_vertices = transformed;

        let mode = ctx.primitive_mode;
        let area_mode = ctx.area_mode;
        let color = ctx.current_color;
        let point_size = ctx.point_size.round() as i32;

        let (mut surface, vertices) = ctx.draw_parts();
        match mode {
            ElementType::Points => line::draw_points(&mut surface, vertices, color, point_size),
            ElementType::Lines => line::draw_lines(&mut surface, vertices, color),
            ElementType::LineStrip => line::draw_line_strip(&mut surface, vertices, color),
            ElementType::LineLoop => line::draw_line_loop(&mut surface, vertices, color),
            ElementType::Polygon => match area_mode {
                AreaMode::Point => line::draw_points(&mut surface, vertices, color, point_size),
                AreaMode::Line => line::draw_line_loop(&mut surface, vertices, color),
                AreaMode::Fill => polygon::fill_polygon(&mut surface, vertices, color),
            },
            ElementType::Triangles => {}
        }
    }

    /// Draw a circle of world-space radius `radius` centered at (x, y, z).
    /// The radius scales into pixels through the composite matrix; in
    /// `Point` area mode the circle degenerates to a single point.
    pub fn circle(&mut self, x: f32, y: f32, z: f32, radius: f32) {
        if self.current_ref().is_none() {
            self.set_error(Error::InvalidOperation);
            return;
        }
        if radius <= 0.0 {
            self.set_error(Error::InvalidValue);
            return;
        }

        if self.current_ref().map(|c| c.area_mode) == Some(AreaMode::Point) {
            self.begin(ElementType::Points);
            self.vertex3(x, y, z);
            self.end();
            return;
        }

        let ctx = match self.current_mut() {
            Some(ctx) => ctx,
            None => return,
        };
        ctx.recalculate_vpm();
        ctx.update_scale_factor();

        let center = to_screen(ctx.transform_point(Vec4::point(x, y, z)));
        let pixel_radius = (radius * ctx.scale_factor).round() as i32;
        let outline = ctx.area_mode == AreaMode::Line;
        let color = ctx.current_color;

        let mut surface = ctx.surface();
        circle::draw_circle(&mut surface, center, pixel_radius, outline, color);
    }

    /// Draw an axis-aligned ellipse as a 40-segment polygon through the
    /// begin/end machinery.
    pub fn ellipse(&mut self, cx: f32, cy: f32, cz: f32, a: f32, b: f32) {
        if a <= 0.0 || b <= 0.0 {
            self.set_error(Error::InvalidValue);
            return;
        }
        if self.state_context().is_none() {
            return;
        }

        if self.current_ref().map(|c| c.area_mode) == Some(AreaMode::Point) {
            self.begin(ElementType::Points);
            self.vertex3(cx, cy, cz);
            self.end();
            return;
        }

        let angle_step = TAU / CURVE_SEGMENTS as f32;
        self.begin(ElementType::Polygon);
        for i in 0..CURVE_SEGMENTS {
            let angle = i as f32 * angle_step;
            self.vertex3(cx + a * angle.cos(), cy + b * angle.sin(), cz);
        }
        self.end();
    }

    /// Draw a circular arc from angle `from` to `to` (radians). Angles are
    /// normalized into [0, 2 pi); in `Fill` area mode the arc becomes a
    /// sector polygon anchored at the center, otherwise a polyline. A zero
    /// sweep draws nothing.
    pub fn arc(&mut self, cx: f32, cy: f32, cz: f32, radius: f32, from: f32, to: f32) {
        if self.current_ref().is_none() {
            self.set_error(Error::InvalidOperation);
            return;
        }
        if radius <= 0.0 {
            self.set_error(Error::InvalidValue);
            return;
        }

        let area_mode = match self.current_ref().map(|c| c.area_mode) {
            Some(mode) => mode,
            None => return,
        };
        if area_mode == AreaMode::Point {
            self.begin(ElementType::Points);
            self.vertex3(cx, cy, cz);
            self.end();
            return;
        }

        let from = from.rem_euclid(2.0 * PI);
        let mut to = to.rem_euclid(2.0 * PI);
        if from > to {
            to += 2.0 * PI;
        }
        if from == to {
            return;
        }

        let segments = ((CURVE_SEGMENTS as f32 * (to - from).abs() / TAU) as i32).max(1);
        let angle_step = (to - from) / segments as f32;

        if area_mode == AreaMode::Fill {
            self.begin(ElementType::Polygon);
            // anchor at the center to form a circular sector
            self.vertex3(cx, cy, cz);
        } else {
            self.begin(ElementType::LineStrip);
        }

        for i in 0..=segments {
            let angle = from + i as f32 * angle_step;
            self.vertex3(cx + radius * angle.cos(), cy + radius * angle.sin(), cz);
        }
        self.end();
    }
}
