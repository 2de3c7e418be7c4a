//! Point stamping and Bresenham line drawing with depth interpolation.
//!
//! Bresenham's algorithm determines which pixels to illuminate using only
//! integer arithmetic, tracking an error term that measures the distance
//! between the ideal line and the current pixel. Depth is carried alongside
//! as 1/z, which interpolates linearly in screen space: the step is the
//! total 1/z difference spread over the line's Euclidean pixel length, and
//! each axis step advances it once.

use super::{ScreenVertex, Surface};
use crate::color::Color;

/// Stamp a size x size square of pixels at each vertex, each pixel subject
/// to the bounds and depth tests.
pub fn draw_points(surface: &mut Surface, vertices: &[ScreenVertex], color: Color, size: i32) {
    for v in vertices {
        for i in 0..size {
            for j in 0..size {
                surface.plot(v.x + j, v.y + i, v.z, color);
            }
        }
    }
}

/// Draw a line between two screen vertices with Bresenham stepping and
/// per-pixel depth testing against the interpolated 1/z.
pub fn draw_line(surface: &mut Surface, start: ScreenVertex, end: ScreenVertex, color: Color) {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();

    // zero-length line
    if dx == 0 && dy == 0 {
        return;
    }

    let total_distance = ((dx * dx + dy * dy) as f32).sqrt();
    let mut current_inv_z = 1.0 / start.z;
    let inv_z_step = (1.0 / end.z - 1.0 / start.z) / total_distance;

    let step_x = if start.x < end.x { 1 } else { -1 };
    let step_y = if start.y < end.y { 1 } else { -1 };

    let mut error = (if dx > dy { dx } else { -dy }) / 2;
    let mut x = start.x;
    let mut y = start.y;

    while x != end.x || y != end.y {
        surface.plot(x, y, 1.0 / current_inv_z, color);

        let tmp = error;
        if tmp > -dx {
            error -= dy;
            x += step_x;
            current_inv_z += inv_z_step;
        }
        if tmp < dy {
            error += dx;
            y += step_y;
            current_inv_z += inv_z_step;
        }
    }
    surface.plot(x, y, 1.0 / current_inv_z, color);
}

/// Draw vertices pairwise as separate segments; a dangling odd vertex is
/// dropped.
pub fn draw_lines(surface: &mut Surface, vertices: &[ScreenVertex], color: Color) {
    for pair in vertices.chunks_exact(2) {
        draw_line(surface, pair[0], pair[1], color);
    }
}

/// Draw consecutive vertices as a connected strip.
pub fn draw_line_strip(surface: &mut Surface, vertices: &[ScreenVertex], color: Color) {
    for pair in vertices.windows(2) {
        draw_line(surface, pair[0], pair[1], color);
    }
}

/// Draw a strip plus the closing segment back to the first vertex.
pub fn draw_line_loop(surface: &mut Surface, vertices: &[ScreenVertex], color: Color) {
    if vertices.len() < 2 {
        return;
    }
    draw_line_strip(surface, vertices, color);
    draw_line(surface, vertices[vertices.len() - 1], vertices[0], color);
}
