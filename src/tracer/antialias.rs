//! Edge-detected adaptive supersampling.
//!
//! After the main render, pixels whose color differs from any direct
//! neighbor by more than [`DIFFERENCE_EPSILON`] on any channel are re-shaded:
//! the stored value keeps `1 - ANTIALIASING_WEIGHT` of its weight and four
//! sub-pixel samples share the rest. Border rows and columns are compared
//! against their three available neighbors; the four corner pixels are left
//! untouched. The pass is sequential and rewrites the buffer in place.

use super::Tracer;
use crate::color::Color;

/// Share of the final color taken by the four fresh sub-pixel samples.
const ANTIALIASING_WEIGHT: f32 = 0.8;

/// Per-channel difference that flags a pixel as an edge.
const DIFFERENCE_EPSILON: f32 = 0.1;

fn differs(origin: Color, neighbour: Color) -> bool {
    (origin.r - neighbour.r).abs() > DIFFERENCE_EPSILON
        || (origin.g - neighbour.g).abs() > DIFFERENCE_EPSILON
        || (origin.b - neighbour.b).abs() > DIFFERENCE_EPSILON
}

impl<'a> Tracer<'a> {
    /// Blend four sub-pixel samples into the stored color of pixel (x, y).
    fn resample(&self, buffer: &mut [Color], x: usize, y: usize) {
        let index = x + y * self.width;
        buffer[index] = buffer[index] * (1.0 - ANTIALIASING_WEIGHT);
        let weight = ANTIALIASING_WEIGHT / 4.0;

        for i in 1..3 {
            for j in 1..3 {
                let ray =
                    self.primary_ray(x as f32 + 0.25 * j as f32, y as f32 + 0.25 * i as f32);
                buffer[index] += self.trace_ray(&ray, 0) * weight;
            }
        }
    }

    /// Detect edge pixels across the buffer and re-shade them.
    pub fn antialias(&self, buffer: &mut [Color]) {
        let w = self.width;
        let h = self.height;
        if w < 2 || h < 2 {
            return;
        }
        let at = |x: usize, y: usize| x + y * w;

        // top border
        for x in 1..w - 1 {
            let origin = buffer[at(x, 0)];
            if differs(origin, buffer[at(x + 1, 0)])
                || differs(origin, buffer[at(x - 1, 0)])
                || differs(origin, buffer[at(x, 1)])
            {
                self.resample(buffer, x, 0);
            }
        }

        for y in 1..h - 1 {
            // left border
            let origin = buffer[at(0, y)];
            if differs(origin, buffer[at(0, y + 1)])
                || differs(origin, buffer[at(1, y)])
                || differs(origin, buffer[at(0, y - 1)])
            {
                self.resample(buffer, 0, y);
            }

            for x in 1..w - 1 {
                let origin = buffer[at(x, y)];
                if differs(origin, buffer[at(x, y + 1)])
                    || differs(origin, buffer[at(x + 1, y)])
                    || differs(origin, buffer[at(x - 1, y)])
                    || differs(origin, buffer[at(x, y - 1)])
                {
                    self.resample(buffer, x, y);
                }
            }

            // right border
            let origin = buffer[at(w - 1, y)];
            if differs(origin, buffer[at(w - 1, y + 1)])
                || differs(origin, buffer[at(w - 2, y)])
                || differs(origin, buffer[at(w - 1, y - 1)])
            {
                self.resample(buffer, w - 1, y);
            }
        }

        // bottom border
        for x in 1..w - 1 {
            let origin = buffer[at(x, h - 1)];
            if differs(origin, buffer[at(x + 1, h - 1)])
                || differs(origin, buffer[at(x - 1, h - 1)])
                || differs(origin, buffer[at(x, h - 2)])
            {
                self.resample(buffer, x, h - 1);
            }
        }
    }
}
