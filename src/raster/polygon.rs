//! Scanline polygon filling with an active edge list.
//!
//! # Algorithm Overview
//!
//! The filler walks scanlines from the polygon's topmost row downward:
//!
//! 1. **Edge build**: every non-horizontal polygon edge (including the
//!    closing edge) becomes an [`Edge`] oriented top-down, carrying its
//!    intersection x and depth plus their per-scanline steps. The bottom
//!    scanline of each edge is shortened away so a vertex shared by two
//!    edges is not counted twice.
//! 2. **Activation**: edges wait in a pending set until the sweep reaches
//!    their top scanline, then move to the active list.
//! 3. **Span fill**: on each scanline the active list, sorted by x, is
//!    taken pairwise and the horizontal span between each pair is filled
//!    with 1/z interpolation.
//! 4. **Advance**: every active edge steps its x and z to the next
//!    scanline; finished edges retire; the list is re-sorted.
//!
//! # Cocktail-Shake Sort
//!
//! After a one-scanline advance the active list is nearly sorted, only
//! neighbouring edges can have swapped places where edges cross. An
//! adaptive bidirectional bubble sort handles this in near-linear time and
//! stops as soon as a full pass makes no swap. The initial sort after
//! activation has no such ordering to exploit, so it uses the standard
//! library sort instead.

use super::{ScreenVertex, Surface};
use crate::color::Color;

/// One polygon edge under the sweep, oriented so `top_y >= bottom_y`.
#[derive(Clone, Copy, Debug)]
struct Edge {
    top_y: i32,
    bottom_y: i32,
    current_x: f32,
    step_x: f32,
    current_z: f32,
    step_z: f32,
}

impl Edge {
    /// Build from the top and bottom endpoints. The bottom scanline is
    /// shortened away (top-open convention).
    fn new(top: ScreenVertex, bottom: ScreenVertex) -> Self {
        let height = (top.y - bottom.y) as f32;
        let (step_x, step_z) = if height != 0.0 {
            (
                (bottom.x - top.x) as f32 / height,
                (bottom.z - top.z) / height,
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            top_y: top.y,
            bottom_y: bottom.y + 1,
            current_x: top.x as f32,
            step_x,
            current_z: top.z,
            step_z,
        }
    }

    fn advance(&mut self) {
        self.current_x += self.step_x;
        self.current_z += self.step_z;
    }
}

/// Sweep state: pending edges, the active edge list, and the observed
/// scanline range.
struct FillTable {
    pending: Vec<Edge>,
    active: Vec<Edge>,
    max_y: i32,
    min_y: i32,
}

impl FillTable {
    fn new(surface_height: i32) -> Self {
        Self {
            pending: Vec::new(),
            active: Vec::new(),
            max_y: 0,
            min_y: surface_height,
        }
    }

    /// Register the polygon edge (c1, c2), skipping horizontal edges, and
    /// widen the observed y and x ranges.
    fn add_edge(&mut self, c1: ScreenVertex, c2: ScreenVertex, min_x: &mut i32, max_x: &mut i32) {
        if c1.y == c2.y {
            return;
        }

        let (top, bottom) = if c1.y > c2.y { (c1, c2) } else { (c2, c1) };
        self.pending.push(Edge::new(top, bottom));

        self.max_y = self.max_y.max(top.y);
        self.min_y = self.min_y.min(bottom.y);
        *max_x = (*max_x).max(top.x).max(bottom.x);
        *min_x = (*min_x).min(top.x).min(bottom.x);
    }

    /// Retire active edges finished above scanline `y` and activate pending
    /// edges that now intersect it, advancing their x to the current sweep
    /// position.
    fn update_active(&mut self, y: i32) {
        self.active.retain(|e| y >= e.bottom_y);

        let mut i = 0;
        while i < self.pending.len() {
            if y <= self.pending[i].top_y {
                let mut edge = self.pending.remove(i);
                edge.current_x += (edge.top_y - y) as f32 * edge.step_x;
                self.active.push(edge);
            } else {
                i += 1;
            }
        }
    }
}

/// Adaptive bidirectional bubble sort by `current_x`. Near-O(n) on the
/// almost-sorted lists produced by a one-scanline advance.
fn shake_sort(edges: &mut [Edge]) {
    if edges.len() < 2 {
        return;
    }
    let mut start = 0;
    let mut end = edges.len() - 1;

    loop {
        let mut swapped = false;
        for i in start..end {
            if edges[i].current_x > edges[i + 1].current_x {
                edges.swap(i, i + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }

        swapped = false;
        end -= 1;
        for i in (start..end).rev() {
            if edges[i].current_x > edges[i + 1].current_x {
                edges.swap(i, i + 1);
                swapped = true;
            }
        }
        start += 1;
        if !swapped {
            break;
        }
    }
}

/// Fill the polygon described by `vertices` (closed implicitly back to the
/// first vertex).
pub fn fill_polygon(surface: &mut Surface, vertices: &[ScreenVertex], color: Color) {
    if vertices.is_empty() {
        return;
    }

    let mut table = FillTable::new(surface.height());
    let mut min_x = surface.width();
    let mut max_x = 0;

    for pair in vertices.windows(2) {
        table.add_edge(pair[0], pair[1], &mut min_x, &mut max_x);
    }
    table.add_edge(vertices[vertices.len() - 1], vertices[0], &mut min_x, &mut max_x);

    let top = table.max_y;
    table.update_active(top);
    // after activation the edges carry no previous ordering, so shake sort
    // has nothing to exploit yet
    table
        .active
        .sort_by(|a, b| a.current_x.total_cmp(&b.current_x));

    // clip the scanned range to the canvas
    table.max_y = table.max_y.min(surface.height() - 1);
    table.min_y = table.min_y.max(0);

    let needs_clamping = min_x < 0 || max_x >= surface.width();

    for y in ((table.min_y + 1)..=table.max_y).rev() {
        let mut i = 0;
        while i + 1 < table.active.len() {
            let left = table.active[i];
            let right = table.active[i + 1];
            let x1 = left.current_x.round() as i32;
            let x2 = right.current_x.round() as i32;
            if needs_clamping {
                surface.plot_span_clamped(y, x1, x2, left.current_z, right.current_z, color);
            } else {
                surface.plot_span(y, x1, x2, left.current_z, right.current_z, color);
            }

            table.active[i].advance();
            table.active[i + 1].advance();
            i += 2;
        }

        table.update_active(y - 1);
        shake_sort(&mut table.active);
    }
}
