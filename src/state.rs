//! Enumerated drawing state and buffer masks.

/// Primitive type collected between `begin` and `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    /// Declared for API compatibility; `end` currently ignores it.
    Triangles,
    Polygon,
}

/// How polygons (and circles) are realized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaMode {
    /// Only the vertices.
    Point,
    /// Only the outline.
    Line,
    /// Filled interior.
    Fill,
}

/// Which matrix stack transformation commands operate on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixMode {
    ModelView = 0,
    Projection = 1,
}

/// Per-context toggles for `enable` / `disable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
}

/// `clear` mask bit selecting the color buffer.
pub const COLOR_BUFFER_BIT: u32 = 0x0001;
/// `clear` mask bit selecting the depth buffer.
pub const DEPTH_BUFFER_BIT: u32 = 0x0002;
