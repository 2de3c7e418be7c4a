//! A CPU-based software graphics library.
//!
//! This crate renders 2D and 3D scenes into an in-memory float color buffer
//! through two cooperating paths: an immediate-mode rasterizer (points,
//! lines, polygons, circles, ellipses, arcs, with depth buffering and a
//! matrix stack pipeline) and a recursive ray tracer (spheres, triangles,
//! point lights, Phong shading, reflection/refraction, environment maps).
//! It mimics the stateful API style of classical fixed-function graphics:
//! commands target the current context and vertices collect between paired
//! begin/end markers.
//!
//! # Quick Start
//!
//! ```
//! use softgl::prelude::*;
//!
//! let mut gl = SoftGl::new();
//! let ctx = gl.create_context(64, 64).unwrap();
//! gl.set_context(ctx);
//! gl.viewport(0, 0, 64, 64);
//! gl.set_color(1.0, 0.0, 0.0);
//!
//! gl.begin(ElementType::Polygon);
//! gl.vertex2(-0.5, -0.5);
//! gl.vertex2(0.5, -0.5);
//! gl.vertex2(0.0, 0.5);
//! gl.end();
//!
//! assert_eq!(gl.get_error(), softgl::Error::NoError);
//! let pixels = gl.color_buffer().unwrap();
//! # assert_eq!(pixels.len(), 64 * 64);
//! ```
//!
//! Errors never panic and never surface through return values of drawing
//! commands; they land in a sticky register read by [`SoftGl::get_error`].

pub mod color;
pub mod error;
pub mod math;
pub mod scene;
pub mod state;

mod context;
mod draw;
mod gl;
mod primitive;
mod raster;
mod raytrace;
mod tracer;
mod transform;

pub use color::Color;
pub use error::Error;
pub use gl::SoftGl;
pub use primitive::{Primitive, Ray, Shape};
pub use state::{AreaMode, Capability, ElementType, MatrixMode};
pub use state::{COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use softgl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::error::Error;
    pub use crate::gl::SoftGl;
    pub use crate::math::{Mat4, Vec4};
    pub use crate::state::{
        AreaMode, Capability, ElementType, MatrixMode, COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT,
    };
}
