//! Vector and matrix math for the transformation pipeline and the ray tracer.

pub mod mat4;
pub mod vec4;

pub use mat4::Mat4;
pub use vec4::Vec4;
