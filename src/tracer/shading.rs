//! Phong lighting and Snell refraction.

use crate::color::Color;
use crate::math::Vec4;
use crate::scene::{Material, PointLight};

/// Phong contribution of one visible light: diffuse modulated by the
/// material color plus an unmodulated specular highlight.
pub(crate) fn phong(
    light: &PointLight,
    point: Vec4,
    normal: Vec4,
    ray_origin: Vec4,
    material: &Material,
) -> Color {
    let light_dir = (light.center - point).normalized();
    let view_dir = (ray_origin - point).normalized();
    let reflected_dir = normal * (2.0 * normal.dot3(light_dir)) - light_dir;

    let cos_alpha = normal.dot3(light_dir).max(0.0);
    let diffuse = light.color * (material.color * (material.k_diffuse * cos_alpha));

    let cos_beta = reflected_dir.dot3(view_dir).max(0.0);
    let specular = light.color * (material.k_specular * cos_beta.powf(material.shininess));

    diffuse + specular
}

/// Refracted direction through a surface with the given index of refraction,
/// or `None` under total internal reflection. The normal is flipped when the
/// ray leaves the medium (`direction . normal >= 0`).
pub(crate) fn refract_direction(mut normal: Vec4, ior: f32, direction: Vec4) -> Option<Vec4> {
    let mut dot = direction.dot3(normal);
    let gamma = if dot < 0.0 {
        // from outside into the inside of the object
        1.0 / ior
    } else {
        // from the inside to the outside
        dot = -dot;
        normal = -normal;
        ior
    };

    let sqr_term = 1.0 - gamma * gamma * (1.0 - dot * dot);
    if sqr_term > 0.0 {
        let coeff = dot * gamma + sqr_term.sqrt();
        Some(normal * -coeff + direction * gamma)
    } else {
        None
    }
}
