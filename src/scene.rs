//! Scene description consumed by the ray tracer: primitives, materials,
//! lights, and the optional environment map.

use crate::color::Color;
use crate::math::Vec4;
use crate::primitive::Primitive;

/// Phong material with reflection and refraction coefficients.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub color: Color,
    pub k_diffuse: f32,
    pub k_specular: f32,
    pub shininess: f32,
    /// Transmittance coefficient; > 0 marks the material transparent.
    pub transmittance: f32,
    /// Index of refraction.
    pub ior: f32,
}

/// Emitting surface description: radiated color plus the constant, linear
/// and quadratic attenuation coefficients.
#[derive(Clone, Copy, Debug)]
pub struct EmissiveMaterial {
    pub emissive_color: Color,
    pub attenuation: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub center: Vec4,
    pub color: Color,
}

/// Spherically mapped texture sampled by rays that leave the scene.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    width: usize,
    height: usize,
    texels: Vec<f32>,
}

impl EnvironmentMap {
    /// Texels are tightly packed RGB triples, `3 * width * height` floats.
    pub fn new(width: usize, height: usize, texels: Vec<f32>) -> Self {
        debug_assert_eq!(texels.len(), 3 * width * height);
        Self {
            width,
            height,
            texels,
        }
    }

    /// Sample along a unit direction using the angular spherical mapping.
    pub fn sample(&self, direction: Vec4) -> Color {
        let c = (direction.x * direction.x + direction.y * direction.y).sqrt();
        let r = if c > 0.0 {
            direction.z.acos() / (2.0 * c * std::f32::consts::PI)
        } else {
            0.0
        };
        let u = ((0.5 + r * direction.x) * self.width as f32) as isize;
        let v = ((0.5 - r * direction.y) * self.height as f32) as isize;
        let u = u.clamp(0, self.width as isize - 1) as usize;
        let v = v.clamp(0, self.height as isize - 1) as usize;
        let id = 3 * (u + v * self.width);
        Color::new(self.texels[id], self.texels[id + 1], self.texels[id + 2])
    }
}

/// Geometry and shading data accumulated between `begin_scene` and
/// `end_scene`.
#[derive(Default)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub materials: Vec<Material>,
    pub lights: Vec<PointLight>,
    pub emissive_materials: Vec<EmissiveMaterial>,
    pub env_map: Option<EnvironmentMap>,
}

impl Scene {
    /// Clear geometry, lights and materials for a new scene block. The
    /// environment map and emissive materials persist across blocks.
    pub fn restart(&mut self) {
        self.primitives.clear();
        self.lights.clear();
        self.materials.clear();
    }

    /// Index the primitives bind to at append time: the most recently
    /// declared material, or -1 when none exists yet.
    pub fn latest_material_id(&self) -> i32 {
        self.materials.len() as i32 - 1
    }

    pub fn material(&self, id: i32) -> Option<&Material> {
        usize::try_from(id).ok().and_then(|i| self.materials.get(i))
    }
}
