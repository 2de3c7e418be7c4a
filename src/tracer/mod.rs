//! Recursive Whitted-style ray tracer.
//!
//! Primary rays are recovered by pushing each pixel center through the
//! inverse of the composed projection * model-view matrix: the pixel's NDC
//! coordinate is placed on the near and far planes, both are unprojected and
//! perspective-divided, and the ray runs from near toward far. Each ray is
//! traced against every primitive (no acceleration structure), shaded with
//! Phong plus shadow rays, and followed recursively through reflection and
//! refraction up to a fixed depth.
//!
//! Rendering is parallel over disjoint horizontal bands of the color buffer;
//! workers share the scene and inverse matrix immutably, so no locking is
//! needed beyond the final join.

mod antialias;
mod shading;

use rayon::prelude::*;

use crate::color::Color;
use crate::math::{Mat4, Vec4};
use crate::primitive::{Primitive, Ray, EPSILON_T};
use crate::scene::{PointLight, Scene};

/// Reflection/refraction recursion limit.
const MAX_RECURSION_DEPTH: u32 = 8;

/// Offset applied along the normal to keep secondary rays from
/// re-intersecting the surface they start on.
const INTERSECTION_BIAS: f32 = 1e-4;

/// One render invocation: the scene, the inverse projection * model-view
/// matrix, and the image geometry, all borrowed immutably so worker threads
/// can share them.
pub struct Tracer<'a> {
    scene: &'a Scene,
    inv_pvm: Mat4,
    clear_color: Color,
    width: usize,
    height: usize,
}

impl<'a> Tracer<'a> {
    pub fn new(
        scene: &'a Scene,
        inv_pvm: Mat4,
        clear_color: Color,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            scene,
            inv_pvm,
            clear_color,
            width,
            height,
        }
    }

    /// Trace every pixel into `buffer`, partitioning scanlines into one band
    /// per available thread; the last band absorbs the remainder rows.
    pub fn render(&self, buffer: &mut [Color]) {
        debug_assert_eq!(buffer.len(), self.width * self.height);

        let threads = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
            .min(self.height.max(1));
        let rows_per_band = (self.height / threads).max(1);

        let mut bands: Vec<(usize, &mut [Color])> = Vec::with_capacity(threads);
        let mut rest = buffer;
        let mut row = 0;
        for band in 0..threads {
            if row >= self.height {
                break;
            }
            let end_row = if band == threads - 1 {
                self.height
            } else {
                (row + rows_per_band).min(self.height)
            };
            let (chunk, tail) = rest.split_at_mut((end_row - row) * self.width);
            bands.push((row, chunk));
            rest = tail;
            row = end_row;
        }

        bands.into_par_iter().for_each(|(start_row, rows)| {
            for (dy, row_pixels) in rows.chunks_exact_mut(self.width).enumerate() {
                let y = start_row + dy;
                for (x, pixel) in row_pixels.iter_mut().enumerate() {
                    let ray = self.primary_ray(x as f32 + 0.5, y as f32 + 0.5);
                    *pixel = self.trace_ray(&ray, 0);
                }
            }
        });
    }

    /// Ray through the pixel-space point (x, y), reconstructed from the
    /// inverse projection * model-view matrix. The viewport plays no part.
    fn primary_ray(&self, x: f32, y: f32) -> Ray {
        let ndc_x = (2.0 * x) / self.width as f32 - 1.0;
        let ndc_y = -1.0 + (2.0 * y) / self.height as f32;

        let near = self.inv_pvm * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = self.inv_pvm * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near / near.w;
        let far = far / far.w;

        Ray::new(near, (far - near).normalized())
    }

    /// Closest accepted hit along the ray. Opaque primitives facing away
    /// from the ray are culled; transparent ones are kept so rays can leave
    /// them from the inside.
    fn find_closest(&self, ray: &Ray) -> Option<(&Primitive, f32)> {
        let mut closest_t = f32::INFINITY;
        let mut closest = None;

        for primitive in &self.scene.primitives {
            let Some(t) = primitive.intersect(ray) else {
                continue;
            };
            if t >= closest_t {
                continue;
            }

            let transparent = self
                .scene
                .material(primitive.material_id)
                .is_some_and(|m| m.transmittance > 0.0);
            if !transparent && primitive.normal_at(ray.at(t)).dot3(ray.direction) > 0.0 {
                continue;
            }

            closest_t = t;
            closest = Some(primitive);
        }

        closest.map(|p| (p, closest_t))
    }

    /// Whether `point` has an unobstructed path to the light.
    fn visible_from(&self, point: Vec4, light: &PointLight) -> bool {
        let light_dir = (light.center - point).normalized();
        let shadow_ray = Ray::new(point, light_dir);
        let light_t = shadow_ray.component_t(light.center) - EPSILON_T;

        for primitive in &self.scene.primitives {
            if let Some(t) = primitive.intersect(&shadow_ray) {
                if t < light_t {
                    return false;
                }
            }
        }
        true
    }

    fn trace_ray(&self, ray: &Ray, depth: u32) -> Color {
        let Some((primitive, t)) = self.find_closest(ray) else {
            if let Some(map) = &self.scene.env_map {
                return map.sample(ray.direction);
            }
            return self.clear_color;
        };

        let point = ray.at(t);
        let normal = primitive.normal_at(point);
        let biased_point = point + normal * INTERSECTION_BIAS;
        let mut color = Color::BLACK;

        let Some(material) = self.scene.material(primitive.material_id) else {
            // no material was declared before this primitive; nothing to shade
            return color;
        };

        for light in &self.scene.lights {
            if self.visible_from(biased_point, light) {
                color += shading::phong(light, point, normal, ray.origin, material);
            }
        }

        if depth < MAX_RECURSION_DEPTH {
            if material.k_specular > 0.0 {
                let reflected_dir =
                    (ray.direction - normal * (2.0 * normal.dot3(ray.direction))).normalized();
                let reflected_ray = Ray::new(biased_point, reflected_dir);
                color += self.trace_ray(&reflected_ray, depth + 1) * material.k_specular;
            }

            if material.transmittance > 0.0 {
                if let Some(dir) = shading::refract_direction(normal, material.ior, ray.direction)
                {
                    // bias into the object, against the outward normal
                    let refracted_ray = Ray::new(point - normal * INTERSECTION_BIAS, dir.normalized());
                    color += self.trace_ray(&refracted_ray, depth + 1) * material.transmittance;
                }
            }
        }

        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EnvironmentMap, Material};

    fn plain_material(r: f32, g: f32, b: f32) -> Material {
        Material {
            color: Color::new(r, g, b),
            k_diffuse: 1.0,
            k_specular: 0.0,
            shininess: 1.0,
            transmittance: 0.0,
            ior: 1.0,
        }
    }

    fn white_light(x: f32, y: f32, z: f32) -> PointLight {
        PointLight {
            center: Vec4::point(x, y, z),
            color: Color::new(1.0, 1.0, 1.0),
        }
    }

    /// Ortho projection looking down -z; identity model-view.
    fn ortho_inverse() -> Mat4 {
        Mat4::ortho(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0)
            .inverse()
            .expect("ortho is invertible")
    }

    fn bind_latest_material(scene: &mut Scene) {
        let id = scene.latest_material_id();
        scene.primitives.last_mut().unwrap().material_id = id;
    }

    #[test]
    fn lit_sphere_renders_red_center_and_clear_corners() {
        let mut scene = Scene::default();
        scene.materials.push(plain_material(1.0, 0.0, 0.0));
        scene
            .primitives
            .push(crate::primitive::Primitive::sphere(0.0, 0.0, -3.0, 1.0));
        bind_latest_material(&mut scene);
        scene.lights.push(white_light(0.0, 2.0, 0.0));

        let clear = Color::new(0.1, 0.2, 0.3);
        let tracer = Tracer::new(&scene, ortho_inverse(), clear, 50, 50);
        let mut buffer = vec![Color::BLACK; 50 * 50];
        tracer.render(&mut buffer);

        let center = buffer[25 + 25 * 50];
        assert!(center.r > 0.0, "sphere should receive red diffuse light");
        assert_eq!(center.g, 0.0);
        assert_eq!(buffer[0], clear);
        assert_eq!(buffer[49 + 49 * 50], clear);
    }

    #[test]
    fn occluder_casts_shadow() {
        let mut scene = Scene::default();
        scene.materials.push(plain_material(1.0, 1.0, 1.0));
        // floor triangle below a blocking sphere, light straight above
        scene.primitives.push(crate::primitive::Primitive::triangle(
            Vec4::point(-5.0, -1.0, -8.0),
            Vec4::point(5.0, -1.0, -8.0),
            Vec4::point(0.0, -1.0, 1.0),
        ));
        bind_latest_material(&mut scene);
        scene
            .primitives
            .push(crate::primitive::Primitive::sphere(0.0, 1.0, -3.0, 0.5));
        bind_latest_material(&mut scene);
        scene.lights.push(white_light(0.0, 5.0, -3.0));

        let tracer = Tracer::new(&scene, ortho_inverse(), Color::BLACK, 9, 9);

        // ray straight down the light axis hits the floor under the sphere
        let shadowed = Vec4::point(0.0, -1.0 + 1e-4, -3.0);
        assert!(!tracer.visible_from(shadowed, &scene.lights[0]));
        // a point far to the side is lit
        let lit = Vec4::point(4.0, -1.0 + 1e-4, -7.0);
        assert!(tracer.visible_from(lit, &scene.lights[0]));
    }

    #[test]
    fn mirror_reflects_environment() {
        let mut scene = Scene::default();
        scene.materials.push(Material {
            color: Color::new(1.0, 1.0, 1.0),
            k_diffuse: 0.0,
            k_specular: 1.0,
            shininess: 1.0,
            transmittance: 0.0,
            ior: 1.0,
        });
        scene
            .primitives
            .push(crate::primitive::Primitive::sphere(0.0, 0.0, -3.0, 1.0));
        bind_latest_material(&mut scene);
        // no lights: any color must arrive through the reflection
        scene.env_map = Some(EnvironmentMap::new(1, 1, vec![0.0, 0.8, 0.0]));

        let tracer = Tracer::new(&scene, ortho_inverse(), Color::BLACK, 51, 51);
        let mut buffer = vec![Color::BLACK; 51 * 51];
        tracer.render(&mut buffer);

        // central ray reflects straight back and samples the map
        let center = buffer[25 + 25 * 51];
        assert!((center.g - 0.8).abs() < 1e-3);
        assert_eq!(center.r, 0.0);
    }

    #[test]
    fn unity_ior_glass_passes_background_through() {
        let mut scene = Scene::default();
        scene.materials.push(Material {
            color: Color::new(1.0, 1.0, 1.0),
            k_diffuse: 0.0,
            k_specular: 0.0,
            shininess: 1.0,
            transmittance: 1.0,
            ior: 1.0,
        });
        scene
            .primitives
            .push(crate::primitive::Primitive::sphere(0.0, 0.0, -3.0, 1.0));
        bind_latest_material(&mut scene);

        let clear = Color::new(0.3, 0.0, 0.6);
        let tracer = Tracer::new(&scene, ortho_inverse(), clear, 51, 51);
        let mut buffer = vec![Color::BLACK; 51 * 51];
        tracer.render(&mut buffer);

        let center = buffer[25 + 25 * 51];
        assert!((center.r - clear.r).abs() < 1e-4);
        assert!((center.b - clear.b).abs() < 1e-4);
    }

    #[test]
    fn facing_mirrors_terminate_at_recursion_limit() {
        let mut scene = Scene::default();
        let mirror = Material {
            color: Color::new(1.0, 1.0, 1.0),
            k_diffuse: 0.0,
            k_specular: 1.0,
            shininess: 1.0,
            transmittance: 0.0,
            ior: 1.0,
        };
        scene.materials.push(mirror);
        // far mirror faces +z, near mirror faces -z (winding order flipped)
        scene.primitives.push(crate::primitive::Primitive::triangle(
            Vec4::point(-10.0, -10.0, -6.0),
            Vec4::point(10.0, -10.0, -6.0),
            Vec4::point(0.0, 10.0, -6.0),
        ));
        bind_latest_material(&mut scene);
        scene.primitives.push(crate::primitive::Primitive::triangle(
            Vec4::point(-10.0, -10.0, -2.0),
            Vec4::point(0.0, 10.0, -2.0),
            Vec4::point(10.0, -10.0, -2.0),
        ));
        bind_latest_material(&mut scene);

        let tracer = Tracer::new(&scene, ortho_inverse(), Color::BLACK, 3, 3);
        let ray = Ray::new(Vec4::point(0.0, 0.0, -4.0), Vec4::direction(0.0, 0.0, -1.0));
        // must return, not recurse forever
        let _ = tracer.trace_ray(&ray, 0);
    }

    #[test]
    fn unmaterialed_primitive_shades_to_black() {
        let mut scene = Scene::default();
        scene
            .primitives
            .push(crate::primitive::Primitive::sphere(0.0, 0.0, -3.0, 1.0));
        scene.lights.push(white_light(0.0, 2.0, 0.0));

        let tracer = Tracer::new(&scene, ortho_inverse(), Color::new(1.0, 1.0, 1.0), 3, 3);
        let ray = Ray::new(Vec4::point(0.0, 0.0, 0.0), Vec4::direction(0.0, 0.0, -1.0));
        assert_eq!(tracer.trace_ray(&ray, 0), Color::BLACK);
    }
}
