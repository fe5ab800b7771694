//! Surface materials.
//!
//! A material is evaluated at a hit point and reports what the path tracer
//! should do next: stop with a colour, follow one fixed ray, or draw a new
//! direction from a density.

use crate::hittable::HitRecord;
use crate::pdf::Pdf;
use crate::phong::Phong;
use crate::sampling::{gen_f32, random_unit_vector};
use crate::{Ray, Scene};
use ivar_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Color type alias (linear RGB, usually 0-1 for albedo)
pub type Color = Vec3;

/// Nested mirror evaluations allowed before falling back to the background.
pub const MAX_MIRROR_DEPTH: u32 = 8;

/// What happens to the path after a material evaluation.
#[derive(Debug, Clone, Copy)]
pub enum Scatter {
    /// The path ends here with the record's colour
    Absorb,
    /// Continue along a fixed ray (mirror, glass)
    Specular(Ray),
    /// Draw the continuation from a density around the hit
    Diffuse(Pdf<'static>),
}

/// Result of evaluating a material at a hit.
#[derive(Debug, Clone, Copy)]
pub struct EvalRecord {
    /// Emitted or shaded colour when absorbing, attenuation otherwise
    pub color: Color,
    pub scatter: Scatter,
}

impl EvalRecord {
    pub fn absorb(color: Color) -> Self {
        Self {
            color,
            scatter: Scatter::Absorb,
        }
    }
}

/// The fixed set of surface materials.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Lambertian reflector
    Diffuse { albedo: Color },
    /// Mirror with a fuzzy lobe; `fuzz` 0 is a perfect mirror
    Metal { albedo: Color, fuzz: f32 },
    /// Clear refractive material
    Dielectric { refraction_index: f32 },
    /// Emitter; radiance is `color * intensity` from the front face
    Light { color: Color, intensity: f32 },
    /// Local ambient/diffuse/specular shading against the scene lights
    Phong(Phong),
    /// Phong blended with a traced mirror reflection by Schlick reflectance
    PhongMirror { phong: Phong, refraction_index: f32 },
}

impl Material {
    pub fn diffuse(albedo: Color) -> Self {
        Material::Diffuse { albedo }
    }

    /// Metal material. Fuzz is clamped to [0, 1].
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Dielectric with the given refractive index (1.5 for glass).
    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    pub fn light(color: Color, intensity: f32) -> Self {
        Material::Light { color, intensity }
    }

    /// Phong material with the default coefficients.
    pub fn phong(albedo: Color, shininess: f32) -> Self {
        Material::Phong(Phong::new(albedo, shininess))
    }

    pub fn phong_mirror(albedo: Color, shininess: f32, refraction_index: f32) -> Self {
        Material::PhongMirror {
            phong: Phong::new(albedo, shininess),
            refraction_index,
        }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::Light { .. })
    }

    /// Scalar emission strength, used to weight light selection.
    pub fn emission_intensity(&self) -> f32 {
        match self {
            Material::Light { intensity, .. } => *intensity,
            _ => 0.0,
        }
    }

    /// Radiance leaving an emitter, independent of the side it is seen from.
    pub fn radiance(&self) -> Color {
        match self {
            Material::Light { color, intensity } => *color * *intensity,
            _ => Color::ZERO,
        }
    }

    /// Radiance emitted toward the ray that produced `hit`.
    ///
    /// Only the front face of an emitter shines.
    pub fn emitted(&self, hit: &HitRecord) -> Color {
        if hit.front_face {
            self.radiance()
        } else {
            Color::ZERO
        }
    }

    /// Constant BRDF factor applied to next-event estimates.
    pub fn brdf_factor(&self) -> f32 {
        match self {
            Material::Diffuse { .. } => 1.0 / PI,
            _ => 0.0,
        }
    }

    /// Density with which this material scatters into `scattered`.
    pub fn scatter_pdf(&self, hit: &HitRecord, scattered: &Ray) -> f32 {
        match self {
            Material::Diffuse { .. } => (hit.normal.dot(scattered.direction()) / PI).max(0.0),
            _ => 0.0,
        }
    }

    /// Evaluate the material for `ray` arriving at `hit`.
    pub fn evaluate(
        &self,
        scene: &Scene,
        ray: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> EvalRecord {
        self.evaluate_nested(scene, ray, hit, rng, 0)
    }

    fn evaluate_nested(
        &self,
        scene: &Scene,
        ray: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
        mirror_depth: u32,
    ) -> EvalRecord {
        match self {
            Material::Light { .. } => EvalRecord::absorb(self.emitted(hit)),

            Material::Diffuse { albedo } => EvalRecord {
                color: *albedo,
                scatter: Scatter::Diffuse(Pdf::cosine(hit.normal)),
            },

            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray.direction(), hit.normal).normalize_or_zero()
                    + *fuzz * random_unit_vector(rng);

                // Rays bounced below the surface are absorbed
                if reflected.dot(hit.normal) > 0.0 {
                    EvalRecord {
                        color: *albedo,
                        scatter: Scatter::Specular(Ray::new(hit.p, reflected)),
                    }
                } else {
                    EvalRecord::absorb(Color::ZERO)
                }
            }

            Material::Dielectric { refraction_index } => {
                let ri = if hit.front_face {
                    1.0 / refraction_index
                } else {
                    *refraction_index
                };

                let unit_direction = ray.direction();
                let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                let cannot_refract = ri * sin_theta > 1.0;
                let direction = if cannot_refract || reflectance(cos_theta, ri) > gen_f32(rng) {
                    reflect(unit_direction, hit.normal)
                } else {
                    refract(unit_direction, hit.normal, ri)
                };

                EvalRecord {
                    color: Color::ONE,
                    scatter: Scatter::Specular(Ray::new(hit.p, direction)),
                }
            }

            Material::Phong(phong) => EvalRecord::absorb(phong.shade(scene, ray, hit, rng)),

            Material::PhongMirror {
                phong,
                refraction_index,
            } => {
                let reflect_ray = Ray::new(hit.p, reflect(ray.direction(), hit.normal));

                let reflect_color = if mirror_depth >= MAX_MIRROR_DEPTH {
                    scene.background
                } else {
                    match scene.hit(&reflect_ray) {
                        Some(reflect_hit) => {
                            reflect_hit
                                .object
                                .material()
                                .evaluate_nested(scene, &reflect_ray, &reflect_hit, rng, mirror_depth + 1)
                                .color
                        }
                        None => scene.background,
                    }
                };

                let cos_theta = (-ray.direction()).dot(hit.normal).min(1.0);
                let r = reflectance(cos_theta, *refraction_index);
                let shaded = phong.shade(scene, ray, hit, rng);

                EvalRecord::absorb((1.0 - r) * shaded + r * reflect_color)
            }
        }
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Schlick's approximation of Fresnel reflectance.
pub fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
