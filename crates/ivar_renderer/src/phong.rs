//! Phong local shading.

use crate::hittable::HitRecord;
use crate::material::{reflect, Color};
use crate::{Ray, Scene};
use ivar_math::Vec3;
use rand::RngCore;

/// Shadow rays cast toward each area light.
const AREA_LIGHT_SAMPLES: u32 = 10;

/// Ambient + diffuse + specular shading against the scene's lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phong {
    pub albedo: Color,
    pub shininess: f32,
    /// Ambient coefficient
    pub ka: f32,
    /// Diffuse coefficient
    pub kd: f32,
    /// Specular coefficient
    pub ks: f32,
}

impl Phong {
    pub fn new(albedo: Color, shininess: f32) -> Self {
        Self {
            albedo,
            shininess,
            ka: 0.5,
            kd: 0.5,
            ks: 0.5,
        }
    }

    pub fn with_coefficients(mut self, ka: f32, kd: f32, ks: f32) -> Self {
        self.ka = ka;
        self.kd = kd;
        self.ks = ks;
        self
    }

    /// Shade `hit` as seen along `ray`.
    ///
    /// Sphere lights act as point lights at their centre; every other light
    /// is sampled over its surface. Each light sample counts only when a
    /// shadow ray reaches that light first.
    pub fn shade(&self, scene: &Scene, ray: &Ray, hit: &HitRecord, rng: &mut dyn RngCore) -> Color {
        let view_dir = -ray.direction();
        let mut total_diff = Color::ZERO;
        let mut total_spec = Color::ZERO;

        for light in scene.lights() {
            let radiance = light.material().radiance();
            let point_light = light.as_sphere().map(|s| (s.center(), s.radius()));
            let samples = if point_light.is_some() { 1 } else { AREA_LIGHT_SAMPLES };

            let mut diff = Color::ZERO;
            let mut spec = Color::ZERO;
            for _ in 0..samples {
                // A point light is reached at its surface, short of the centre
                let (target, inset) = match point_light {
                    Some((center, radius)) => (center, radius),
                    None => (light.sample(rng).p, 0.0),
                };
                let to_light = target - hit.p;
                let light_dir = to_light.normalize_or_zero();
                if light_dir == Vec3::ZERO {
                    continue;
                }

                let distance = (to_light.length() - inset).max(0.0);
                if !scene.light_visible(hit.p, light_dir, light, distance) {
                    continue;
                }

                diff += hit.normal.dot(light_dir).max(0.0) * radiance;

                let reflect_dir = reflect(-light_dir, hit.normal).normalize_or_zero();
                spec += radiance * reflect_dir.dot(view_dir).max(0.0).powf(self.shininess);
            }
            total_diff += diff / samples as f32;
            total_spec += spec / samples as f32;
        }

        self.albedo * (self.ka * scene.ambient_light + self.kd * total_diff + self.ks * total_spec)
    }
}
