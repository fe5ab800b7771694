//! Direction densities used for importance sampling.

use crate::primitive::Primitive;
use crate::sampling::{cdf_probability, cosine_hemisphere, gen_f32, random_unit_vector};
use crate::Scene;
use ivar_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Weight of the primary strategy in a mixture.
pub const MIXTURE_WEIGHT: f32 = 0.99;

/// A probability density over directions that can also be sampled.
#[derive(Debug, Clone, Copy)]
pub enum Pdf<'a> {
    /// `max(cos, 0) / pi` around a unit axis
    Cosine { axis: Vec3 },
    /// Uniform over the whole sphere
    Sphere,
    /// Directions from `origin` toward uniform points on `primitive`
    Primitive { primitive: &'a Primitive, origin: Vec3 },
    /// Directions from `origin` toward a power-sampled scene light
    Lights { scene: &'a Scene, origin: Vec3 },
    /// `MIXTURE_WEIGHT` of `primary` plus the rest of `fallback`
    Mixture {
        primary: &'a Pdf<'a>,
        fallback: &'a Pdf<'a>,
    },
}

impl<'a> Pdf<'a> {
    pub fn cosine(axis: Vec3) -> Self {
        Pdf::Cosine {
            axis: axis.normalize_or_zero(),
        }
    }

    pub fn toward(primitive: &'a Primitive, origin: Vec3) -> Self {
        Pdf::Primitive { primitive, origin }
    }

    /// Density toward the scene's lights, or uniform when there are none.
    pub fn lights(scene: &'a Scene, origin: Vec3) -> Self {
        if scene.lights().is_empty() {
            Pdf::Sphere
        } else {
            Pdf::Lights { scene, origin }
        }
    }

    pub fn mixture(primary: &'a Pdf<'a>, fallback: &'a Pdf<'a>) -> Self {
        Pdf::Mixture { primary, fallback }
    }

    /// Density of `direction` (need not be normalized).
    pub fn value(&self, direction: Vec3) -> f32 {
        match self {
            Pdf::Cosine { axis } => {
                let cosine = direction.normalize_or_zero().dot(*axis);
                (cosine / PI).max(0.0)
            }
            Pdf::Sphere => 1.0 / (4.0 * PI),
            Pdf::Primitive { primitive, origin } => primitive.pdf_value(*origin, direction),
            Pdf::Lights { scene, origin } => scene
                .lights()
                .iter()
                .enumerate()
                .map(|(i, light)| {
                    cdf_probability(scene.light_cdf(), i) * light.pdf_value(*origin, direction)
                })
                .sum(),
            Pdf::Mixture { primary, fallback } => {
                MIXTURE_WEIGHT * primary.value(direction)
                    + (1.0 - MIXTURE_WEIGHT) * fallback.value(direction)
            }
        }
    }

    /// Draw a direction distributed by this density.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Cosine { axis } => {
                let (t, b) = axis.any_orthonormal_pair();
                let local = cosine_hemisphere(rng);
                local.x * t + local.y * b + local.z * *axis
            }
            Pdf::Sphere => random_unit_vector(rng),
            Pdf::Primitive { primitive, origin } => primitive.sample(rng).p - *origin,
            Pdf::Lights { scene, origin } => match scene.sample_light(rng) {
                Some((light, _)) => Pdf::toward(light, *origin).generate(rng),
                None => random_unit_vector(rng),
            },
            Pdf::Mixture { primary, fallback } => {
                if gen_f32(rng) < MIXTURE_WEIGHT {
                    primary.generate(rng)
                } else {
                    fallback.generate(rng)
                }
            }
        }
    }
}
