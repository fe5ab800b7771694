//! Iterative Monte Carlo path tracing.
//!
//! A path carries its accumulated radiance and its throughput weight. Each
//! vertex either ends the path (miss, emitter, absorbing material) or picks
//! a continuation ray and scales the weight by the sampling ratio.

use crate::material::{Color, Scatter};
use crate::pdf::Pdf;
use crate::sampling::gen_f32;
use crate::{Ray, Scene};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Lower bound on the Russian-roulette survival probability.
const MIN_SURVIVAL: f32 = 0.1;

/// How direct lighting reaches diffuse surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightSampling {
    /// Shadow ray to one sampled light at every diffuse vertex; emitters
    /// hit after a diffuse bounce are not counted again
    #[default]
    NextEvent,
    /// Bounce directions drawn from a mix of the material density and a
    /// density toward the lights; emitters are counted wherever they are hit
    Mixture,
}

/// Path integrator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTracer {
    /// Number of bounces after the camera ray
    pub max_depth: u32,
    pub russian_roulette: bool,
    /// Roulette applies only past this depth
    pub min_depth: u32,
    pub light_sampling: LightSampling,
}

impl Default for PathTracer {
    fn default() -> Self {
        Self {
            max_depth: 50,
            russian_roulette: true,
            min_depth: 3,
            light_sampling: LightSampling::NextEvent,
        }
    }
}

impl PathTracer {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_roulette(mut self, enabled: bool, min_depth: u32) -> Self {
        self.russian_roulette = enabled;
        self.min_depth = min_depth;
        self
    }

    pub fn with_light_sampling(mut self, light_sampling: LightSampling) -> Self {
        self.light_sampling = light_sampling;
        self
    }

    /// Radiance arriving along `ray`.
    ///
    /// Segment `depth` is traced for `depth` in `0..=max_depth`; surfaces
    /// hit by the last segment may still emit or absorb, but no longer
    /// scatter.
    pub fn trace(&self, scene: &Scene, ray: Ray, rng: &mut dyn RngCore) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = ray;
        let mut count_emission = true;

        for depth in 0..=self.max_depth {
            if self.russian_roulette && depth > self.min_depth {
                let survival = throughput.max_element().clamp(MIN_SURVIVAL, 1.0);
                if gen_f32(rng) >= survival {
                    break;
                }
                throughput /= survival;
            }

            let Some(hit) = scene.hit(&ray) else {
                radiance += throughput * scene.ambient_light;
                break;
            };

            let material = hit.object.material();
            if material.is_emissive() {
                if count_emission {
                    radiance += throughput * material.emitted(&hit);
                }
                break;
            }

            let eval = material.evaluate(scene, &ray, &hit, rng);
            let pdf = match eval.scatter {
                Scatter::Absorb => {
                    radiance += throughput * eval.color;
                    break;
                }
                _ if depth == self.max_depth => break,
                Scatter::Specular(next) => {
                    throughput *= eval.color;
                    ray = next;
                    count_emission = true;
                    continue;
                }
                Scatter::Diffuse(pdf) => pdf,
            };

            let light_pdf;
            let mixture;
            let sampler = match self.light_sampling {
                LightSampling::NextEvent => {
                    radiance += scene.light_radiance(&hit, rng)
                        * throughput
                        * eval.color
                        * material.brdf_factor();
                    count_emission = false;
                    &pdf
                }
                LightSampling::Mixture => {
                    light_pdf = Pdf::lights(scene, hit.p);
                    mixture = Pdf::mixture(&pdf, &light_pdf);
                    count_emission = true;
                    &mixture
                }
            };

            let mut direction = sampler.generate(rng);
            if direction.length_squared() < 1e-16 {
                direction = hit.normal;
            }
            let scattered = Ray::new(hit.p, direction);

            let density = sampler.value(scattered.direction());
            if !(density.is_finite() && density > 0.0) {
                break;
            }
            throughput *= eval.color * material.scatter_pdf(&hit, &scattered) / density;
            if throughput == Color::ZERO {
                break;
            }
            ray = scattered;
        }

        radiance
    }
}
