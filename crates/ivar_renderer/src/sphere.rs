//! Sphere primitive for ray tracing.

use crate::hittable::SurfaceHit;
use crate::primitive::SurfaceSample;
use crate::sampling::random_unit_vector;
use crate::{Ray, HIT_EPSILON};
use ivar_math::{Interval, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    /// Both roots of the ray-sphere quadratic, nearest first.
    fn roots(&self, ray: &Ray) -> Option<(f32, f32)> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        Some(((h - sqrtd) / a, (h + sqrtd) / a))
    }

    /// Nearest intersection within `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        // A zero-radius sphere is a point with no surface to hit.
        if self.radius <= 0.0 {
            return None;
        }

        let (near, far) = self.roots(ray)?;
        let root = if ray_t.contains(near) {
            near
        } else if ray_t.contains(far) {
            far
        } else {
            return None;
        };

        let p = ray.at(root);
        Some(SurfaceHit {
            t: root,
            p,
            outward_normal: (p - self.center) / self.radius,
        })
    }

    /// Uniform point on the surface.
    pub fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let normal = random_unit_vector(rng);
        SurfaceSample {
            p: self.center + self.radius * normal,
            normal,
        }
    }

    /// Solid-angle density of `sample` as seen from `origin` along `direction`.
    ///
    /// Both crossings of the line count, since uniform area sampling can
    /// land on the far side of the sphere.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }

        let ray = Ray::new(origin, direction);
        let Some((near, far)) = self.roots(&ray) else {
            return 0.0;
        };

        [near, far]
            .into_iter()
            .filter(|&t| t > HIT_EPSILON)
            .map(|t| {
                let normal = (ray.at(t) - self.center) / self.radius;
                let cosine = ray.direction().dot(normal).abs();
                if cosine < 1e-6 {
                    0.0
                } else {
                    t * t / (cosine * area)
                }
            })
            .sum()
    }
}
