//! Planar primitives: quads and triangles.
//!
//! Both are spanned by an origin point `Q` and two edge vectors `u`, `v`.
//! A point on the plane is `Q + alpha*u + beta*v`; the shapes differ only in
//! which `(alpha, beta)` pairs lie inside them.

use crate::hittable::SurfaceHit;
use crate::primitive::SurfaceSample;
use crate::sampling::{gen_f32, triangle_coords};
use crate::{Ray, HIT_EPSILON};
use ivar_math::{Interval, Vec3};
use rand::RngCore;

/// Rays closer than this to parallel with the plane never hit it.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Boundary rule applied to planar coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarKind {
    /// Parallelogram: both coordinates in [0, 1]
    Quad,
    /// Triangle `Q, Q+u, Q+v`: alpha > 0, beta > 0, alpha + beta <= 1
    Triangle,
}

/// A quad or triangle with its plane constants precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planar {
    kind: PlanarKind,
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    /// Unit plane normal, `u x v` normalized
    normal: Vec3,
    /// Plane constant: normal . x = d
    d: f32,
    /// `n / (n . n)` with `n = u x v`, used to recover planar coordinates
    w: Vec3,
    area: f32,
}

impl Planar {
    fn new(kind: PlanarKind, origin: Vec3, u: Vec3, v: Vec3) -> Self {
        let n = u.cross(v);
        let nn = n.length_squared();
        let normal = n.normalize_or_zero();
        let w = if nn > 0.0 { n / nn } else { Vec3::ZERO };
        let parallelogram = n.length();
        let area = match kind {
            PlanarKind::Quad => parallelogram,
            PlanarKind::Triangle => 0.5 * parallelogram,
        };

        Self {
            kind,
            origin,
            u,
            v,
            normal,
            d: normal.dot(origin),
            w,
            area,
        }
    }

    /// Parallelogram with corner `origin` and edges `u`, `v`.
    ///
    /// The front face is the side `u x v` points to.
    pub fn quad(origin: Vec3, u: Vec3, v: Vec3) -> Self {
        Self::new(PlanarKind::Quad, origin, u, v)
    }

    /// Triangle through `a`, `b`, `c`; the front face follows the
    /// counter-clockwise winding `a -> b -> c`.
    pub fn triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new(PlanarKind::Triangle, a, b - a, c - a)
    }

    pub fn kind(&self) -> PlanarKind {
        self.kind
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// The three or four corner points.
    pub fn vertices(&self) -> Vec<Vec3> {
        match self.kind {
            PlanarKind::Quad => vec![
                self.origin,
                self.origin + self.u,
                self.origin + self.u + self.v,
                self.origin + self.v,
            ],
            PlanarKind::Triangle => vec![self.origin, self.origin + self.u, self.origin + self.v],
        }
    }

    fn is_interior(&self, alpha: f32, beta: f32) -> bool {
        match self.kind {
            PlanarKind::Quad => (0.0..=1.0).contains(&alpha) && (0.0..=1.0).contains(&beta),
            PlanarKind::Triangle => alpha > 0.0 && beta > 0.0 && alpha + beta <= 1.0,
        }
    }

    /// Intersection with the plane, accepted only inside the shape.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let denom = self.normal.dot(ray.direction());

        // Ray is parallel to the plane (or the shape is degenerate)
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let p = ray.at(t);
        let planar_hit = p - self.origin;
        let alpha = self.w.dot(planar_hit.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hit));
        if !self.is_interior(alpha, beta) {
            return None;
        }

        Some(SurfaceHit {
            t,
            p,
            outward_normal: self.normal,
        })
    }

    /// Uniform point on the surface.
    pub fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let (alpha, beta) = match self.kind {
            PlanarKind::Quad => (gen_f32(rng), gen_f32(rng)),
            PlanarKind::Triangle => triangle_coords(rng),
        };
        SurfaceSample {
            p: self.origin + alpha * self.u + beta * self.v,
            normal: self.normal,
        }
    }

    /// Solid-angle density of a uniform point on a surface of total area
    /// `area` that contains this shape, along `direction` from `origin`.
    ///
    /// `area` is this shape's own area for a lone quad or triangle, or the
    /// area of the whole box/mesh it belongs to.
    pub(crate) fn density_within(&self, origin: Vec3, direction: Vec3, area: f32) -> f32 {
        if area <= 0.0 {
            return 0.0;
        }
        let ray = Ray::new(origin, direction);
        match self.intersect(&ray, Interval::from_min(HIT_EPSILON)) {
            Some(hit) => {
                let cosine = ray.direction().dot(self.normal).abs();
                hit.t * hit.t / (cosine * area)
            }
            None => 0.0,
        }
    }

    /// Solid-angle density of `sample` seen from `origin` along `direction`.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.density_within(origin, direction, self.area)
    }
}
