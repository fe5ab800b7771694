//! Ray-surface intersection records.

use crate::{Primitive, Ray};
use ivar_math::Vec3;

/// Geometric result of a shape intersection, before orientation.
///
/// Shapes report the outward normal; `HitRecord` turns it into a normal
/// facing the incoming ray.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit normal pointing out of the surface
    pub outward_normal: Vec3,
}

/// Record of a ray-primitive intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// The primitive that was hit
    pub object: &'a Primitive,
}

impl<'a> HitRecord<'a> {
    /// Build a record for `object` from a shape intersection.
    pub fn new(ray: &Ray, surface: SurfaceHit, object: &'a Primitive) -> Self {
        let mut rec = Self {
            p: surface.p,
            normal: surface.outward_normal,
            t: surface.t,
            front_face: true,
            object,
        };
        rec.set_face_normal(ray, surface.outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// Whether this hit is on exactly `primitive` (identity, not equality).
    #[inline]
    pub fn is_on(&self, primitive: &Primitive) -> bool {
        std::ptr::eq(self.object, primitive)
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("p", &self.p)
            .field("normal", &self.normal)
            .field("t", &self.t)
            .field("front_face", &self.front_face)
            .field("object", &self.object.kind())
            .finish()
    }
}

/// Keep the closer of two optional hits.
pub(crate) fn closer<'a>(a: Option<HitRecord<'a>>, b: Option<HitRecord<'a>>) -> Option<HitRecord<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}
