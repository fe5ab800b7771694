//! Ray type for path tracing.
//!
//! A ray is defined by an origin point and a unit direction vector. The
//! direction is normalized once at construction and never changes.

use ivar_math::Vec3;

/// A ray with origin and unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray
    origin: Vec3,
    /// Direction vector (unit length)
    direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing `direction`.
    ///
    /// A zero direction yields a zero direction; such a ray hits nothing.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}
