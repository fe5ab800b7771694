//! Axis-aligned box built from six quads.

use crate::hittable::SurfaceHit;
use crate::planar::Planar;
use crate::primitive::SurfaceSample;
use crate::sampling::{build_cdf, gen_f32, sample_cdf};
use crate::Ray;
use ivar_math::{Interval, Vec3};
use rand::RngCore;

/// A box spanned by two opposite corners, faces pointing outwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    faces: [Planar; 6],
    /// Face selection CDF weighted by face area
    face_cdf: Vec<f32>,
    area: f32,
}

impl Cuboid {
    /// Box with opposite corners `a` and `b`, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);

        let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, max.y - min.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, max.z - min.z);

        // Edge order chosen so u x v points out of the box
        let faces = [
            Planar::quad(Vec3::new(min.x, min.y, max.z), dx, dy), // front  (+z)
            Planar::quad(Vec3::new(max.x, min.y, min.z), -dx, dy), // back   (-z)
            Planar::quad(Vec3::new(min.x, min.y, min.z), dz, dy), // left   (-x)
            Planar::quad(Vec3::new(max.x, min.y, max.z), -dz, dy), // right  (+x)
            Planar::quad(Vec3::new(min.x, max.y, max.z), dx, -dz), // top    (+y)
            Planar::quad(Vec3::new(min.x, min.y, min.z), dx, dz), // bottom (-y)
        ];

        let areas: Vec<f32> = faces.iter().map(Planar::area).collect();
        let (face_cdf, area) = build_cdf(&areas);

        Self {
            min,
            max,
            faces,
            face_cdf,
            area,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn faces(&self) -> &[Planar; 6] {
        &self.faces
    }

    /// Nearest face hit within `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let mut closest: Option<SurfaceHit> = None;
        for face in &self.faces {
            let interval = closest.map_or(ray_t, |hit| ray_t.with_max(hit.t));
            if let Some(hit) = face.intersect(ray, interval) {
                closest = Some(hit);
            }
        }
        closest
    }

    /// Uniform point on the surface: a face picked by area, then a point on it.
    pub fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let face = sample_cdf(&self.face_cdf, gen_f32(rng));
        self.faces[face].sample(rng)
    }

    /// Solid-angle density of `sample` seen from `origin` along `direction`.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.faces
            .iter()
            .map(|face| face.density_within(origin, direction, self.area))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_box() -> Cuboid {
        Cuboid::new(Vec3::splat(1.0), Vec3::splat(-1.0))
    }

    #[test]
    fn test_faces_point_outwards() {
        let cuboid = unit_box();
        for face in cuboid.faces() {
            let center = face.vertices().iter().copied().sum::<Vec3>() / 4.0;
            assert!(face.normal().dot(center) > 0.0, "face at {:?} points inwards", center);
        }
        assert_eq!(cuboid.area(), 24.0);
        assert_eq!(cuboid.min(), Vec3::splat(-1.0));
    }

    #[test]
    fn test_nearest_face_hit() {
        let cuboid = unit_box();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = cuboid.intersect(&ray, Interval::from_min(0.001)).unwrap();

        assert!((hit.t - 4.0).abs() < 1e-5);
        assert_eq!(hit.outward_normal, Vec3::Z);
    }

    #[test]
    fn test_hit_from_inside() {
        let cuboid = unit_box();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = cuboid.intersect(&ray, Interval::from_min(0.001)).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-5);
        assert_eq!(hit.outward_normal, Vec3::X);
    }

    #[test]
    fn test_miss() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(unit_box().intersect(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_samples_are_area_weighted() {
        // A flat slab: the two big faces hold almost all of the area
        let slab = Cuboid::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.1, 10.0));
        let mut rng = StdRng::seed_from_u64(2);
        let n = 10_000;
        let on_big_faces = (0..n)
            .map(|_| slab.sample(&mut rng))
            .filter(|s| s.normal.y.abs() > 0.5)
            .count();

        // 200 of 204 area units are on the top and bottom faces
        let fraction = on_big_faces as f32 / n as f32;
        assert!((fraction - 200.0 / 204.0).abs() < 0.01, "fraction={}", fraction);
    }

    #[test]
    fn test_pdf_value_counts_both_faces() {
        let cuboid = unit_box();
        // Ray along the z axis crosses front (t=4) and back (t=6)
        let value = cuboid.pdf_value(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let expected = (16.0 + 36.0) / 24.0;
        assert!((value - expected).abs() < 1e-4, "value={}", value);
    }
}
