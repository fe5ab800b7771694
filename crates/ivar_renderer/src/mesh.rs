//! Triangle soup primitive with a bounding box pre-check.

use crate::cuboid::Cuboid;
use crate::hittable::SurfaceHit;
use crate::planar::Planar;
use crate::primitive::SurfaceSample;
use crate::sampling::{build_cdf, gen_f32, sample_cdf};
use crate::Ray;
use ivar_core::TriangleMesh;
use ivar_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// A list of triangles tested as one object.
///
/// There is no acceleration structure: a ray that reaches the bounding box
/// is tested against every triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    triangles: Vec<Planar>,
    /// Box around all vertices; `None` for an empty mesh
    bounds: Option<Cuboid>,
    /// Triangle selection CDF weighted by triangle area
    triangle_cdf: Vec<f32>,
    area: f32,
}

impl Mesh {
    /// Build from vertex triples, one per triangle.
    pub fn new(triangles: &[[Vec3; 3]]) -> Self {
        let bounds = Aabb::enclosing(triangles.iter().flatten().copied())
            .map(|aabb| Cuboid::new(aabb.min(), aabb.max()));
        let triangles: Vec<Planar> = triangles
            .iter()
            .map(|[a, b, c]| Planar::triangle(*a, *b, *c))
            .collect();

        let areas: Vec<f32> = triangles.iter().map(Planar::area).collect();
        let (triangle_cdf, area) = build_cdf(&areas);

        Self {
            triangles,
            bounds,
            triangle_cdf,
            area,
        }
    }

    pub fn from_triangle_mesh(mesh: &TriangleMesh) -> Self {
        Self::new(&mesh.triangles())
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn bounds(&self) -> Option<&Cuboid> {
        self.bounds.as_ref()
    }

    /// Nearest triangle hit within `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        // Every triangle hit inside `ray_t` lies on a box crossing at or
        // beyond it, so the box is tested without the upper bound.
        self.bounds
            .as_ref()?
            .intersect(ray, Interval::from_min(ray_t.min))?;

        let mut closest: Option<SurfaceHit> = None;
        for triangle in &self.triangles {
            let interval = closest.map_or(ray_t, |hit| ray_t.with_max(hit.t));
            if let Some(hit) = triangle.intersect(ray, interval) {
                closest = Some(hit);
            }
        }
        closest
    }

    /// Uniform point on the surface: a triangle picked by area, then a
    /// point on it.
    pub fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        if self.triangles.is_empty() {
            return SurfaceSample {
                p: Vec3::ZERO,
                normal: Vec3::ZERO,
            };
        }
        let i = sample_cdf(&self.triangle_cdf, gen_f32(rng));
        self.triangles[i].sample(rng)
    }

    /// Solid-angle density of `sample` seen from `origin` along `direction`.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.triangles
            .iter()
            .map(|triangle| triangle.density_within(origin, direction, self.area))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Unit square at z = 0 split into two triangles, facing +Z.
    fn square() -> Mesh {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(1.0, 1.0, 0.0);
        let d = Vec3::new(0.0, 1.0, 0.0);
        Mesh::new(&[[a, b, c], [a, c, d]])
    }

    #[test]
    fn test_mesh_area_and_bounds() {
        let mesh = square();

        assert_eq!(mesh.len(), 2);
        assert!((mesh.area() - 1.0).abs() < 1e-6);
        // Flat mesh still gets a box with some thickness
        let bounds = mesh.bounds().unwrap();
        assert!(bounds.max().z > bounds.min().z);
    }

    #[test]
    fn test_mesh_hit() {
        let mesh = square();
        let ray = Ray::new(Vec3::new(0.75, 0.25, 2.0), Vec3::NEG_Z);
        let hit = mesh.intersect(&ray, Interval::from_min(0.001)).unwrap();

        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.outward_normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_mesh_miss_outside_bounds() {
        let mesh = square();
        let ray = Ray::new(Vec3::new(3.0, 3.0, 2.0), Vec3::NEG_Z);
        assert!(mesh.intersect(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_mesh_hit_with_narrow_interval() {
        // The box exit lies beyond ray_t.max; the triangle does not
        let mesh = Mesh::new(&[[
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ]]);
        let ray = Ray::new(Vec3::new(0.0, -0.5, -0.6), Vec3::Z);
        let hit = mesh.intersect(&ray, Interval::new(0.001, 0.5));
        assert!(hit.is_some());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new(&[]);
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(mesh.intersect(&ray, Interval::UNIVERSE).is_none());
        assert_eq!(mesh.pdf_value(Vec3::ZERO, Vec3::Z), 0.0);
    }

    #[test]
    fn test_samples_on_mesh() {
        let mesh = square();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let s = mesh.sample(&mut rng);
            assert!((0.0..=1.0).contains(&s.p.x) && (0.0..=1.0).contains(&s.p.y));
            assert_eq!(s.p.z, 0.0);
        }
    }

    #[test]
    fn test_pdf_value_matches_quad() {
        let mesh = square();
        let origin = Vec3::new(0.3, 0.6, 2.0);
        // distance 2, cos 1, total area 1
        let value = mesh.pdf_value(origin, Vec3::NEG_Z);
        assert!((value - 4.0).abs() < 1e-3, "value={}", value);
    }

    #[test]
    fn test_from_triangle_mesh() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let source = TriangleMesh::new(positions, vec![0, 1, 2]).unwrap();
        let mesh = Mesh::from_triangle_mesh(&source);

        assert_eq!(mesh.len(), 1);
        assert!((mesh.area() - 0.5).abs() < 1e-6);
    }
}
