//! Scene primitives: a shape plus the material it is made of.

use crate::cuboid::Cuboid;
use crate::hittable::HitRecord;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::planar::{Planar, PlanarKind};
use crate::sphere::Sphere;
use crate::Ray;
use ivar_core::TriangleMesh;
use ivar_math::{Interval, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A point drawn on a primitive's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub p: Vec3,
    /// Outward unit normal at `p`
    pub normal: Vec3,
}

/// The fixed set of supported geometries.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    /// Quad or triangle
    Planar(Planar),
    Box(Cuboid),
    Mesh(Mesh),
}

/// Kind tag of a primitive, for logging and dispatch decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Sphere,
    Quad,
    Triangle,
    Box,
    Mesh,
}

/// A renderable object.
///
/// The material is shared: any number of primitives may point at the same
/// `Material`, and all of them are read-only while rendering.
#[derive(Debug, Clone)]
pub struct Primitive {
    shape: Shape,
    material: Arc<Material>,
    area: f32,
}

impl Primitive {
    pub fn new(shape: Shape, material: Arc<Material>) -> Self {
        let area = match &shape {
            Shape::Sphere(s) => s.area(),
            Shape::Planar(p) => p.area(),
            Shape::Box(b) => b.area(),
            Shape::Mesh(m) => m.area(),
        };
        Self {
            shape,
            material,
            area,
        }
    }

    pub fn sphere(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self::new(Shape::Sphere(Sphere::new(center, radius)), material)
    }

    pub fn quad(origin: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        Self::new(Shape::Planar(Planar::quad(origin, u, v)), material)
    }

    pub fn triangle(a: Vec3, b: Vec3, c: Vec3, material: Arc<Material>) -> Self {
        Self::new(Shape::Planar(Planar::triangle(a, b, c)), material)
    }

    /// Axis-aligned box with opposite corners `a` and `b`.
    pub fn cuboid(a: Vec3, b: Vec3, material: Arc<Material>) -> Self {
        Self::new(Shape::Box(Cuboid::new(a, b)), material)
    }

    /// Triangle soup from vertex triples.
    pub fn mesh(triangles: &[[Vec3; 3]], material: Arc<Material>) -> Self {
        Self::new(Shape::Mesh(Mesh::new(triangles)), material)
    }

    pub fn from_triangle_mesh(mesh: &TriangleMesh, material: Arc<Material>) -> Self {
        Self::new(Shape::Mesh(Mesh::from_triangle_mesh(mesh)), material)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Surface area, used to weight point sampling.
    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn kind(&self) -> PrimitiveKind {
        match &self.shape {
            Shape::Sphere(_) => PrimitiveKind::Sphere,
            Shape::Planar(p) => match p.kind() {
                PlanarKind::Quad => PrimitiveKind::Quad,
                PlanarKind::Triangle => PrimitiveKind::Triangle,
            },
            Shape::Box(_) => PrimitiveKind::Box,
            Shape::Mesh(_) => PrimitiveKind::Mesh,
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.material.is_emissive()
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match &self.shape {
            Shape::Sphere(s) => Some(s),
            _ => None,
        }
    }

    /// Nearest intersection within `ray_t`.
    ///
    /// Hits on a box face or mesh triangle are reported as hits on this
    /// primitive.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let surface = match &self.shape {
            Shape::Sphere(s) => s.intersect(ray, ray_t),
            Shape::Planar(p) => p.intersect(ray, ray_t),
            Shape::Box(b) => b.intersect(ray, ray_t),
            Shape::Mesh(m) => m.intersect(ray, ray_t),
        }?;
        Some(HitRecord::new(ray, surface, self))
    }

    /// Uniform point on the surface.
    pub fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        match &self.shape {
            Shape::Sphere(s) => s.sample(rng),
            Shape::Planar(p) => p.sample(rng),
            Shape::Box(b) => b.sample(rng),
            Shape::Mesh(m) => m.sample(rng),
        }
    }

    /// Solid-angle density of directions produced by aiming from `origin`
    /// at `sample` points.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        match &self.shape {
            Shape::Sphere(s) => s.pdf_value(origin, direction),
            Shape::Planar(p) => p.pdf_value(origin, direction),
            Shape::Box(b) => b.pdf_value(origin, direction),
            Shape::Mesh(m) => m.pdf_value(origin, direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::random_unit_vector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn white() -> Arc<Material> {
        Arc::new(Material::diffuse(Vec3::ONE))
    }

    #[test]
    fn test_kinds_and_areas() {
        let mat = white();
        let quad = Primitive::quad(Vec3::ZERO, Vec3::X * 2.0, Vec3::Y, mat.clone());
        let tri = Primitive::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, mat.clone());
        let cube = Primitive::cuboid(Vec3::ZERO, Vec3::ONE, mat.clone());

        assert_eq!(quad.kind(), PrimitiveKind::Quad);
        assert_eq!(tri.kind(), PrimitiveKind::Triangle);
        assert_eq!(cube.kind(), PrimitiveKind::Box);
        assert_eq!(quad.area(), 2.0);
        assert_eq!(tri.area(), 0.5);
        assert_eq!(cube.area(), 6.0);
        assert!(quad.as_sphere().is_none());
    }

    #[test]
    fn test_shared_material() {
        let mat = white();
        let a = Primitive::sphere(Vec3::ZERO, 1.0, mat.clone());
        let b = Primitive::sphere(Vec3::X * 3.0, 1.0, mat.clone());

        assert!(std::ptr::eq(a.material(), b.material()));
        assert_eq!(Arc::strong_count(&mat), 3);
    }

    #[test]
    fn test_box_hit_reports_the_box() {
        let cube = Primitive::cuboid(Vec3::splat(-1.0), Vec3::splat(1.0), white());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = cube.hit(&ray, Interval::from_min(0.001)).unwrap();

        assert!(hit.is_on(&cube));
        assert_eq!(hit.object.kind(), PrimitiveKind::Box);
        assert!(hit.front_face);
    }

    #[test]
    fn test_emissive_classification() {
        let lamp = Primitive::sphere(Vec3::ZERO, 1.0, Arc::new(Material::light(Vec3::ONE, 4.0)));
        assert!(lamp.is_emissive());
        assert!(!Primitive::sphere(Vec3::ZERO, 1.0, white()).is_emissive());
    }

    /// The solid-angle density of a quad integrates to 1 over all directions.
    #[test]
    fn test_pdf_integrates_over_directions() {
        let mut rng = StdRng::seed_from_u64(17);
        let quad = Primitive::quad(
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::X * 2.0,
            Vec3::Y * 2.0,
            white(),
        );

        let n = 200_000;
        let sum: f32 = (0..n)
            .map(|_| quad.pdf_value(Vec3::ZERO, random_unit_vector(&mut rng)))
            .sum();
        let integral = sum / n as f32 * 4.0 * std::f32::consts::PI;

        assert!((integral - 1.0).abs() < 0.05, "integral={}", integral);
    }
}
