//! Scene aggregate with power-weighted light selection.

use crate::hittable::{closer, HitRecord};
use crate::material::Color;
use crate::sampling::{build_cdf, cdf_probability, gen_f32, sample_cdf};
use crate::{Primitive, Ray, HIT_EPSILON};
use ivar_math::{Interval, Vec3};
use rand::RngCore;

/// Relative slack allowed between a shadow ray's hit and its target distance.
const SHADOW_TOLERANCE: f32 = 1e-3;

/// All primitives of a render, split into ordinary geometry and emitters.
///
/// Content may only change before a render starts.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<Primitive>,
    /// Light selection CDF weighted by emission intensity
    light_cdf: Vec<f32>,
    /// Sum of emission intensities over all lights
    total_power: f32,
    /// Radiance added when a path escapes the scene; Phong ambient term
    pub ambient_light: Color,
    /// Colour seen by mirror reflections that escape the scene
    pub background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(ambient_light: Color) -> Self {
        Self {
            ambient_light,
            ..Self::default()
        }
    }

    /// Add a primitive. Emissive primitives go to the light list.
    pub fn add(&mut self, primitive: Primitive) {
        if primitive.is_emissive() {
            self.lights.push(primitive);
            self.rebuild_light_cdf();
        } else {
            self.primitives.push(primitive);
        }
    }

    fn rebuild_light_cdf(&mut self) {
        let intensities: Vec<f32> = self
            .lights
            .iter()
            .map(|light| light.material().emission_intensity())
            .collect();
        let (cdf, total) = build_cdf(&intensities);
        self.light_cdf = cdf;
        self.total_power = total;

        log::debug!(
            "Light CDF rebuilt: {} lights, total power {}",
            self.lights.len(),
            self.total_power
        );
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[Primitive] {
        &self.lights
    }

    pub fn light_cdf(&self) -> &[f32] {
        &self.light_cdf
    }

    pub fn total_power(&self) -> f32 {
        self.total_power
    }

    pub fn len(&self) -> usize {
        self.primitives.len() + self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest hit over `(HIT_EPSILON, inf)`.
    pub fn hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        self.hit_within(ray, Interval::from_min(HIT_EPSILON))
    }

    /// Nearest hit among primitives and lights within `ray_t`.
    pub fn hit_within(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        closer(
            nearest(&self.primitives, ray, ray_t),
            nearest(&self.lights, ray, ray_t),
        )
    }

    /// Pick a light with probability proportional to its intensity.
    ///
    /// Returns the light and the probability of having picked it, or `None`
    /// when the scene has no lights.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<(&Primitive, f32)> {
        if self.lights.is_empty() {
            return None;
        }
        let i = sample_cdf(&self.light_cdf, gen_f32(rng));
        Some((&self.lights[i], cdf_probability(&self.light_cdf, i)))
    }

    /// Whether a shadow ray from `origin` along unit `direction` first meets
    /// `light`, and no nearer than `distance`.
    ///
    /// The distance check matters for boxes and meshes, where one part of a
    /// light can hide another part of the same light.
    pub fn light_visible(&self, origin: Vec3, direction: Vec3, light: &Primitive, distance: f32) -> bool {
        let shadow_ray = Ray::new(origin, direction);
        self.hit(&shadow_ray).is_some_and(|shadow_hit| {
            shadow_hit.is_on(light) && shadow_hit.t >= distance * (1.0 - SHADOW_TOLERANCE)
        })
    }

    /// One-sample estimate of direct lighting arriving at `hit`.
    ///
    /// Samples a light and a point on it, then casts a shadow ray. The
    /// estimate is zero unless the shadow ray's nearest hit is the sampled
    /// point itself, the point faces the surface and the surface faces the
    /// point.
    pub fn light_radiance(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Color {
        let Some((light, probability)) = self.sample_light(rng) else {
            return Color::ZERO;
        };
        let area = light.area();
        if probability <= 0.0 || area <= 0.0 {
            return Color::ZERO;
        }

        let sample = light.sample(rng);
        let to_light = sample.p - hit.p;
        let dist_sq = to_light.length_squared();
        if dist_sq <= HIT_EPSILON * HIT_EPSILON {
            return Color::ZERO;
        }
        let dist = dist_sq.sqrt();
        let direction = to_light / dist;

        let cos_surface = hit.normal.dot(direction);
        let cos_light = -sample.normal.dot(direction);
        if cos_surface <= 0.0 || cos_light <= 0.0 {
            return Color::ZERO;
        }

        if !self.light_visible(hit.p, direction, light, dist) {
            return Color::ZERO;
        }

        // Area density of the point converted to solid angle
        let pdf = probability / area;
        light.material().radiance() * cos_surface * cos_light / (dist_sq * pdf)
    }
}

/// Nearest hit in `objects`, narrowing the interval as hits are found.
fn nearest<'a>(objects: &'a [Primitive], ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
    let mut closest: Option<HitRecord<'a>> = None;
    for object in objects {
        let interval = closest.map_or(ray_t, |hit| ray_t.with_max(hit.t));
        if let Some(hit) = object.hit(ray, interval) {
            closest = Some(hit);
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::random_unit_vector;
    use crate::Material;
    use ivar_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn lamp(intensity: f32) -> Arc<Material> {
        Arc::new(Material::light(Vec3::ONE, intensity))
    }

    fn white() -> Arc<Material> {
        Arc::new(Material::diffuse(Vec3::ONE))
    }

    #[test]
    fn test_add_classifies_by_emission() {
        let mut scene = Scene::new();
        scene.add(Primitive::sphere(Vec3::ZERO, 1.0, white()));
        scene.add(Primitive::sphere(Vec3::Y * 3.0, 0.5, lamp(2.0)));

        assert_eq!(scene.primitives().len(), 1);
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.total_power(), 2.0);
    }

    #[test]
    fn test_light_cdf_invariants() {
        let mut scene = Scene::new();
        for intensity in [1.0, 4.0, 0.0, 5.0] {
            scene.add(Primitive::sphere(Vec3::ZERO, 1.0, lamp(intensity)));
        }

        let cdf = scene.light_cdf();
        assert_eq!(cdf.len(), 4);
        assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*cdf.last().unwrap(), 1.0);
        assert_eq!(scene.total_power(), 10.0);
        assert!((cdf[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_negative_intensity_is_never_selected() {
        let mut scene = Scene::new();
        scene.add(Primitive::sphere(Vec3::ZERO, 1.0, lamp(2.0)));
        scene.add(Primitive::sphere(Vec3::X * 4.0, 1.0, lamp(-1.0)));

        let cdf = scene.light_cdf();
        assert!(cdf.windows(2).all(|w| w[0] <= w[1]), "cdf={:?}", cdf);
        assert_eq!(*cdf.last().unwrap(), 1.0);
        assert_eq!(scene.total_power(), 2.0);
        assert_eq!(cdf_probability(cdf, 1), 0.0);

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let (light, p) = scene.sample_light(&mut rng).unwrap();
            assert_eq!(light.material().emission_intensity(), 2.0);
            assert_eq!(p, 1.0);
        }
    }

    #[test]
    fn test_sample_light_by_power() {
        let mut scene = Scene::new();
        scene.add(Primitive::sphere(Vec3::ZERO, 1.0, lamp(1.0)));
        scene.add(Primitive::sphere(Vec3::X * 5.0, 1.0, lamp(3.0)));

        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let mut bright = 0;
        for _ in 0..n {
            let (light, p) = scene.sample_light(&mut rng).unwrap();
            if light.material().emission_intensity() == 3.0 {
                bright += 1;
                assert!((p - 0.75).abs() < 1e-6);
            } else {
                assert!((p - 0.25).abs() < 1e-6);
            }
        }
        let fraction = bright as f32 / n as f32;
        assert!((fraction - 0.75).abs() < 0.015, "fraction={}", fraction);
    }

    #[test]
    fn test_zero_power_is_uniform() {
        let mut scene = Scene::new();
        scene.add(Primitive::sphere(Vec3::ZERO, 1.0, lamp(0.0)));
        scene.add(Primitive::sphere(Vec3::X, 1.0, lamp(0.0)));

        assert_eq!(scene.light_cdf(), &[0.5, 1.0]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(scene.sample_light(&mut rng).is_some());
    }

    #[test]
    fn test_no_lights() {
        let mut scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(scene.sample_light(&mut rng).is_none());

        scene.add(Primitive::sphere(Vec3::ZERO, 1.0, white()));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let hit = scene.hit(&ray).unwrap();
        assert_eq!(scene.light_radiance(&hit, &mut rng), Vec3::ZERO);
    }

    #[test]
    fn test_scene_hit_is_closest() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut scene = Scene::new();
        for i in 0..12 {
            let center = random_unit_vector(&mut rng) * 4.0;
            let material = if i % 3 == 0 { lamp(1.0) } else { white() };
            scene.add(Primitive::sphere(center, 0.8, material));
        }
        scene.add(Primitive::cuboid(Vec3::splat(-0.5), Vec3::splat(0.5), white()));

        let ray_t = Interval::from_min(HIT_EPSILON);
        for _ in 0..500 {
            let ray = Ray::new(random_unit_vector(&mut rng) * 10.0, random_unit_vector(&mut rng));
            let best = scene.hit(&ray);
            for object in scene.primitives().iter().chain(scene.lights()) {
                if let Some(hit) = object.hit(&ray, ray_t) {
                    let best = best.expect("scene missed a primitive hit");
                    assert!(best.t <= hit.t);
                }
            }
        }
    }

    /// Wall at z = 0 facing +Z, with a 1x1 light 2 units in front of it.
    fn wall_and_light(light_faces_wall: bool) -> Scene {
        let mut scene = Scene::new();
        scene.add(Primitive::quad(
            Vec3::new(-5.0, -5.0, 0.0),
            Vec3::X * 10.0,
            Vec3::Y * 10.0,
            white(),
        ));
        let (u, v) = if light_faces_wall {
            (Vec3::Y, Vec3::X)
        } else {
            (Vec3::X, Vec3::Y)
        };
        scene.add(Primitive::quad(Vec3::new(-0.5, -0.5, 2.0), u, v, lamp(4.0)));
        scene
    }

    fn wall_hit(scene: &Scene) -> HitRecord<'_> {
        let ray = Ray::new(Vec3::new(0.7, 0.0, 1.0), Vec3::NEG_Z);
        let hit = scene.hit(&ray).unwrap();
        assert!(!hit.object.is_emissive());
        hit
    }

    #[test]
    fn test_light_facing_wall() {
        let scene = wall_and_light(true);
        let hit = wall_hit(&scene);
        let mut rng = StdRng::seed_from_u64(5);

        let n = 2000;
        let mut sum = Vec3::ZERO;
        for _ in 0..n {
            let value = scene.light_radiance(&hit, &mut rng);
            assert!(value.x > 0.0);
            sum += value;
        }

        // Roughly L * A * cos^2 / d^2 for a small light
        let mean = sum.x / n as f32;
        let d_sq = 0.7f32 * 0.7 + 4.0;
        let cos = 2.0 / d_sq.sqrt();
        let approx = 4.0 * cos * cos / d_sq;
        assert!((mean - approx).abs() < 0.1 * approx, "mean={} approx={}", mean, approx);
    }

    #[test]
    fn test_light_turned_away() {
        let scene = wall_and_light(false);
        let hit = wall_hit(&scene);
        let mut rng = StdRng::seed_from_u64(6);

        for _ in 0..500 {
            assert_eq!(scene.light_radiance(&hit, &mut rng), Vec3::ZERO);
        }
    }

    /// Two parallel square panels facing -Z, the larger one in front.
    fn stacked_panels(with_hidden: bool) -> Vec<[Vec3; 3]> {
        let panel = |half: f32, z: f32| {
            let a = Vec3::new(-half, -half, z);
            let b = Vec3::new(-half, half, z);
            let c = Vec3::new(half, half, z);
            let d = Vec3::new(half, -half, z);
            [[a, b, c], [a, c, d]]
        };
        let mut triangles = panel(1.0, 2.0).to_vec();
        if with_hidden {
            triangles.extend(panel(0.8, 2.2));
        }
        triangles
    }

    fn mean_mesh_light(with_hidden: bool, seed: u64) -> f32 {
        let mut scene = Scene::new();
        scene.add(Primitive::quad(
            Vec3::new(-5.0, -5.0, 0.0),
            Vec3::X * 10.0,
            Vec3::Y * 10.0,
            white(),
        ));
        scene.add(Primitive::mesh(&stacked_panels(with_hidden), lamp(1.0)));

        let ray = Ray::new(Vec3::new(0.3, 0.0, 1.0), Vec3::NEG_Z);
        let hit = scene.hit(&ray).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let n = 8000;
        (0..n).map(|_| scene.light_radiance(&hit, &mut rng).x).sum::<f32>() / n as f32
    }

    #[test]
    fn test_light_hidden_by_itself_adds_nothing() {
        // The back panel is entirely behind the front one as seen from the
        // wall, so it cannot change the direct lighting
        let front_only = mean_mesh_light(false, 21);
        let stacked = mean_mesh_light(true, 22);
        assert!(front_only > 0.0);
        assert!(
            (stacked - front_only).abs() < 0.05 * front_only,
            "front_only={} stacked={}",
            front_only,
            stacked
        );
    }

    #[test]
    fn test_light_visible_checks_distance() {
        let mut scene = Scene::new();
        scene.add(Primitive::mesh(&stacked_panels(true), lamp(1.0)));
        let light = &scene.lights()[0];

        let origin = Vec3::new(0.3, 0.1, 0.0);
        assert!(scene.light_visible(origin, Vec3::Z, light, 2.0));
        assert!(!scene.light_visible(origin, Vec3::Z, light, 2.2));
        assert!(!scene.light_visible(origin, Vec3::NEG_Z, light, 2.0));
    }

    #[test]
    fn test_light_occluded() {
        let mut scene = wall_and_light(true);
        scene.add(Primitive::quad(
            Vec3::new(-3.0, -3.0, 1.0),
            Vec3::X * 6.0,
            Vec3::Y * 6.0,
            white(),
        ));
        let ray = Ray::new(Vec3::new(0.7, 0.0, 0.5), Vec3::NEG_Z);
        let hit = scene.hit(&ray).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            assert_eq!(scene.light_radiance(&hit, &mut rng), Vec3::ZERO);
        }
    }
}
