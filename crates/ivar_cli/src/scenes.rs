//! Built-in demo scenes.

use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use ivar_core::TriangleMesh;
use ivar_renderer::{Aabb, Material, Primitive, RenderSettings, Scene, Vec3};

use crate::cli::SceneName;

/// Camera placement that frames a demo scene.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vfov: f32,
}

impl View {
    pub fn apply(&self, settings: &mut RenderSettings) {
        settings.look_from = self.look_from.to_array();
        settings.look_at = self.look_at.to_array();
        settings.vup = [0.0, 1.0, 0.0];
        settings.vfov = self.vfov;
    }
}

pub fn build(name: SceneName, mesh: Option<&Path>) -> Result<(Scene, View)> {
    match name {
        SceneName::Spheres => Ok(spheres()),
        SceneName::QuadLight => Ok(quad_light()),
        SceneName::Cornell => Ok(cornell()),
        SceneName::Phong => Ok(phong()),
        SceneName::Mesh => {
            let path = mesh.context("the mesh scene needs --mesh <file.obj>")?;
            mesh_scene(path)
        }
    }
}

fn spheres() -> (Scene, View) {
    let mut scene = Scene::with_ambient(Vec3::new(0.7, 0.8, 1.0));
    scene.add(Primitive::sphere(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Arc::new(Material::diffuse(Vec3::new(0.1, 0.2, 0.5))),
    ));
    scene.add(Primitive::sphere(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Arc::new(Material::diffuse(Vec3::new(0.8, 0.8, 0.0))),
    ));

    let view = View {
        look_from: Vec3::ZERO,
        look_at: Vec3::new(0.0, 0.0, -1.0),
        vfov: 90.0,
    };
    (scene, view)
}

fn quad_light() -> (Scene, View) {
    let mut scene = Scene::with_ambient(Vec3::splat(0.05));
    scene.add(Primitive::quad(
        Vec3::new(-3.0, -3.0, -4.0),
        Vec3::X * 6.0,
        Vec3::Y * 6.0,
        Arc::new(Material::diffuse(Vec3::splat(0.8))),
    ));
    // Edges ordered so the light faces the wall
    scene.add(Primitive::quad(
        Vec3::new(-0.5, -0.5, -2.0),
        Vec3::Y,
        Vec3::X,
        Arc::new(Material::light(Vec3::ONE, 8.0)),
    ));

    let view = View {
        look_from: Vec3::new(0.0, 0.0, 2.0),
        look_at: Vec3::new(0.0, 0.0, -4.0),
        vfov: 70.0,
    };
    (scene, view)
}

fn cornell() -> (Scene, View) {
    let mut scene = Scene::new();
    let red = Arc::new(Material::diffuse(Vec3::new(0.65, 0.05, 0.05)));
    let white = Arc::new(Material::diffuse(Vec3::splat(0.73)));
    let green = Arc::new(Material::diffuse(Vec3::new(0.12, 0.45, 0.15)));
    let light = Arc::new(Material::light(Vec3::ONE, 15.0));

    let s = 555.0;
    scene.add(Primitive::quad(Vec3::new(s, 0.0, 0.0), Vec3::Z * s, Vec3::Y * s, green));
    scene.add(Primitive::quad(Vec3::ZERO, Vec3::Y * s, Vec3::Z * s, red));
    scene.add(Primitive::quad(Vec3::ZERO, Vec3::Z * s, Vec3::X * s, white.clone()));
    scene.add(Primitive::quad(Vec3::new(0.0, s, 0.0), Vec3::X * s, Vec3::Z * s, white.clone()));
    scene.add(Primitive::quad(Vec3::new(0.0, 0.0, s), Vec3::X * s, Vec3::Y * s, white.clone()));
    scene.add(Primitive::quad(
        Vec3::new(213.0, s - 1.0, 227.0),
        Vec3::X * 130.0,
        Vec3::Z * 105.0,
        light,
    ));

    scene.add(Primitive::cuboid(
        Vec3::new(130.0, 0.0, 65.0),
        Vec3::new(295.0, 165.0, 230.0),
        white.clone(),
    ));
    scene.add(Primitive::cuboid(
        Vec3::new(265.0, 0.0, 295.0),
        Vec3::new(430.0, 330.0, 460.0),
        Arc::new(Material::metal(Vec3::new(0.8, 0.85, 0.88), 0.05)),
    ));
    scene.add(Primitive::sphere(
        Vec3::new(190.0, 245.0, 150.0),
        80.0,
        Arc::new(Material::dielectric(1.5)),
    ));

    let view = View {
        look_from: Vec3::new(278.0, 278.0, -800.0),
        look_at: Vec3::new(278.0, 278.0, 0.0),
        vfov: 40.0,
    };
    (scene, view)
}

fn phong() -> (Scene, View) {
    let mut scene = Scene::with_ambient(Vec3::splat(0.1));
    scene.background = Vec3::new(0.2, 0.3, 0.5);

    scene.add(Primitive::quad(
        Vec3::new(-10.0, -1.0, 10.0),
        Vec3::X * 20.0,
        Vec3::NEG_Z * 20.0,
        Arc::new(Material::phong(Vec3::splat(0.8), 4.0)),
    ));
    scene.add(Primitive::sphere(
        Vec3::new(-1.1, 0.0, -3.0),
        1.0,
        Arc::new(Material::phong(Vec3::new(0.9, 0.2, 0.2), 32.0)),
    ));
    scene.add(Primitive::sphere(
        Vec3::new(1.1, 0.0, -3.0),
        1.0,
        Arc::new(Material::phong_mirror(Vec3::new(0.2, 0.2, 0.9), 64.0, 1.5)),
    ));

    // One point light and one area light
    scene.add(Primitive::sphere(
        Vec3::new(-3.0, 4.0, 0.0),
        0.25,
        Arc::new(Material::light(Vec3::ONE, 0.8)),
    ));
    scene.add(Primitive::quad(
        Vec3::new(1.0, 5.0, -4.0),
        Vec3::X * 2.0,
        Vec3::Z * 2.0,
        Arc::new(Material::light(Vec3::new(1.0, 0.9, 0.8), 0.6)),
    ));

    let view = View {
        look_from: Vec3::new(0.0, 1.0, 3.0),
        look_at: Vec3::new(0.0, 0.0, -3.0),
        vfov: 50.0,
    };
    (scene, view)
}

fn mesh_scene(path: &Path) -> Result<(Scene, View)> {
    let mesh = TriangleMesh::load_obj(path)
        .with_context(|| format!("Failed to load mesh {}", path.display()))?;
    let bounds = face_bounds(&mesh)
        .with_context(|| format!("Mesh {} has no triangles", path.display()))?;

    let center = bounds.centroid();
    let radius = (bounds.diagonal() * 0.5).max(1e-3);
    let floor_y = bounds.min().y;

    let mut scene = Scene::with_ambient(Vec3::splat(0.2));
    scene.add(Primitive::from_triangle_mesh(
        &mesh,
        Arc::new(Material::diffuse(Vec3::new(0.7, 0.6, 0.5))),
    ));
    scene.add(Primitive::quad(
        Vec3::new(center.x - 20.0 * radius, floor_y, center.z + 20.0 * radius),
        Vec3::X * 40.0 * radius,
        Vec3::NEG_Z * 40.0 * radius,
        Arc::new(Material::diffuse(Vec3::splat(0.5))),
    ));
    scene.add(Primitive::sphere(
        center + Vec3::new(-2.0, 4.0, 3.0) * radius,
        0.5 * radius,
        Arc::new(Material::light(Vec3::ONE, 10.0)),
    ));

    let view = View {
        look_from: center + Vec3::new(0.0, 0.5, 3.0) * radius,
        look_at: center,
        vfov: 40.0,
    };
    Ok((scene, view))
}

/// Bounds of the vertices that belong to a face; loose vertices are ignored.
fn face_bounds(mesh: &TriangleMesh) -> Result<Aabb> {
    ensure!(!mesh.is_empty(), "no faces");
    Aabb::enclosing(mesh.triangles().into_iter().flatten()).context("no vertices")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenes() {
        for name in [SceneName::Spheres, SceneName::QuadLight, SceneName::Cornell, SceneName::Phong] {
            let (scene, view) = build(name, None).unwrap();
            assert!(!scene.is_empty());

            let mut settings = RenderSettings::default();
            view.apply(&mut settings);
            assert!(settings.camera().is_ok(), "bad view for {:?}", name);
        }
    }

    #[test]
    fn test_cornell_lights() {
        let (scene, _) = build(SceneName::Cornell, None).unwrap();
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.primitives().len(), 8);
    }

    #[test]
    fn test_mesh_scene_needs_path() {
        assert!(build(SceneName::Mesh, None).is_err());
        assert!(build(SceneName::Mesh, Some(Path::new("/nonexistent/model.obj"))).is_err());
    }

    #[test]
    fn test_faceless_mesh_is_rejected() {
        let loose = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Vec::new()).unwrap();
        assert!(face_bounds(&loose).is_err());

        let empty = TriangleMesh::new(Vec::new(), Vec::new()).unwrap();
        assert!(face_bounds(&empty).is_err());
    }

    #[test]
    fn test_face_bounds_frame_the_mesh() {
        let positions = vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::splat(50.0)];
        let mesh = TriangleMesh::new(positions, vec![0, 1, 2]).unwrap();
        let bounds = face_bounds(&mesh).unwrap();

        // The unused vertex at (50, 50, 50) does not stretch the frame
        assert!(bounds.max().x <= 2.001);
        assert!(bounds.centroid().is_finite());
    }
}
