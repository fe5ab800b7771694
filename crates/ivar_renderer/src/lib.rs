//! Ivar - CPU Monte Carlo path tracer.
//!
//! Scenes are built from a closed set of primitives (sphere, quad,
//! triangle, box, mesh) carrying shared materials. Emissive primitives are
//! tracked separately so the integrator can sample them directly.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ivar_renderer::{Material, Primitive, RenderSettings, Scene, Vec3};
//!
//! let mut scene = Scene::with_ambient(Vec3::new(0.7, 0.8, 1.0));
//! let ground = Arc::new(Material::diffuse(Vec3::new(0.8, 0.8, 0.0)));
//! scene.add(Primitive::sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, ground));
//!
//! let image = RenderSettings::default().renderer()?.render(&scene);
//! image.save("out.ppm")?;
//! ```

mod camera;
mod config;
mod cuboid;
mod hittable;
mod integrator;
mod material;
mod mesh;
mod pdf;
mod phong;
mod planar;
mod primitive;
mod ray;
mod renderer;
mod sampling;
mod scene;
mod sphere;

pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, RenderSettings};
pub use cuboid::Cuboid;
pub use hittable::{HitRecord, SurfaceHit};
pub use integrator::{LightSampling, PathTracer};
pub use material::{reflectance, Color, EvalRecord, Material, Scatter, MAX_MIRROR_DEPTH};
pub use mesh::Mesh;
pub use pdf::{Pdf, MIXTURE_WEIGHT};
pub use phong::Phong;
pub use planar::{Planar, PlanarKind};
pub use primitive::{Primitive, PrimitiveKind, Shape, SurfaceSample};
pub use ray::Ray;
pub use renderer::Renderer;
pub use sampling::pixel_seed;
pub use scene::Scene;
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from ivar_math
pub use ivar_math::{Aabb, Interval, Vec3};

/// Minimum hit distance for secondary rays, avoiding self-intersection.
pub const HIT_EPSILON: f32 = 1e-4;
