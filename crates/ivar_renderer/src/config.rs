//! Render settings and configuration errors.

use std::path::Path;

use crate::integrator::{LightSampling, PathTracer};
use crate::{Camera, Renderer};
use ivar_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors detected before rendering starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Image width must be at least 1")]
    ZeroWidth,

    #[error("Aspect ratio must be positive and finite, got {0}")]
    AspectRatio(f32),

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Focus distance must be positive, got {0}")]
    FocusDistance(f32),

    #[error("Defocus angle must be in [0, 180) degrees, got {0}")]
    DefocusAngle(f32),

    #[error("Camera look-from and look-at points coincide")]
    DegenerateView,

    #[error("Camera up vector is parallel to the view direction")]
    UpParallelToView,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything needed to set up a render, loadable from JSON.
///
/// Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub image_width: u32,
    /// Width over height
    pub aspect_ratio: f32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Vertical field of view in degrees
    pub vfov: f32,
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],
    pub defocus_angle: f32,
    pub focus_dist: f32,
    pub stratified: bool,
    pub russian_roulette: bool,
    pub min_depth: u32,
    pub light_sampling: LightSampling,
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            vfov: 90.0,
            look_from: [0.0, 0.0, 0.0],
            look_at: [0.0, 0.0, -1.0],
            vup: [0.0, 1.0, 0.0],
            defocus_angle: 0.0,
            focus_dist: 10.0,
            stratified: false,
            russian_roulette: true,
            min_depth: 3,
            light_sampling: LightSampling::NextEvent,
            seed: 0,
        }
    }
}

impl RenderSettings {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded render settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// An initialized camera for these settings.
    pub fn camera(&self) -> ConfigResult<Camera> {
        let mut camera = Camera::new()
            .with_resolution(self.image_width, self.aspect_ratio)
            .with_samples(self.samples_per_pixel, self.stratified)
            .with_position(
                Vec3::from_array(self.look_from),
                Vec3::from_array(self.look_at),
                Vec3::from_array(self.vup),
            )
            .with_lens(self.vfov, self.defocus_angle, self.focus_dist);
        camera.initialize()?;
        Ok(camera)
    }

    pub fn tracer(&self) -> PathTracer {
        PathTracer::new(self.max_depth)
            .with_roulette(self.russian_roulette, self.min_depth)
            .with_light_sampling(self.light_sampling)
    }

    pub fn renderer(&self) -> ConfigResult<Renderer> {
        Renderer::new(self.camera()?, self.tracer(), self.seed)
    }
}
