//! Camera for ray generation.

use crate::config::{ConfigError, ConfigResult};
use crate::sampling::{gen_f32, random_in_unit_disk, sample_square};
use crate::Ray;
use ivar_math::Vec3;
use rand::RngCore;

/// Pinhole or thin-lens camera that turns pixel coordinates into rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub aspect_ratio: f32,
    pub samples_per_pixel: u32,
    /// Jitter samples inside a sqrt(spp) x sqrt(spp) grid of sub-cells
    pub stratified: bool,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    image_height: u32,
    sqrt_spp: u32,
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 10,
            stratified: false,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            // Cached values (initialized to defaults)
            image_height: 225,
            sqrt_spp: 1,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        }
    }

    /// Set image width and aspect ratio (width / height).
    pub fn with_resolution(mut self, width: u32, aspect_ratio: f32) -> Self {
        self.image_width = width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_samples(mut self, samples: u32, stratified: bool) -> Self {
        self.samples_per_pixel = samples;
        self.stratified = stratified;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.image_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(ConfigError::AspectRatio(self.aspect_ratio));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::FieldOfView(self.vfov));
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(ConfigError::FocusDistance(self.focus_dist));
        }
        if !(self.defocus_angle >= 0.0 && self.defocus_angle < 180.0) {
            return Err(ConfigError::DefocusAngle(self.defocus_angle));
        }

        let view = self.look_at - self.look_from;
        if view.length_squared() == 0.0 {
            return Err(ConfigError::DegenerateView);
        }
        if self.vup.cross(view).length_squared() <= f32::EPSILON * view.length_squared() {
            return Err(ConfigError::UpParallelToView);
        }
        Ok(())
    }

    /// Validate and precompute the viewport (must be called before
    /// generating rays).
    pub fn initialize(&mut self) -> ConfigResult<()> {
        self.validate()?;

        self.image_height = ((self.image_width as f32 / self.aspect_ratio) as u32).max(1);
        self.center = self.look_from;

        if self.stratified {
            self.sqrt_spp = ((self.samples_per_pixel as f32).sqrt().round() as u32).max(1);
            let rounded = self.sqrt_spp * self.sqrt_spp;
            if rounded != self.samples_per_pixel {
                log::warn!(
                    "Stratified sampling: {} samples per pixel rounded to {}",
                    self.samples_per_pixel,
                    rounded
                );
                self.samples_per_pixel = rounded;
            }
        } else {
            self.sqrt_spp = 1;
        }

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;

        Ok(())
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Generate ray number `sample` for pixel (i, j).
    ///
    /// With stratification, sample `s` lands in sub-cell `s` of the pixel's
    /// grid, jittered within it.
    pub fn get_ray(&self, i: u32, j: u32, sample: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.stratified && self.sqrt_spp > 1 {
            let cell = sample % (self.sqrt_spp * self.sqrt_spp);
            let inv = 1.0 / self.sqrt_spp as f32;
            let sx = (cell % self.sqrt_spp) as f32;
            let sy = (cell / self.sqrt_spp) as f32;
            Vec3::new(
                (sx + gen_f32(rng)) * inv - 0.5,
                (sy + gen_f32(rng)) * inv - 0.5,
                0.0,
            )
        } else {
            sample_square(rng)
        };

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
