//! Parallel render driver.
//!
//! Rows are traced in parallel with rayon. Every pixel owns a random
//! stream seeded from the render seed and its index, so the image is
//! identical for a given seed whatever the thread count.

use crate::config::ConfigResult;
use crate::integrator::PathTracer;
use crate::material::Color;
use crate::sampling::pixel_seed;
use crate::{Camera, Scene};
use ivar_core::ImageBuffer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

/// A validated camera and integrator, ready to render scenes.
#[derive(Debug, Clone)]
pub struct Renderer {
    camera: Camera,
    tracer: PathTracer,
    seed: u64,
}

impl Renderer {
    /// Initialize `camera` and bundle it with the integrator settings.
    pub fn new(mut camera: Camera, tracer: PathTracer, seed: u64) -> ConfigResult<Self> {
        camera.initialize()?;
        Ok(Self {
            camera,
            tracer,
            seed,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tracer(&self) -> &PathTracer {
        &self.tracer
    }

    pub fn width(&self) -> u32 {
        self.camera.image_width
    }

    pub fn height(&self) -> u32 {
        self.camera.image_height()
    }

    /// Average of all samples for pixel (i, j).
    pub fn render_pixel(&self, scene: &Scene, i: u32, j: u32) -> Color {
        let index = j as u64 * self.width() as u64 + i as u64;
        let mut rng = StdRng::seed_from_u64(pixel_seed(self.seed, index));

        let samples = self.camera.samples_per_pixel;
        let mut pixel_color = Color::ZERO;
        for s in 0..samples {
            let ray = self.camera.get_ray(i, j, s, &mut rng);
            pixel_color += self.tracer.trace(scene, ray, &mut rng);
        }
        pixel_color / samples as f32
    }

    /// Render the full image as linear RGB.
    pub fn render(&self, scene: &Scene) -> ImageBuffer {
        let width = self.width();
        let height = self.height();
        log::info!(
            "Rendering {}x{} at {} spp, max depth {}, {} primitives, {} lights",
            width,
            height,
            self.camera.samples_per_pixel,
            self.tracer.max_depth,
            scene.primitives().len(),
            scene.lights().len()
        );
        let start = Instant::now();

        let mut image = ImageBuffer::new(width, height);
        image
            .pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(j, row)| {
                for (i, pixel) in row.iter_mut().enumerate() {
                    *pixel = self.render_pixel(scene, i as u32, j as u32);
                }
            });

        log::info!("Render complete in {:.2?}", start.elapsed());
        image
    }
}
