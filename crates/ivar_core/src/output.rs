//! Image buffer and writers for rendered output.
//!
//! Pixels are stored as linear RGB. Conversion to 8-bit applies gamma 2
//! (square root) and clamps to [0, 1]; non-finite components are replaced
//! with black so a single bad sample never corrupts the written file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ivar_math::Vec3;
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Pixel count {actual} does not match {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

pub type ImageResult<T> = Result<T, ImageError>;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

#[inline]
fn to_byte(component: f32) -> u8 {
    let c = if component.is_finite() { component } else { 0.0 };
    (255.999 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb(color: Vec3) -> [u8; 3] {
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Row-major grid of linear RGB colors, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    /// Wrap already rendered pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Vec3>) -> ImageResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Number of pixels with at least one NaN or infinite component.
    pub fn non_finite_count(&self) -> usize {
        self.pixels.iter().filter(|p| !p.is_finite()).count()
    }

    /// Mean linear color over the whole image.
    pub fn average(&self) -> Vec3 {
        if self.pixels.is_empty() {
            return Vec3::ZERO;
        }
        self.pixels.iter().copied().sum::<Vec3>() / self.pixels.len() as f32
    }

    /// Convert to gamma-corrected RGB bytes, 3 per pixel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgb(*c)).collect()
    }

    fn warn_non_finite(&self) {
        let bad = self.non_finite_count();
        if bad > 0 {
            log::warn!("Replacing {} non-finite pixel(s) with black", bad);
        }
    }

    /// Write as plain-text PPM (`P3`): header, then one "R G B" line per pixel.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> ImageResult<()> {
        self.warn_non_finite();

        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;
        for color in &self.pixels {
            let [r, g, b] = color_to_rgb(*color);
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
        Ok(())
    }

    /// Save to disk, choosing the format from the extension.
    ///
    /// `.ppm` (or no extension) writes plain-text PPM; anything else goes
    /// through the `image` crate (PNG, JPEG, ...).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .map_or(true, |ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut writer = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut writer)?;
            writer.flush()?;
        } else {
            self.warn_non_finite();
            image::save_buffer(
                path,
                &self.to_rgb8(),
                self.width,
                self.height,
                image::ColorType::Rgb8,
            )?;
        }

        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
