use clap::{Parser, ValueEnum};
use ivar_renderer::RenderSettings;
use log::LevelFilter;
use std::path::PathBuf;

/// Built-in demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneName {
    /// Diffuse ball on a ground sphere under ambient sky light
    Spheres,
    /// Diffuse wall lit by a single quad light
    QuadLight,
    /// Closed box with a ceiling light and two blocks
    Cornell,
    /// Phong and Phong-mirror spheres under point and area lights
    Phong,
    /// Triangle mesh from an OBJ file (requires --mesh)
    Mesh,
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ivar")]
#[command(about = "Monte Carlo path tracer")]
pub struct Args {
    /// Render settings file (JSON); flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scene to render
    #[arg(long, value_enum, default_value = "spheres")]
    pub scene: SceneName,

    /// OBJ file for the mesh scene
    #[arg(long)]
    pub mesh: Option<PathBuf>,

    /// Output file (.ppm or .png)
    #[arg(short, long, default_value = "output.ppm")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Number of samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Maximum bounce depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable Russian-roulette path termination
    #[arg(long)]
    pub no_roulette: bool,

    /// Write the effective settings as JSON and exit
    #[arg(long)]
    pub dump_settings: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Level forced by `-v` flags; `None` leaves `RUST_LOG` in charge.
    pub fn log_level(&self) -> Option<LevelFilter> {
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }

    /// Apply flag overrides on top of `settings`.
    pub fn apply(&self, settings: &mut RenderSettings) {
        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(depth) = self.depth {
            settings.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if self.no_roulette {
            settings.russian_roulette = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["ivar", "--width", "64", "-s", "4", "--no-roulette", "--scene", "cornell"]);
        let mut settings = RenderSettings::default();
        args.apply(&mut settings);

        assert_eq!(args.scene, SceneName::Cornell);
        assert_eq!(settings.image_width, 64);
        assert_eq!(settings.samples_per_pixel, 4);
        assert!(!settings.russian_roulette);
        assert_eq!(settings.max_depth, RenderSettings::default().max_depth);
    }

    #[test]
    fn test_verbosity() {
        // Without -v the RUST_LOG environment decides
        assert_eq!(Args::parse_from(["ivar"]).log_level(), None);
        assert_eq!(Args::parse_from(["ivar", "-v"]).log_level(), Some(LevelFilter::Debug));
        assert_eq!(Args::parse_from(["ivar", "-vv"]).log_level(), Some(LevelFilter::Trace));
    }
}
