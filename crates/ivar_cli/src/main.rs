use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use ivar_renderer::RenderSettings;

mod cli;
mod scenes;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = args.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    // Scene views only apply when no settings file places the camera
    let (scene, view) = scenes::build(args.scene, args.mesh.as_deref())?;
    let mut settings = match &args.config {
        Some(path) => RenderSettings::from_json_file(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?,
        None => {
            let mut settings = RenderSettings::default();
            view.apply(&mut settings);
            settings
        }
    };
    args.apply(&mut settings);

    if args.dump_settings {
        println!("{}", settings.to_json()?);
        return Ok(());
    }

    log::info!("Starting Ivar: scene {:?}", args.scene);
    let renderer = settings.renderer().context("Invalid render settings")?;

    let image = renderer.render(&scene);
    log::debug!("Average color {:?}", image.average());

    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
