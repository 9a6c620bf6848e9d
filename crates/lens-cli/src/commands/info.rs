use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lens_core::rotate::FsImageBackend;
use lens_core::viewport::{Size, TransformEngine};
use lens_core::ResourceKey;

use super::parse_size;
use crate::display::image_size;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Viewport size used for the fit readout
    #[arg(long, value_parser = parse_size, default_value = "1280x800")]
    pub container: Size,

    /// Viewer config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = super::config::load(args.config.as_deref())?;
    let key = ResourceKey::from_path(&args.file)
        .with_context(|| format!("Cannot open {}", args.file.display()))?;
    let size = image_size(&key)?;
    let format = image::ImageFormat::from_path(key.path())
        .map(|f| format!("{f:?}"))
        .unwrap_or_else(|_| "unknown".into());

    let mut engine = TransformEngine::new(config.zoom);
    engine.set_container_size(args.container);
    engine.load_content(size);
    let t = engine.transform();

    println!("File:        {}", key);
    println!("Format:      {}", format);
    println!("Dimensions:  {}x{}", size.width, size.height);
    println!(
        "Viewport:    {}x{}",
        args.container.width, args.container.height
    );
    println!(
        "Fit:         {}% at ({:.1}, {:.1})",
        engine.zoom_percent(),
        t.translate_x,
        t.translate_y
    );
    println!(
        "Zoom range:  {:.0}% - {:.0}%",
        engine.min_effective_scale() * 100.0,
        engine.config().max_scale * 100.0
    );
    if FsImageBackend::new().has_backup(&key) {
        println!("Backup:      present (run `lens recover` to restore)");
    }

    Ok(())
}
