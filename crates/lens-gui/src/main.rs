mod app;
mod convert;
mod display;
mod messages;
mod panels;
mod states;

use std::path::PathBuf;

use anyhow::{Context, Result};
use lens_core::config::ViewerConfig;

/// Config file named by `LENS_CONFIG`, or defaults when unset.
fn load_config() -> Result<ViewerConfig> {
    let Some(path) = std::env::var_os("LENS_CONFIG") else {
        return Ok(ViewerConfig::default());
    };
    let path = PathBuf::from(path);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid viewer config")
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Rotation batches and pipelines run here; entering the runtime lets the
    // UI thread spawn onto it.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;
    let _guard = runtime.enter();

    let config = load_config().unwrap_or_else(|e| {
        tracing::warn!("{e:#}, using defaults");
        ViewerConfig::default()
    });
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Lens"),
        ..Default::default()
    };

    eframe::run_native(
        "Lens",
        options,
        Box::new(move |cc| Ok(Box::new(app::LensApp::new(&cc.egui_ctx, config, initial)))),
    )
}
