use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use lens_core::rotate::{FsImageBackend, RotateEvent, ShutdownOutcome};
use lens_core::viewport::{InputEvent, Size};
use lens_core::{ResourceKey, Viewer};
use tokio::sync::mpsc::unbounded_channel;

use super::parse_size;
use crate::display::{image_size, HeadlessDisplay};

#[derive(Args)]
pub struct RotateArgs {
    /// Image file to rotate in place
    pub file: PathBuf,

    /// Number of rotate clicks to batch (each adds `degrees_per_click`)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub clicks: u32,

    /// Quiet period before the batch is applied, in milliseconds
    #[arg(long)]
    pub quiescence: Option<u64>,

    /// Viewport size used to report the refitted zoom
    #[arg(long, value_parser = parse_size, default_value = "1280x800")]
    pub container: Size,

    /// Viewer config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &RotateArgs) -> Result<()> {
    let mut config = super::config::load(args.config.as_deref())?;
    if let Some(ms) = args.quiescence {
        config.rotate.quiescence_ms = ms;
    }
    let key = ResourceKey::from_path(&args.file)
        .with_context(|| format!("Cannot open {}", args.file.display()))?;
    let backend = Arc::new(FsImageBackend::new());
    if backend.has_backup(&key) {
        bail!(
            "{} has a leftover backup from an interrupted rotation; run `lens recover` first",
            key
        );
    }
    let size = image_size(&key)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (tx, mut events) = unbounded_channel();

    let started = Instant::now();
    let (event, zoom) = rt.block_on(async {
        let display = Arc::new(HeadlessDisplay::new(key.clone()));
        let mut viewer = Viewer::new(config.clone(), backend, display, Some(tx));
        viewer.handle_input(InputEvent::Resize {
            container: args.container,
        });
        viewer.image_loaded(&key, size);

        for _ in 0..args.clicks {
            viewer.request_rotate();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!(
            "{} click(s) queued, applying after {} ms",
            args.clicks, config.rotate.quiescence_ms
        ));

        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                pb.set_message("Interrupted, waiting for rotation to settle");
                match viewer.close_requested().await {
                    ShutdownOutcome::Idle => None,
                    _ => events.recv().await,
                }
            }
        };
        pb.finish_and_clear();

        let zoom = viewer.zoom_percent();
        viewer.destroy();
        anyhow::Ok((event, zoom))
    })?;

    let Some(event) = event else {
        println!("Interrupted before the rotation started, {} untouched", key);
        return Ok(());
    };
    crate::summary::print_rotate_summary(&event, zoom, started.elapsed());

    match event {
        RotateEvent::Completed { .. } => Ok(()),
        RotateEvent::RolledBack {
            cancelled: true, ..
        } => Ok(()),
        RotateEvent::RolledBack { reason, .. } => bail!("Rotation rolled back: {reason}"),
        RotateEvent::RestoreFailed { key, reason } => {
            bail!("{key} may be inconsistent: {reason}")
        }
    }
}
