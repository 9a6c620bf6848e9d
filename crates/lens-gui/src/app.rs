use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use lens_core::config::ViewerConfig;
use lens_core::rotate::{FsImageBackend, RotateEvent};
use lens_core::{ResourceKey, Viewer};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{info, warn};

use crate::display::GuiDisplay;
use crate::messages::{DisplayUpdate, LoadOrigin, UiCommand};
use crate::panels;
use crate::states::{UIState, ViewportState};

pub struct LensApp {
    pub viewer: Viewer<FsImageBackend, GuiDisplay>,
    pub display: Arc<GuiDisplay>,
    pub cmd_tx: mpsc::Sender<UiCommand>,
    cmd_rx: mpsc::Receiver<UiCommand>,
    display_rx: mpsc::Receiver<DisplayUpdate>,
    rotate_rx: UnboundedReceiver<RotateEvent>,
    pub ui_state: UIState,
    pub viewport: ViewportState,
    closing: bool,
    close_confirmed: Arc<AtomicBool>,
}

impl LensApp {
    pub fn new(ctx: &egui::Context, config: ViewerConfig, initial: Option<PathBuf>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (display_tx, display_rx) = mpsc::channel();
        let (rotate_tx, rotate_rx) = unbounded_channel();

        let display = GuiDisplay::new(display_tx, ctx.clone());
        let viewer = Viewer::new(
            config,
            Arc::new(FsImageBackend::new()),
            Arc::clone(&display),
            Some(rotate_tx),
        );

        let mut app = Self {
            viewer,
            display,
            cmd_tx,
            cmd_rx,
            display_rx,
            rotate_rx,
            ui_state: UIState::default(),
            viewport: ViewportState::default(),
            closing: false,
            close_confirmed: Arc::new(AtomicBool::new(false)),
        };
        if let Some(path) = initial {
            app.open_path(path);
        }
        app
    }

    pub fn has_image(&self) -> bool {
        self.viewport.texture.is_some()
    }

    /// Open an image, first rolling back any backup an interrupted rotation
    /// left next to it.
    pub fn open_path(&mut self, path: PathBuf) {
        let key = match ResourceKey::from_path(&path) {
            Ok(key) => key,
            Err(e) => {
                self.ui_state
                    .add_log(format!("ERROR: cannot open {}: {e}", path.display()));
                return;
            }
        };
        if self.viewer.safety().is_in_progress(Some(&key)) {
            self.display.open(path);
            return;
        }

        let display = Arc::clone(&self.display);
        tokio::spawn(async move {
            let backend = FsImageBackend::new();
            if backend.has_backup(&key) {
                match backend.recover(&key).await {
                    Ok(_) => warn!(%key, "restored backup left by an interrupted rotation"),
                    Err(e) => warn!(%key, error = %e, "leftover backup could not be restored"),
                }
            }
            display.open(path);
        });
    }

    fn poll_commands(&mut self) {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            match cmd {
                UiCommand::Open { path } => self.open_path(path),
            }
        }
    }

    /// Drain decoded images from the display.
    fn poll_display(&mut self, ctx: &egui::Context) {
        while let Ok(update) = self.display_rx.try_recv() {
            match update {
                DisplayUpdate::Loaded {
                    key,
                    image,
                    size,
                    origin,
                } => {
                    self.update_viewport_texture(ctx, image);
                    if origin == LoadOrigin::Open {
                        self.ui_state.add_log(format!(
                            "Opened: {} ({}x{})",
                            key, size.width, size.height
                        ));
                        self.ui_state.file_path = Some(key.path().to_path_buf());
                        self.display.set_current(Some(key.clone()));
                        self.viewer.image_loaded(&key, size);
                    }
                }
                DisplayUpdate::Failed { path, message } => {
                    self.ui_state
                        .add_log(format!("ERROR: {}: {message}", path.display()));
                }
            }
        }
    }

    fn poll_rotate_events(&mut self) {
        while let Ok(event) = self.rotate_rx.try_recv() {
            match event {
                RotateEvent::Completed {
                    key,
                    angle,
                    displayed,
                } => {
                    let note = if displayed { "" } else { " (applies when reopened)" };
                    self.ui_state
                        .add_log(format!("Rotated {key} by {angle}\u{00b0}{note}"));
                }
                RotateEvent::RolledBack {
                    key,
                    cancelled: true,
                    ..
                } => {
                    self.ui_state
                        .add_log(format!("Rotation of {key} cancelled, original kept"));
                }
                RotateEvent::RolledBack { key, reason, .. } => {
                    self.ui_state
                        .add_log(format!("ERROR: rotation of {key} failed: {reason}"));
                }
                RotateEvent::RestoreFailed { key, reason } => {
                    self.ui_state
                        .add_log(format!("ERROR: restore of {key} failed: {reason}"));
                    self.ui_state.restore_failure = Some(format!(
                        "{key} could not be restored after a failed rotation and may be \
                         damaged.\n\n{reason}"
                    ));
                }
            }
        }
    }

    fn update_viewport_texture(&mut self, ctx: &egui::Context, image: egui::ColorImage) {
        let size = image.size;
        let texture = ctx.load_texture("viewport", image, egui::TextureOptions::LINEAR);
        self.viewport.texture = Some(texture);
        self.viewport.image_size = Some(size);
    }

    /// Hold the window open while rotate work is outstanding, then close once
    /// the shutdown protocol has resolved.
    fn handle_close(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested())
            || self.close_confirmed.load(Ordering::SeqCst)
            || (!self.closing && !self.viewer.has_pending_work())
        {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        if self.closing {
            return;
        }

        self.closing = true;
        self.ui_state
            .add_log("Waiting for rotation to finish before closing...".into());
        let shutdown = self.viewer.begin_close();
        let confirmed = Arc::clone(&self.close_confirmed);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let outcome = shutdown.await;
            info!(?outcome, "close protocol finished");
            confirmed.store(true, Ordering::SeqCst);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        });
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if self.ui_state.show_about {
            egui::Window::new("About Lens")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Lens");
                        ui.label("Image viewer with safe in-place rotation");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.ui_state.show_about = false;
                        }
                    });
                });
        }

        if let Some(message) = self.ui_state.restore_failure.clone() {
            egui::Window::new("Restore failed")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    ui.label("Run `lens recover <file>` to retry the restore.");
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.ui_state.restore_failure = None;
                    }
                });
        }
    }
}

impl eframe::App for LensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_commands();
        self.poll_display(ctx);
        self.poll_rotate_events();
        self.handle_close(ctx);

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::viewport::show(ctx, self);
        self.show_dialogs(ctx);

        // Pipeline events arrive without a repaint request of their own.
        if self.closing || self.viewer.has_pending_work() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl Drop for LensApp {
    fn drop(&mut self) {
        self.viewer.destroy();
    }
}
