use lens_core::rotate::ImageDisplay;
use lens_core::viewport::lock_viewport;

use crate::app::LensApp;

pub fn show(ctx: &egui::Context, app: &mut LensApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Log area: fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    // Reserve space for 4 empty lines to prevent layout jump.
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            if let Some(ref size) = app.viewport.image_size {
                ui.label(format!("{}x{}", size[0], size[1]));
                ui.separator();
            }
            ui.label(format!("Zoom: {}%", app.viewer.zoom_percent()));
            if lock_viewport(app.viewer.viewport()).state().is_fit_active {
                ui.label("(Fit)");
            }

            if let Some(key) = app.display.current_resource_key() {
                let clicks = app.viewer.batcher().pending_count(&key);
                if clicks > 0 {
                    ui.separator();
                    ui.label(format!("Rotate queued: {clicks} click(s)"));
                }
            }

            let rotating = app.viewer.safety().list_in_progress();
            if !rotating.is_empty() {
                ui.separator();
                ui.spinner();
                let names: Vec<String> = rotating.iter().map(ToString::to_string).collect();
                ui.label(format!("Rotating: {}", names.join(", ")));
            }
        });

        ui.add_space(2.0);
    });
}
