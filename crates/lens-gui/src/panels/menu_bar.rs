use lens_core::ViewCommand;

use crate::app::LensApp;
use crate::messages::UiCommand;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

pub fn show(ctx: &egui::Context, app: &mut LensApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui.add(egui::Button::new("Open...").shortcut_text(ctx.format_shortcut(&open_shortcut))).clicked() {
                    ui.close();
                    open_file(app);
                }

                ui.separator();

                let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                let has_image = app.has_image();
                let items = [
                    ("Zoom In", "+", ViewCommand::ZoomIn),
                    ("Zoom Out", "-", ViewCommand::ZoomOut),
                    ("Actual Size", "0", ViewCommand::ResetZoom),
                    ("Fit to Window", "F", ViewCommand::FitToScreen),
                ];
                for (label, key, command) in items {
                    if ui
                        .add_enabled(has_image, egui::Button::new(label).shortcut_text(key))
                        .clicked()
                    {
                        ui.close();
                        app.viewer.command(command);
                    }
                }
            });

            ui.menu_button("Image", |ui| {
                if ui
                    .add_enabled(app.has_image(), egui::Button::new("Rotate Clockwise").shortcut_text("R"))
                    .clicked()
                {
                    ui.close();
                    rotate(app);
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.ui_state.show_about = true;
                }
            });
        });

        ui.horizontal(|ui| {
            ui.add_enabled_ui(app.has_image(), |ui| {
                if ui.button("\u{2212}").on_hover_text("Zoom out").clicked() {
                    app.viewer.command(ViewCommand::ZoomOut);
                }
                if ui.button("+").on_hover_text("Zoom in").clicked() {
                    app.viewer.command(ViewCommand::ZoomIn);
                }
                if ui.button("1:1").on_hover_text("Actual size").clicked() {
                    app.viewer.command(ViewCommand::ResetZoom);
                }
                if ui.button("Fit").on_hover_text("Fit to window").clicked() {
                    app.viewer.command(ViewCommand::FitToScreen);
                }
                ui.separator();
                if ui.button("\u{21bb}").on_hover_text("Rotate clockwise").clicked() {
                    rotate(app);
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
            open_file(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if app.has_image() && !ctx.wants_keyboard_input() {
            let pressed = |key| ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, key));
            if pressed(egui::Key::Plus) || pressed(egui::Key::Equals) {
                app.viewer.command(ViewCommand::ZoomIn);
            }
            if pressed(egui::Key::Minus) {
                app.viewer.command(ViewCommand::ZoomOut);
            }
            if pressed(egui::Key::Num0) {
                app.viewer.command(ViewCommand::ResetZoom);
            }
            if pressed(egui::Key::F) {
                app.viewer.command(ViewCommand::FitToScreen);
            }
            if pressed(egui::Key::R) {
                rotate(app);
            }
        }
    });
}

fn open_file(app: &mut LensApp) {
    let cmd_tx = app.cmd_tx.clone();
    let ctx = app.display.ctx().clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = cmd_tx.send(UiCommand::Open { path });
            ctx.request_repaint();
        }
    });
}

fn rotate(app: &mut LensApp) {
    if !app.viewer.request_rotate() {
        app.ui_state.add_log("Nothing to rotate".into());
    }
}
