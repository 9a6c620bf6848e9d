use lens_core::viewport::{InputEvent, Point, Size, WheelDirection};
use lens_core::ViewCommand;

use crate::app::LensApp;

pub fn show(ctx: &egui::Context, app: &mut LensApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);
        sync_container(app, rect);

        let texture_info = app
            .viewport
            .texture
            .as_ref()
            .map(|t| (t.id(), egui::vec2(t.size()[0] as f32, t.size()[1] as f32)));

        if let Some((texture_id, image_size)) = texture_info {
            let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

            handle_pointer(&response, app, rect);
            handle_wheel(ui, &response, app, rect);
            handle_touch(ui, app, rect);

            if response.double_clicked() {
                app.viewer.command(ViewCommand::FitToScreen);
            }

            let img_rect = compute_img_rect(rect, image_size, app);
            draw_image(ui, rect, texture_id, img_rect);
            draw_rotating_label(ui, rect, app);
        } else {
            show_placeholder(ui);
        }
    });
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

/// Container-local coordinates, as the viewer expects them.
fn local(pos: egui::Pos2, rect: egui::Rect) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn sync_container(app: &mut LensApp, rect: egui::Rect) {
    let size = rect.size();
    if app.viewport.container == Some(size) {
        return;
    }
    app.viewport.container = Some(size);
    app.viewer.handle_input(InputEvent::Resize {
        container: Size::new(size.x as f64, size.y as f64),
    });
}

fn handle_pointer(response: &egui::Response, app: &mut LensApp, rect: egui::Rect) {
    if let Some(pos) = response.interact_pointer_pos() {
        if response.drag_started_by(egui::PointerButton::Primary) {
            app.viewer.handle_input(InputEvent::PointerDown {
                position: local(pos, rect),
                primary: true,
            });
        } else if response.dragged_by(egui::PointerButton::Primary) {
            app.viewer.handle_input(InputEvent::PointerMove {
                position: local(pos, rect),
            });
        }
    }
    if response.drag_stopped() {
        app.viewer.handle_input(InputEvent::PointerUp);
    }
    if response.ctx.input(|i| i.events.iter().any(|e| matches!(e, egui::Event::PointerGone))) {
        app.viewer.handle_input(InputEvent::PointerLeave);
    }
}

fn handle_wheel(ui: &egui::Ui, response: &egui::Response, app: &mut LensApp, rect: egui::Rect) {
    let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
    if scroll_delta == 0.0 || !response.hovered() {
        return;
    }
    let Some(mouse_pos) = ui.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    // egui reports scrolling up as a positive delta, the DOM as negative.
    let direction = WheelDirection::from_dom_delta(-scroll_delta as f64);
    app.viewer.handle_input(InputEvent::Wheel {
        position: local(mouse_pos, rect),
        direction,
    });
}

/// Raw touches drive pinch only. A single finger already arrives as pointer
/// events, so touch lists are forwarded once a second finger is down.
fn handle_touch(ui: &egui::Ui, app: &mut LensApp, rect: egui::Rect) {
    let touches: Vec<(u64, egui::TouchPhase, egui::Pos2)> = ui.input(|i| {
        i.events
            .iter()
            .filter_map(|e| match e {
                egui::Event::Touch { id, phase, pos, .. } => Some((id.0, *phase, *pos)),
                _ => None,
            })
            .collect()
    });

    for (id, phase, pos) in touches {
        let before = app.viewport.touches.len();
        match phase {
            egui::TouchPhase::Start => {
                app.viewport.touches.insert(id, local(pos, rect));
                if app.viewport.touches.len() >= 2 {
                    let touches = app.viewport.touch_points();
                    app.viewer.handle_input(InputEvent::TouchStart { touches });
                }
            }
            egui::TouchPhase::Move => {
                app.viewport.touches.insert(id, local(pos, rect));
                if app.viewport.touches.len() >= 2 {
                    let touches = app.viewport.touch_points();
                    app.viewer.handle_input(InputEvent::TouchMove { touches });
                }
            }
            egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                app.viewport.touches.remove(&id);
                if before >= 2 {
                    let touches = app.viewport.touch_points();
                    app.viewer.handle_input(InputEvent::TouchEnd { touches });
                }
            }
        }
    }
}

fn compute_img_rect(rect: egui::Rect, image_size: egui::Vec2, app: &LensApp) -> egui::Rect {
    let t = app.viewer.transform();
    let min = rect.min + egui::vec2(t.translate_x as f32, t.translate_y as f32);
    egui::Rect::from_min_size(min, image_size * t.scale as f32)
}

fn draw_image(ui: &egui::Ui, clip: egui::Rect, texture_id: egui::TextureId, img_rect: egui::Rect) {
    ui.painter_at(clip).image(
        texture_id,
        img_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

fn draw_rotating_label(ui: &egui::Ui, rect: egui::Rect, app: &LensApp) {
    let rotating = !app.viewer.safety().list_in_progress().is_empty();
    let queued = app.viewer.batcher().has_pending();
    let label = match (rotating, queued) {
        (true, _) => "Rotating...",
        (false, true) => "Rotation queued",
        (false, false) => return,
    };
    ui.painter().text(
        rect.left_top() + egui::vec2(8.0, 8.0),
        egui::Align2::LEFT_TOP,
        label,
        egui::FontId::proportional(14.0),
        egui::Color32::from_white_alpha(200),
    );
}

fn show_placeholder(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new("Open an image to begin")
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}
