use tracing::debug;

use crate::config::ZoomConfig;
use crate::consts::{NATURAL_SCALE, SCALE_EPSILON};

use super::state::{PinchState, Point, Size, Transform, ViewportState};

/// Wheel notch direction. `Up` zooms in, `Down` zooms out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

impl WheelDirection {
    /// Browser convention: positive `deltaY` means scrolling down.
    pub fn from_dom_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

/// Owns the viewport state and every rule that changes it.
///
/// Operations are silent no-ops until both a container and a content size
/// are attached.
#[derive(Clone, Debug)]
pub struct TransformEngine {
    state: ViewportState,
    container: Option<Size>,
    content: Option<Size>,
    config: ZoomConfig,
}

impl TransformEngine {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            state: ViewportState::default(),
            container: None,
            content: None,
            config,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn transform(&self) -> Transform {
        self.state.transform()
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn container_size(&self) -> Option<Size> {
        self.container
    }

    pub fn content_size(&self) -> Option<Size> {
        self.content
    }

    /// Current zoom as a rounded percentage, for status readouts.
    pub fn zoom_percent(&self) -> u32 {
        (self.state.scale * 100.0).round().max(0.0) as u32
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.container = Some(size);
    }

    pub fn set_content_size(&mut self, size: Size) {
        self.content = Some(size);
    }

    /// New image on screen: drop the previous framing and fit.
    pub fn load_content(&mut self, size: Size) {
        self.state = ViewportState::default();
        self.content = Some(size);
        self.fit_to_screen();
    }

    pub fn detach_content(&mut self) {
        self.content = None;
        self.state = ViewportState::default();
    }

    fn attached(&self) -> Option<(Size, Size)> {
        match (self.container, self.content) {
            (Some(container), Some(content)) if container.is_usable() && content.is_usable() => {
                Some((container, content))
            }
            _ => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached().is_some()
    }

    /// Scale at which the content fits the container on at least one axis.
    pub fn fit_scale(&self) -> Option<f64> {
        let (container, content) = self.attached()?;
        Some((container.width / content.width).min(container.height / content.height))
    }

    /// Lower scale bound: the fit scale, but never above natural size.
    pub fn min_effective_scale(&self) -> f64 {
        self.fit_scale()
            .map_or(NATURAL_SCALE, |fit| fit.min(NATURAL_SCALE))
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        // max/min instead of f64::clamp: the bounds come from config and
        // must not panic if they cross.
        scale.max(self.min_effective_scale()).min(self.config.max_scale)
    }

    pub fn zoom_in(&mut self) {
        if !self.is_attached() {
            return;
        }
        self.state.scale = self.clamp_scale(self.state.scale * self.config.step_factor);
        self.state.is_fit_active = false;
        debug!(scale = self.state.scale, "zoom in");
    }

    pub fn zoom_out(&mut self) {
        if !self.is_attached() {
            return;
        }
        self.state.scale = self.clamp_scale(self.state.scale / self.config.step_factor);
        self.state.is_fit_active = false;
        debug!(scale = self.state.scale, "zoom out");
    }

    /// Zoom one wheel notch while keeping `cursor` over the same content
    /// pixel. Returns whether the scale changed.
    pub fn wheel_zoom(&mut self, cursor: Point, direction: WheelDirection) -> bool {
        if !self.is_attached() {
            return false;
        }
        let factor = match direction {
            WheelDirection::Up => self.config.wheel_zoom_in_factor,
            WheelDirection::Down => self.config.wheel_zoom_out_factor,
        };
        let new_scale = self.clamp_scale(self.state.scale * factor);
        self.zoom_about(cursor, new_scale)
    }

    /// Apply a pinch relative to the scale captured at gesture start.
    pub fn pinch_zoom(&mut self, pinch: &PinchState, anchor: Point, distance_ratio: f64) -> bool {
        if !self.is_attached() || !distance_ratio.is_finite() || distance_ratio <= 0.0 {
            return false;
        }
        let new_scale = self.clamp_scale(pinch.initial_scale * distance_ratio);
        self.zoom_about(anchor, new_scale)
    }

    fn zoom_about(&mut self, anchor: Point, new_scale: f64) -> bool {
        let old_scale = self.state.scale;
        if (new_scale - old_scale).abs() <= SCALE_EPSILON {
            return false;
        }
        let ratio = new_scale / old_scale;
        self.state.translate_x = anchor.x - (anchor.x - self.state.translate_x) * ratio;
        self.state.translate_y = anchor.y - (anchor.y - self.state.translate_y) * ratio;
        self.state.scale = new_scale;
        self.state.is_fit_active = false;
        true
    }

    /// Scale down to fit (never up past natural size) and center.
    pub fn fit_to_screen(&mut self) {
        let Some((container, content)) = self.attached() else {
            return;
        };
        let scale = (container.width / content.width)
            .min(container.height / content.height)
            .min(NATURAL_SCALE);
        self.state.scale = scale;
        self.state.translate_x = (container.width - content.width * scale) / 2.0;
        self.state.translate_y = (container.height - content.height * scale) / 2.0;
        self.state.is_fit_active = true;
        debug!(scale, "fit to screen");
    }

    /// Back to natural size at the origin. Distinct from fit, so the view
    /// stops following resizes.
    pub fn reset_zoom(&mut self) {
        if !self.is_attached() {
            return;
        }
        self.state.scale = NATURAL_SCALE.max(self.min_effective_scale());
        self.state.translate_x = 0.0;
        self.state.translate_y = 0.0;
        self.state.is_fit_active = false;
    }

    pub fn pan(&mut self, delta: Point) {
        if !self.is_attached() {
            return;
        }
        self.state.translate_x += delta.x;
        self.state.translate_y += delta.y;
        self.state.is_fit_active = false;
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        if !self.is_attached() {
            return;
        }
        self.state.is_dragging = true;
        self.state.drag_origin = Point::new(
            pointer.x - self.state.translate_x,
            pointer.y - self.state.translate_y,
        );
    }

    pub fn drag_to(&mut self, pointer: Point) {
        if !self.state.is_dragging || !self.is_attached() {
            return;
        }
        self.state.translate_x = pointer.x - self.state.drag_origin.x;
        self.state.translate_y = pointer.y - self.state.drag_origin.y;
        self.state.is_fit_active = false;
    }

    pub fn end_drag(&mut self) {
        self.state.is_dragging = false;
    }

    /// Container resized: follow it while fit is active. Otherwise keep the
    /// user's framing, pulling the scale back inside the bounds the new
    /// container implies, anchored on its centre.
    pub fn refit_if_active(&mut self) {
        if self.state.is_fit_active {
            self.fit_to_screen();
            return;
        }
        let Some((container, _)) = self.attached() else {
            return;
        };
        let clamped = self.clamp_scale(self.state.scale);
        let centre = Point::new(container.width / 2.0, container.height / 2.0);
        if self.zoom_about(centre, clamped) {
            debug!(scale = clamped, "scale re-clamped after resize");
        }
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}
