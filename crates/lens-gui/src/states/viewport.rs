use std::collections::BTreeMap;

use lens_core::viewport::Point;

/// What the central panel draws, plus raw input bookkeeping. The transform
/// itself lives in the viewer.
#[derive(Default)]
pub struct ViewportState {
    pub texture: Option<egui::TextureHandle>,
    pub image_size: Option<[usize; 2]>,
    /// Last container size pushed to the viewer.
    pub container: Option<egui::Vec2>,
    /// Fingers currently down, by touch id.
    pub touches: BTreeMap<u64, Point>,
}

impl ViewportState {
    pub fn touch_points(&self) -> Vec<Point> {
        self.touches.values().copied().collect()
    }
}
