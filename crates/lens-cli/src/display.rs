use lens_core::error::{LensError, Result};
use lens_core::rotate::ImageDisplay;
use lens_core::viewport::Size;
use lens_core::ResourceKey;

/// Stands in for an on-screen image when running without a window. The one
/// file being worked on is always "displayed", and a reload only re-reads its
/// dimensions.
pub struct HeadlessDisplay {
    key: ResourceKey,
}

impl HeadlessDisplay {
    pub fn new(key: ResourceKey) -> Self {
        Self { key }
    }
}

pub fn image_size(key: &ResourceKey) -> Result<Size> {
    let (w, h) = image::image_dimensions(key.path())?;
    Ok(Size::new(w as f64, h as f64))
}

impl ImageDisplay for HeadlessDisplay {
    fn current_resource_key(&self) -> Option<ResourceKey> {
        Some(self.key.clone())
    }

    fn reload(&self, key: &ResourceKey, _bypass_cache: bool) -> Result<Size> {
        if key != &self.key {
            return Err(LensError::Display(format!("{key} is not the displayed file")));
        }
        image_size(key)
    }
}
