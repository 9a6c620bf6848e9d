use crate::error::Result;
use crate::resource::ResourceKey;
use crate::viewport::Size;

/// The image display collaborator: knows what is on screen and can reload it.
///
/// Hosts report finished loads back through `Viewer::image_loaded`.
pub trait ImageDisplay: Send + Sync + 'static {
    fn current_resource_key(&self) -> Option<ResourceKey>;

    /// Reload `key` from storage. With `bypass_cache`, stale decoded pixels
    /// must not be reused. Returns the natural size of the reloaded image.
    fn reload(&self, key: &ResourceKey, bypass_cache: bool) -> Result<Size>;
}
