use std::path::PathBuf;

use lens_core::viewport::Size;
use lens_core::ResourceKey;

/// Requests raised off the UI thread (file dialogs) for the app to act on.
pub enum UiCommand {
    Open { path: PathBuf },
}

/// Why an image was decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Opened by the user; the viewer still has to be told.
    Open,
    /// Reloaded by the rotate pipeline, which has already refitted.
    Reload,
}

/// Decoded images sent from the display to the UI thread.
pub enum DisplayUpdate {
    Loaded {
        key: ResourceKey,
        image: egui::ColorImage,
        size: Size,
        origin: LoadOrigin,
    },
    Failed {
        path: PathBuf,
        message: String,
    },
}
