use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use lens_core::error::{LensError, Result};
use lens_core::rotate::ImageDisplay;
use lens_core::viewport::Size;
use lens_core::ResourceKey;
use tracing::debug;

use crate::convert::to_color_image;
use crate::messages::{DisplayUpdate, LoadOrigin};

struct Decoded {
    key: ResourceKey,
    image: egui::ColorImage,
    size: Size,
}

/// The window's image slot. Decodes on background threads and hands the
/// pixels to the UI thread over a channel.
pub struct GuiDisplay {
    this: Weak<GuiDisplay>,
    current: Mutex<Option<ResourceKey>>,
    /// Last decoded image, reused when the same file is reopened.
    cache: Mutex<Option<Decoded>>,
    tx: mpsc::Sender<DisplayUpdate>,
    ctx: egui::Context,
}

impl GuiDisplay {
    pub fn new(tx: mpsc::Sender<DisplayUpdate>, ctx: egui::Context) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            current: Mutex::new(None),
            cache: Mutex::new(None),
            tx,
            ctx,
        })
    }

    fn self_ref(&self) -> Result<Arc<Self>> {
        self.this
            .upgrade()
            .ok_or_else(|| LensError::Display("display is shutting down".into()))
    }

    pub fn ctx(&self) -> &egui::Context {
        &self.ctx
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<Decoded>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_current(&self, key: Option<ResourceKey>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = key;
    }

    /// Decode `path` on a background thread and send it to the UI.
    pub fn open(self: &Arc<Self>, path: PathBuf) {
        let display = Arc::clone(self);
        std::thread::spawn(move || {
            let loaded = ResourceKey::from_path(&path).and_then(|key| {
                let (image, size) = display.decode(&key, false)?;
                Ok((key, image, size))
            });
            let update = match loaded {
                Ok((key, image, size)) => DisplayUpdate::Loaded {
                    key,
                    image,
                    size,
                    origin: LoadOrigin::Open,
                },
                Err(e) => DisplayUpdate::Failed {
                    path,
                    message: e.to_string(),
                },
            };
            display.send(update);
        });
    }

    fn decode(&self, key: &ResourceKey, bypass_cache: bool) -> Result<(egui::ColorImage, Size)> {
        if !bypass_cache {
            if let Some(cached) = self.lock_cache().as_ref().filter(|d| &d.key == key) {
                debug!(%key, "decode served from cache");
                return Ok((cached.image.clone(), cached.size));
            }
        }

        let img = image::open(key.path())?;
        let size = Size::new(img.width() as f64, img.height() as f64);
        let image = to_color_image(&img);
        *self.lock_cache() = Some(Decoded {
            key: key.clone(),
            image: image.clone(),
            size,
        });
        Ok((image, size))
    }

    fn send(&self, update: DisplayUpdate) {
        let _ = self.tx.send(update);
        self.ctx.request_repaint();
    }
}

impl ImageDisplay for GuiDisplay {
    fn current_resource_key(&self) -> Option<ResourceKey> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reads only the header for the size; decoding happens off the
    /// caller's thread and reaches the UI as a `Reload` update.
    fn reload(&self, key: &ResourceKey, bypass_cache: bool) -> Result<Size> {
        let (w, h) = image::image_dimensions(key.path())?;
        let size = Size::new(w as f64, h as f64);

        let display = self.self_ref()?;
        let key = key.clone();
        std::thread::spawn(move || {
            let update = match display.decode(&key, bypass_cache) {
                Ok((image, size)) => DisplayUpdate::Loaded {
                    key,
                    image,
                    size,
                    origin: LoadOrigin::Reload,
                },
                Err(e) => DisplayUpdate::Failed {
                    path: key.path().to_path_buf(),
                    message: e.to_string(),
                },
            };
            display.send(update);
        });
        Ok(size)
    }
}
