use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::consts::BUSY_RETRY_MS;
use crate::resource::ResourceKey;
use crate::rotate::{
    BatchCallback, ClickBatcher, ImageBackend, ImageDisplay, MutationPipeline, RotateEvent,
    RotationSafetyManager, ShutdownOutcome,
};
use crate::viewport::{
    lock_viewport, GestureMode, GestureRouter, InputEvent, SharedViewport, Size, Transform,
    TransformEngine,
};

/// Toolbar and keyboard actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewCommand {
    ZoomIn,
    ZoomOut,
    ResetZoom,
    FitToScreen,
    Rotate,
}

/// Wires the viewport and the rotate pipeline to a host's backend and
/// display.
///
/// Must be created inside a tokio runtime: batch timers and pipeline runs
/// are spawned on it.
pub struct Viewer<B, D> {
    config: ViewerConfig,
    viewport: SharedViewport,
    router: GestureRouter,
    display: Arc<D>,
    pipeline: Arc<MutationPipeline<B, D>>,
    batcher: ClickBatcher,
}

impl<B: ImageBackend, D: ImageDisplay> Viewer<B, D> {
    pub fn new(
        config: ViewerConfig,
        backend: Arc<B>,
        display: Arc<D>,
        events: Option<UnboundedSender<RotateEvent>>,
    ) -> Self {
        let viewport: SharedViewport =
            Arc::new(Mutex::new(TransformEngine::new(config.zoom.clone())));
        let safety = Arc::new(RotationSafetyManager::new());

        let mut pipeline = MutationPipeline::new(
            backend,
            Arc::clone(&display),
            Arc::clone(&viewport),
            safety,
        );
        if let Some(tx) = events {
            pipeline = pipeline.with_events(tx);
        }
        let pipeline = Arc::new(pipeline);
        // A batch that comes due while its file is still rotating waits for
        // that run to finish.
        let busy_safety = Arc::clone(pipeline.safety());
        let batcher = ClickBatcher::guarded(
            config.rotate.quiescence(),
            config.rotate.degrees_per_click,
            spawn_pipeline(&pipeline),
            Arc::new(move |key: &ResourceKey| busy_safety.is_in_progress(Some(key))),
            Duration::from_millis(BUSY_RETRY_MS),
        );

        Self {
            config,
            viewport,
            router: GestureRouter::new(),
            display,
            pipeline,
            batcher,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    pub fn safety(&self) -> &Arc<RotationSafetyManager> {
        self.pipeline.safety()
    }

    pub fn batcher(&self) -> &ClickBatcher {
        &self.batcher
    }

    pub fn pipeline(&self) -> &Arc<MutationPipeline<B, D>> {
        &self.pipeline
    }

    pub fn gesture_mode(&self) -> GestureMode {
        self.router.mode()
    }

    pub fn transform(&self) -> Transform {
        lock_viewport(&self.viewport).transform()
    }

    pub fn zoom_percent(&self) -> u32 {
        lock_viewport(&self.viewport).zoom_percent()
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Transform {
        let mut viewport = lock_viewport(&self.viewport);
        self.router.handle(&mut viewport, event);
        viewport.transform()
    }

    pub fn command(&mut self, command: ViewCommand) -> Transform {
        {
            let mut viewport = lock_viewport(&self.viewport);
            match command {
                ViewCommand::ZoomIn => viewport.zoom_in(),
                ViewCommand::ZoomOut => viewport.zoom_out(),
                ViewCommand::ResetZoom => viewport.reset_zoom(),
                ViewCommand::FitToScreen => viewport.fit_to_screen(),
                ViewCommand::Rotate => {}
            }
        }
        if command == ViewCommand::Rotate {
            self.request_rotate();
        }
        self.transform()
    }

    /// Count a rotate click against whatever is on screen. Returns false
    /// when nothing is displayed.
    pub fn request_rotate(&self) -> bool {
        match self.display.current_resource_key() {
            Some(key) => {
                self.batcher.register_action(key);
                true
            }
            None => {
                debug!("rotate requested with no image displayed");
                false
            }
        }
    }

    /// On-load notification from the display: fit the new image, then
    /// apply a rotation that finished while it was off screen.
    pub fn image_loaded(&self, key: &ResourceKey, natural_size: Size) -> Transform {
        lock_viewport(&self.viewport).load_content(natural_size);

        if let Some(angle) = self.safety().take_completed(key) {
            info!(%key, angle, "showing rotation finished off screen");
            match self.display.reload(key, true) {
                Ok(size) => {
                    let mut viewport = lock_viewport(&self.viewport);
                    viewport.set_content_size(size);
                    viewport.fit_to_screen();
                }
                Err(e) => warn!(%key, error = %e, "reload of rotated image failed"),
            }
        }
        self.transform()
    }

    /// Close-request protocol. Unfired click batches are dropped, running
    /// rotations get the configured grace period.
    pub async fn close_requested(&self) -> ShutdownOutcome {
        self.begin_close().await
    }

    /// Owned form of [`Viewer::close_requested`] for hosts that cannot block
    /// their event loop: batches are dropped now, the returned future does
    /// the waiting and can be spawned.
    pub fn begin_close(&self) -> impl Future<Output = ShutdownOutcome> + Send + 'static {
        if self.batcher.has_pending() {
            info!("discarding unfired rotate clicks on close");
        }
        self.batcher.destroy();
        let safety = Arc::clone(self.safety());
        let shutdown = self.config.shutdown.clone();
        async move {
            safety
                .shutdown(shutdown.grace_period(), shutdown.poll_interval())
                .await
        }
    }

    /// Whether closing now would drop or interrupt rotate work.
    pub fn has_pending_work(&self) -> bool {
        self.batcher.has_pending() || self.safety().is_in_progress(None)
    }

    pub fn destroy(&self) {
        self.batcher.destroy();
        self.safety().destroy();
    }
}

fn spawn_pipeline<B: ImageBackend, D: ImageDisplay>(
    pipeline: &Arc<MutationPipeline<B, D>>,
) -> BatchCallback {
    let pipeline = Arc::clone(pipeline);
    Arc::new(move |key, angle| {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            match pipeline.run(key, angle).await {
                Ok(outcome) => debug!(?outcome, "rotation finished"),
                Err(e) if e.is_cancelled() => debug!("rotation cancelled"),
                Err(e) => warn!(error = %e, "rotation not applied"),
            }
        });
    })
}
