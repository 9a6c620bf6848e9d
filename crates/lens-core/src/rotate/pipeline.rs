use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::error::{LensError, Result};
use crate::resource::ResourceKey;
use crate::viewport::{lock_viewport, SharedViewport};

use super::backend::ImageBackend;
use super::display::ImageDisplay;
use super::safety::{RotationSafetyManager, RotationTicket};

/// Points at which the pipeline looks at its cancellation token. Nothing
/// else can stop it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checkpoint {
    AfterBackup,
    AfterMutate,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterBackup => write!(f, "after backup"),
            Self::AfterMutate => write!(f, "after rotate"),
        }
    }
}

fn checkpoint(ticket: &RotationTicket, at: Checkpoint) -> Result<()> {
    if ticket.is_cancelled() {
        debug!(key = %ticket.key(), %at, "cancellation observed");
        return Err(LensError::Cancelled(ticket.key().clone()));
    }
    Ok(())
}

/// Published once per pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub enum RotateEvent {
    Completed {
        key: ResourceKey,
        angle: i32,
        /// False when another image was on screen; the result waits in the
        /// safety manager until the resource is shown again.
        displayed: bool,
    },
    RolledBack {
        key: ResourceKey,
        reason: String,
        cancelled: bool,
    },
    /// The rotate call was issued and the backup could not be put back.
    RestoreFailed { key: ResourceKey, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotateOutcome {
    /// The resource was on screen and has been reloaded and re-fitted.
    Displayed,
    /// Stored for the next time the resource is shown.
    Pending,
}

/// backup → rotate → redisplay → cleanup, with rollback on any failure.
pub struct MutationPipeline<B, D> {
    backend: Arc<B>,
    display: Arc<D>,
    viewport: SharedViewport,
    safety: Arc<RotationSafetyManager>,
    events: Option<UnboundedSender<RotateEvent>>,
}

impl<B: ImageBackend, D: ImageDisplay> MutationPipeline<B, D> {
    pub fn new(
        backend: Arc<B>,
        display: Arc<D>,
        viewport: SharedViewport,
        safety: Arc<RotationSafetyManager>,
    ) -> Self {
        Self {
            backend,
            display,
            viewport,
            safety,
            events: None,
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<RotateEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn safety(&self) -> &Arc<RotationSafetyManager> {
        &self.safety
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Rotate `key` by `angle` degrees.
    ///
    /// Returns `ConcurrencyConflict` without touching the backend if a
    /// rotation for `key` is already running.
    pub async fn run(&self, key: ResourceKey, angle: i32) -> Result<RotateOutcome> {
        let ticket = self.safety.begin(&key)?;
        info!(%key, angle, "rotation pipeline started");

        let mut mutate_issued = false;
        match self.apply(&ticket, angle, &mut mutate_issued).await {
            Ok(()) => Ok(self.finish(&ticket, angle).await),
            Err(cause) => Err(self.roll_back(&ticket, cause, mutate_issued).await),
        }
    }

    async fn apply(
        &self,
        ticket: &RotationTicket,
        angle: i32,
        mutate_issued: &mut bool,
    ) -> Result<()> {
        let key = ticket.key();
        self.backend.create_backup(key).await?;
        checkpoint(ticket, Checkpoint::AfterBackup)?;

        *mutate_issued = true;
        self.backend.mutate(key, angle).await?;
        // The write has landed; a cancel from here on is undone by restore.
        checkpoint(ticket, Checkpoint::AfterMutate)?;
        Ok(())
    }

    async fn finish(&self, ticket: &RotationTicket, angle: i32) -> RotateOutcome {
        let key = ticket.key();
        let displayed = self.refresh_display(key, true);

        if let Err(e) = self.backend.cleanup_backup(key).await {
            warn!(%key, error = %e, "backup cleanup failed");
        }

        self.safety.complete(ticket, angle);
        if displayed {
            // Already on screen, nothing left for a later redisplay.
            self.safety.take_completed(key);
        }

        self.publish(RotateEvent::Completed {
            key: key.clone(),
            angle,
            displayed,
        });
        if displayed {
            RotateOutcome::Displayed
        } else {
            RotateOutcome::Pending
        }
    }

    async fn roll_back(
        &self,
        ticket: &RotationTicket,
        cause: LensError,
        mutate_issued: bool,
    ) -> LensError {
        let key = ticket.key();
        if cause.is_cancelled() {
            info!(%key, "rotation cancelled, restoring backup");
        } else {
            warn!(%key, error = %cause, "rotation failed, restoring backup");
        }

        let result = match self.backend.restore_from_backup(key).await {
            Ok(()) => {
                self.refresh_display(key, false);
                self.publish_rolled_back(key, &cause);
                cause
            }
            Err(restore_err) if mutate_issued => {
                error!(
                    %key,
                    cause = %cause,
                    error = %restore_err,
                    "restore failed after rotate was issued, file may be inconsistent"
                );
                let reason = format!("{restore_err} (after: {cause})");
                self.publish(RotateEvent::RestoreFailed {
                    key: key.clone(),
                    reason: reason.clone(),
                });
                LensError::RestoreFailed {
                    key: key.clone(),
                    reason,
                }
            }
            Err(restore_err) => {
                // Rotate was never issued, the file itself is untouched.
                warn!(%key, error = %restore_err, "restore failed before any write");
                self.publish_rolled_back(key, &cause);
                cause
            }
        };

        self.safety.fail(ticket);
        result
    }

    /// Reload `key` if it is on screen. Returns whether it was.
    fn refresh_display(&self, key: &ResourceKey, refit: bool) -> bool {
        if self.display.current_resource_key().as_ref() != Some(key) {
            return false;
        }
        match self.display.reload(key, true) {
            Ok(size) => {
                let mut viewport = lock_viewport(&self.viewport);
                viewport.set_content_size(size);
                if refit {
                    viewport.fit_to_screen();
                }
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "reload failed");
                false
            }
        }
    }

    fn publish_rolled_back(&self, key: &ResourceKey, cause: &LensError) {
        self.publish(RotateEvent::RolledBack {
            key: key.clone(),
            reason: cause.to_string(),
            cancelled: cause.is_cancelled(),
        });
    }

    fn publish(&self, event: RotateEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
