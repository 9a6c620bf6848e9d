use std::time::Duration;

use tokio::task::JoinHandle;

/// A closure scheduled to run once after a delay, cancellable until it runs.
///
/// Must be created from within a tokio runtime. Dropping the handle does not
/// cancel the task; call [`DelayedTask::cancel`].
#[derive(Debug)]
pub struct DelayedTask {
    handle: JoinHandle<()>,
}

impl DelayedTask {
    pub fn schedule<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });
        Self { handle }
    }

    /// Stop the task if it has not fired yet. Has no effect once the
    /// closure has started.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
