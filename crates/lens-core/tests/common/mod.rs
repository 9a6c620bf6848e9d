#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use lens_core::error::{LensError, Result};
use lens_core::rotate::{BackendOp, ImageBackend, ImageDisplay};
use lens_core::viewport::{Size, TransformEngine};
use lens_core::ResourceKey;

/// A recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Backup(ResourceKey),
    Mutate(ResourceKey, i32),
    Restore(ResourceKey),
    Cleanup(ResourceKey),
}

impl Call {
    pub fn op(&self) -> BackendOp {
        match self {
            Call::Backup(_) => BackendOp::CreateBackup,
            Call::Mutate(..) => BackendOp::Mutate,
            Call::Restore(_) => BackendOp::RestoreFromBackup,
            Call::Cleanup(_) => BackendOp::CleanupBackup,
        }
    }
}

/// In-memory backend that records every call.
///
/// Ops listed in `failing` return a backend error. With a gate, `mutate`
/// records itself and then blocks until the gate is notified.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    failing: Vec<BackendOp>,
    mutate_gate: Option<Arc<Notify>>,
    mutate_delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(ops: &[BackendOp]) -> Self {
        Self {
            failing: ops.to_vec(),
            ..Self::default()
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            mutate_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn with_mutate_delay(delay: Duration) -> Self {
        Self {
            mutate_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<BackendOp> {
        self.calls().iter().map(Call::op).collect()
    }

    pub fn count(&self, op: BackendOp) -> usize {
        self.ops().into_iter().filter(|o| *o == op).count()
    }

    pub fn mutate_angles(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Mutate(_, angle) => Some(angle),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn outcome(&self, op: BackendOp, key: &ResourceKey) -> Result<()> {
        if self.failing.contains(&op) {
            return Err(LensError::backend(op, key, "injected failure"));
        }
        Ok(())
    }
}

impl ImageBackend for MockBackend {
    async fn create_backup(&self, key: &ResourceKey) -> Result<()> {
        self.record(Call::Backup(key.clone()));
        self.outcome(BackendOp::CreateBackup, key)
    }

    async fn mutate(&self, key: &ResourceKey, angle: i32) -> Result<()> {
        self.record(Call::Mutate(key.clone(), angle));
        if let Some(gate) = &self.mutate_gate {
            gate.notified().await;
        }
        if let Some(delay) = self.mutate_delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome(BackendOp::Mutate, key)
    }

    async fn restore_from_backup(&self, key: &ResourceKey) -> Result<()> {
        self.record(Call::Restore(key.clone()));
        self.outcome(BackendOp::RestoreFromBackup, key)
    }

    async fn cleanup_backup(&self, key: &ResourceKey) -> Result<()> {
        self.record(Call::Cleanup(key.clone()));
        self.outcome(BackendOp::CleanupBackup, key)
    }
}

/// Display stand-in with a settable current resource.
#[derive(Default)]
pub struct MockDisplay {
    current: Mutex<Option<ResourceKey>>,
    size: Mutex<Size>,
    reloads: Mutex<Vec<(ResourceKey, bool)>>,
}

impl MockDisplay {
    pub fn showing(key: &str, size: Size) -> Self {
        let display = Self::default();
        display.show(Some(ResourceKey::from(key)));
        display.set_size(size);
        display
    }

    pub fn show(&self, key: Option<ResourceKey>) {
        *self.current.lock().unwrap() = key;
    }

    pub fn set_size(&self, size: Size) {
        *self.size.lock().unwrap() = size;
    }

    pub fn reloads(&self) -> Vec<(ResourceKey, bool)> {
        self.reloads.lock().unwrap().clone()
    }
}

impl ImageDisplay for MockDisplay {
    fn current_resource_key(&self) -> Option<ResourceKey> {
        self.current.lock().unwrap().clone()
    }

    fn reload(&self, key: &ResourceKey, bypass_cache: bool) -> Result<Size> {
        self.reloads.lock().unwrap().push((key.clone(), bypass_cache));
        Ok(*self.size.lock().unwrap())
    }
}

/// Engine with a container and content attached, unfitted at scale 1.
pub fn attached_engine(container: Size, content: Size) -> TransformEngine {
    let mut engine = TransformEngine::default();
    engine.set_container_size(container);
    engine.set_content_size(content);
    engine
}

/// Let spawned tasks run without advancing the paused clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
