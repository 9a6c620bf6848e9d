use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{LensError, Result};
use crate::resource::ResourceKey;

/// Proof that a rotation was admitted for a resource. Carries the
/// cancellation token the pipeline checks between steps.
#[derive(Clone, Debug)]
pub struct RotationTicket {
    key: ResourceKey,
    id: u64,
    token: CancellationToken,
}

impl RotationTicket {
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct MutationTask {
    id: u64,
    token: CancellationToken,
    started_at: Instant,
}

#[derive(Default)]
struct Registry {
    in_flight: HashMap<ResourceKey, MutationTask>,
    completed: HashMap<ResourceKey, i32>,
    next_id: u64,
}

/// How a close request was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Nothing was running.
    Idle,
    /// Every rotation finished inside the grace period.
    Drained,
    /// The grace period ran out; these rotations were cancelled.
    ForceCancelled(Vec<ResourceKey>),
}

/// Tracks in-flight rotations and finished-but-not-yet-shown results per
/// resource, and owns cancellation.
#[derive(Default)]
pub struct RotationSafetyManager {
    registry: Mutex<Registry>,
}

impl RotationSafetyManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a rotation for `key`. Only one may be in flight per resource;
    /// the click batcher upstream guarantees that, so a conflict here is a
    /// bug in the caller.
    pub fn begin(&self, key: &ResourceKey) -> Result<RotationTicket> {
        let mut registry = self.lock();
        if registry.in_flight.contains_key(key) {
            error!(%key, "rotation begun while another is in flight");
            return Err(LensError::ConcurrencyConflict(key.clone()));
        }
        let id = registry.next_id;
        registry.next_id += 1;
        let token = CancellationToken::new();
        registry.in_flight.insert(
            key.clone(),
            MutationTask {
                id,
                token: token.clone(),
                started_at: Instant::now(),
            },
        );
        debug!(%key, id, "rotation started");
        Ok(RotationTicket {
            key: key.clone(),
            id,
            token,
        })
    }

    /// Remove the in-flight entry only if it still belongs to `ticket`; a
    /// cancelled ticket may have been replaced by a newer one.
    fn release(registry: &mut Registry, ticket: &RotationTicket) -> Option<Duration> {
        match registry.in_flight.get(&ticket.key) {
            Some(task) if task.id == ticket.id => registry
                .in_flight
                .remove(&ticket.key)
                .map(|t| t.started_at.elapsed()),
            _ => None,
        }
    }

    pub fn complete(&self, ticket: &RotationTicket, angle: i32) {
        let mut registry = self.lock();
        let elapsed = Self::release(&mut registry, ticket);
        registry.completed.insert(ticket.key.clone(), angle);
        info!(key = %ticket.key, angle, ?elapsed, "rotation complete");
    }

    pub fn fail(&self, ticket: &RotationTicket) {
        let mut registry = self.lock();
        let elapsed = Self::release(&mut registry, ticket);
        debug!(key = %ticket.key, ?elapsed, "rotation released after failure");
    }

    /// Signal the in-flight rotation for `key` and forget it. The pipeline
    /// notices at its next checkpoint.
    pub fn cancel(&self, key: &ResourceKey) -> bool {
        match self.lock().in_flight.remove(key) {
            Some(task) => {
                task.token.cancel();
                info!(%key, "rotation cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self
            .lock()
            .in_flight
            .drain()
            .map(|(key, task)| {
                task.token.cancel();
                key
            })
            .collect();
        keys.sort();
        if !keys.is_empty() {
            warn!(count = keys.len(), "cancelled all in-flight rotations");
        }
        keys
    }

    /// With `Some(key)`, whether that resource is rotating; with `None`,
    /// whether anything is.
    pub fn is_in_progress(&self, key: Option<&ResourceKey>) -> bool {
        let registry = self.lock();
        match key {
            Some(key) => registry.in_flight.contains_key(key),
            None => !registry.in_flight.is_empty(),
        }
    }

    pub fn list_in_progress(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self.lock().in_flight.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Consume the finished result for `key`, if any.
    pub fn take_completed(&self, key: &ResourceKey) -> Option<i32> {
        self.lock().completed.remove(key)
    }

    /// Close-request protocol: wait up to `grace` for in-flight rotations,
    /// polling every `poll`, then cancel whatever is left.
    ///
    /// Cancelling cannot undo a backend write that has already been issued.
    pub async fn shutdown(&self, grace: Duration, poll: Duration) -> ShutdownOutcome {
        if !self.is_in_progress(None) {
            return ShutdownOutcome::Idle;
        }
        info!(
            pending = ?self.list_in_progress(),
            ?grace,
            "close requested, waiting for rotations"
        );

        let drained = async {
            while self.is_in_progress(None) {
                tokio::time::sleep(poll).await;
            }
        };

        match tokio::time::timeout(grace, drained).await {
            Ok(()) => ShutdownOutcome::Drained,
            Err(_) => {
                let keys = self.cancel_all();
                warn!(?keys, "grace period elapsed, rotations force-cancelled");
                ShutdownOutcome::ForceCancelled(keys)
            }
        }
    }

    /// Cancel everything and drop unconsumed results.
    pub fn destroy(&self) {
        self.cancel_all();
        self.lock().completed.clear();
    }
}
