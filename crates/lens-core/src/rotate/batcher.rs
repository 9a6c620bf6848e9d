use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::config::RotateConfig;
use crate::resource::ResourceKey;

use super::timer::DelayedTask;

/// Receives the resource key and the aggregated magnitude of a batch.
pub type BatchCallback = Arc<dyn Fn(ResourceKey, i32) + Send + Sync>;

/// Tells the batcher a resource is still being worked on, so a due batch
/// must wait instead of firing.
pub type BusyCheck = Arc<dyn Fn(&ResourceKey) -> bool + Send + Sync>;

struct PendingBatch {
    count: u32,
    /// Identifies the timer that owns this batch. A timer whose generation
    /// no longer matches was superseded and must not fire.
    generation: u64,
    timer: DelayedTask,
}

#[derive(Default)]
struct BatchTable {
    batches: HashMap<ResourceKey, PendingBatch>,
    next_generation: u64,
}

impl BatchTable {
    fn next_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }
}

struct Shared {
    window: Duration,
    unit_increment: i32,
    callback: BatchCallback,
    busy: Option<(BusyCheck, Duration)>,
    table: Mutex<BatchTable>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, BatchTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collapses bursts of actions on the same resource into one command.
///
/// Every action restarts that resource's quiescence timer. When the timer
/// finally fires, the callback receives `count * unit_increment`. With a
/// busy check installed, a batch that comes due while its resource is busy
/// keeps its count and is retried until the resource is free.
pub struct ClickBatcher {
    shared: Arc<Shared>,
}

impl ClickBatcher {
    pub fn new(window: Duration, unit_increment: i32, callback: BatchCallback) -> Self {
        Self::build(window, unit_increment, callback, None)
    }

    pub fn from_config(config: &RotateConfig, callback: BatchCallback) -> Self {
        Self::new(config.quiescence(), config.degrees_per_click, callback)
    }

    /// Like [`ClickBatcher::new`], but a due batch is held while `busy`
    /// reports its resource busy, looking again every `retry`.
    pub fn guarded(
        window: Duration,
        unit_increment: i32,
        callback: BatchCallback,
        busy: BusyCheck,
        retry: Duration,
    ) -> Self {
        Self::build(window, unit_increment, callback, Some((busy, retry)))
    }

    fn build(
        window: Duration,
        unit_increment: i32,
        callback: BatchCallback,
        busy: Option<(BusyCheck, Duration)>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                window,
                unit_increment,
                callback,
                busy,
                table: Mutex::new(BatchTable::default()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BatchTable> {
        self.shared.lock()
    }

    /// Count one action for `key` and restart its timer. Returns the count
    /// accumulated so far in this batch.
    pub fn register_action(&self, key: ResourceKey) -> u32 {
        let mut table = self.lock();
        let generation = table.next_generation();

        let previous = table.batches.remove(&key);
        let count = match previous {
            Some(batch) => {
                batch.timer.cancel();
                batch.count + 1
            }
            None => 1,
        };

        let timer = schedule_fire(&self.shared, key.clone(), generation, self.shared.window);
        table.batches.insert(
            key.clone(),
            PendingBatch {
                count,
                generation,
                timer,
            },
        );
        debug!(%key, count, "rotate click registered");
        count
    }

    /// Actions counted for `key` in the batch that has not fired yet.
    pub fn pending_count(&self, key: &ResourceKey) -> u32 {
        self.lock().batches.get(key).map_or(0, |b| b.count)
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().batches.is_empty()
    }

    /// Drop the pending batch for `key` without firing it.
    pub fn reset(&self, key: &ResourceKey) {
        if let Some(batch) = self.lock().batches.remove(key) {
            batch.timer.cancel();
        }
    }

    /// Drop every pending batch without firing.
    pub fn destroy(&self) {
        for (_, batch) in self.lock().batches.drain() {
            batch.timer.cancel();
        }
    }
}

fn schedule_fire(
    shared: &Arc<Shared>,
    key: ResourceKey,
    generation: u64,
    delay: Duration,
) -> DelayedTask {
    let shared = Arc::clone(shared);
    DelayedTask::schedule(delay, move || fire(&shared, key, generation))
}

fn fire(shared: &Arc<Shared>, key: ResourceKey, generation: u64) {
    let count = {
        let mut table = shared.lock();
        match table.batches.get(&key) {
            Some(batch) if batch.generation == generation => {}
            _ => return,
        }

        if let Some((check, retry)) = &shared.busy {
            if check(&key) {
                let next = table.next_generation();
                let timer = schedule_fire(shared, key.clone(), next, *retry);
                if let Some(batch) = table.batches.get_mut(&key) {
                    batch.generation = next;
                    batch.timer = timer;
                    debug!(%key, count = batch.count, "rotate batch held, resource busy");
                }
                return;
            }
        }
        table.batches.remove(&key).map(|b| b.count)
    };

    if let Some(count) = count {
        let magnitude = count as i32 * shared.unit_increment;
        debug!(%key, count, magnitude, "rotate batch fired");
        (shared.callback)(key, magnitude);
    }
}

impl Drop for ClickBatcher {
    fn drop(&mut self) {
        self.destroy();
    }
}
