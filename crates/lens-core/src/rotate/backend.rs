use std::fmt;
use std::future::Future;

use crate::error::Result;
use crate::resource::ResourceKey;

/// The four calls the rotate pipeline makes against an image store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendOp {
    CreateBackup,
    Mutate,
    RestoreFromBackup,
    CleanupBackup,
}

impl fmt::Display for BackendOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateBackup => write!(f, "Backup"),
            Self::Mutate => write!(f, "Rotate"),
            Self::RestoreFromBackup => write!(f, "Restore"),
            Self::CleanupBackup => write!(f, "Backup cleanup"),
        }
    }
}

/// Storage that can back up, rotate in place, and roll back an image.
///
/// Every call is a suspension point of the rotate pipeline. A call that has
/// been issued always runs to completion; cancellation is only observed
/// between calls.
pub trait ImageBackend: Send + Sync + 'static {
    /// Snapshot the resource. Must finish before `mutate` is issued.
    fn create_backup(&self, key: &ResourceKey) -> impl Future<Output = Result<()>> + Send;

    /// Rotate the resource in place by `angle` degrees clockwise. Not
    /// idempotent.
    fn mutate(&self, key: &ResourceKey, angle: i32) -> impl Future<Output = Result<()>> + Send;

    /// Put the snapshot back. Fails unrecoverably if the snapshot is gone.
    fn restore_from_backup(&self, key: &ResourceKey) -> impl Future<Output = Result<()>> + Send;

    /// Remove the snapshot. Failures are logged by the caller, never fatal.
    fn cleanup_backup(&self, key: &ResourceKey) -> impl Future<Output = Result<()>> + Send;
}
