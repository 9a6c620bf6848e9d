use thiserror::Error;

use crate::resource::ResourceKey;
use crate::rotate::backend::BackendOp;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("{op} failed for {key}: {reason}")]
    Backend {
        op: BackendOp,
        key: ResourceKey,
        reason: String,
    },

    #[error("No backup found for {0}")]
    BackupMissing(ResourceKey),

    #[error("Unsupported rotation angle: {0} (must be a multiple of 90)")]
    InvalidAngle(i32),

    #[error("Rotation already in progress for {0}")]
    ConcurrencyConflict(ResourceKey),

    #[error("Rotation cancelled for {0}")]
    Cancelled(ResourceKey),

    #[error("Restore failed for {key}, file may be inconsistent: {reason}")]
    RestoreFailed { key: ResourceKey, reason: String },

    #[error("Display error: {0}")]
    Display(String),
}

impl LensError {
    pub fn backend(op: BackendOp, key: &ResourceKey, reason: impl ToString) -> Self {
        Self::Backend {
            op,
            key: key.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, LensError>;
