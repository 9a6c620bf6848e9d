use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info};

use crate::consts::BACKUP_SUFFIX;
use crate::error::{LensError, Result};
use crate::resource::ResourceKey;

use super::backend::{BackendOp, ImageBackend};

/// Rotates image files in place, keeping a hidden sibling copy as backup.
///
/// `photo.jpg` is backed up to `.photo.jpg.lens-backup` in the same
/// directory, so restoring is a same-filesystem rename.
#[derive(Clone, Debug, Default)]
pub struct FsImageBackend;

impl FsImageBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn backup_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.{BACKUP_SUFFIX}"))
    }

    pub fn has_backup(&self, key: &ResourceKey) -> bool {
        Self::backup_path(key.path()).is_file()
    }

    /// Roll back a backup left behind by a crash or a forced shutdown.
    /// Returns whether anything was restored.
    pub async fn recover(&self, key: &ResourceKey) -> Result<bool> {
        if !self.has_backup(key) {
            return Ok(false);
        }
        self.restore_from_backup(key).await?;
        info!(%key, "recovered orphaned backup");
        Ok(true)
    }
}

/// Number of clockwise quarter turns for `angle`, or an error if it is not
/// a multiple of 90.
pub fn quarter_turns(angle: i32) -> Result<u8> {
    if angle % 90 != 0 {
        return Err(LensError::InvalidAngle(angle));
    }
    Ok((angle.rem_euclid(360) / 90) as u8)
}

fn rotate_image(img: DynamicImage, turns: u8) -> DynamicImage {
    match turns {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    }
}

fn rotate_file(path: &Path, turns: u8) -> Result<()> {
    let img = image::open(path)?;
    rotate_image(img, turns).save(path)?;
    Ok(())
}

impl ImageBackend for FsImageBackend {
    async fn create_backup(&self, key: &ResourceKey) -> Result<()> {
        let backup = Self::backup_path(key.path());
        // An existing backup is the last good copy from an interrupted run.
        match tokio::fs::try_exists(&backup).await {
            Ok(false) => {}
            Ok(true) => {
                return Err(LensError::backend(
                    BackendOp::CreateBackup,
                    key,
                    format!("backup already exists at {}", backup.display()),
                ))
            }
            Err(e) => return Err(LensError::backend(BackendOp::CreateBackup, key, e)),
        }
        // Copy under a temporary name first so an interrupted copy never
        // looks like a valid backup.
        let partial = backup.with_extension(format!("{BACKUP_SUFFIX}.partial"));
        tokio::fs::copy(key.path(), &partial)
            .await
            .map_err(|e| LensError::backend(BackendOp::CreateBackup, key, e))?;
        tokio::fs::rename(&partial, &backup)
            .await
            .map_err(|e| LensError::backend(BackendOp::CreateBackup, key, e))?;
        debug!(%key, backup = %backup.display(), "backup created");
        Ok(())
    }

    async fn mutate(&self, key: &ResourceKey, angle: i32) -> Result<()> {
        let turns = quarter_turns(angle)?;
        if turns == 0 {
            debug!(%key, angle, "full turn, file left untouched");
            return Ok(());
        }
        let path = key.path().to_path_buf();
        tokio::task::spawn_blocking(move || rotate_file(&path, turns))
            .await
            .map_err(|e| LensError::backend(BackendOp::Mutate, key, e))?
            .map_err(|e| LensError::backend(BackendOp::Mutate, key, e))?;
        debug!(%key, angle, "file rotated");
        Ok(())
    }

    async fn restore_from_backup(&self, key: &ResourceKey) -> Result<()> {
        let backup = Self::backup_path(key.path());
        match tokio::fs::try_exists(&backup).await {
            Ok(true) => {}
            Ok(false) => return Err(LensError::BackupMissing(key.clone())),
            Err(e) => return Err(LensError::backend(BackendOp::RestoreFromBackup, key, e)),
        }
        tokio::fs::rename(&backup, key.path())
            .await
            .map_err(|e| LensError::backend(BackendOp::RestoreFromBackup, key, e))?;
        debug!(%key, "restored from backup");
        Ok(())
    }

    async fn cleanup_backup(&self, key: &ResourceKey) -> Result<()> {
        match tokio::fs::remove_file(Self::backup_path(key.path())).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LensError::backend(BackendOp::CleanupBackup, key, e)),
        }
    }
}
