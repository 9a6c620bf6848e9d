use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Identifier of the image a gesture or mutation targets.
///
/// Built from the filesystem it holds the canonical path, so two spellings of
/// the same file map to the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(PathBuf);

impl ResourceKey {
    /// Wrap a path as-is, without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Canonicalize an existing file path into a key.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self(std::fs::canonicalize(path)?))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for ResourceKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
