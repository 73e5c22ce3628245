//! Local artifact cache.
//!
//! A per-user directory that collects the packages built by dependencies and
//! serves as the package source when dependents are updated. Separate Convoy
//! runs share it without locking.

use std::path::PathBuf;

use crate::core::StatusCode;
use crate::util::context::project_dirs;
use crate::util::fs::ensure_dir;

/// Subdirectory of the per-user data directory holding cached packages.
pub const CACHE_SUBDIR: &str = "packages";

/// Resolves and creates the artifact cache directory.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCache {
    /// Use this directory instead of the per-user default
    override_dir: Option<PathBuf>,
}

impl ArtifactCache {
    /// Create a cache, optionally pinned to a specific directory.
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        ArtifactCache { override_dir }
    }

    /// The per-user default location, if the platform has a data directory.
    pub fn default_location() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_local_dir().join(CACHE_SUBDIR))
    }

    /// Return the cache directory, creating it if needed.
    ///
    /// Safe to call repeatedly; the same path comes back each time.
    pub fn resolve(&self) -> Result<PathBuf, StatusCode> {
        let dir = match &self.override_dir {
            Some(dir) => dir.clone(),
            None => Self::default_location().ok_or_else(|| {
                tracing::error!("no per-user data directory available for the artifact cache");
                StatusCode::CacheUnavailable
            })?,
        };

        ensure_dir(&dir).map_err(|e| {
            tracing::error!("{:#}", e);
            StatusCode::CacheUnavailable
        })?;

        if !dir.is_dir() {
            tracing::error!("artifact cache {} is not a directory", dir.display());
            return Err(StatusCode::CacheUnavailable);
        }

        Ok(dir)
    }
}
