//! Global context for Convoy operations.
//!
//! Provides centralized access to the working directory, configuration
//! paths and the effective tool configuration.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::core::config::CONFIG_FILE_NAME;
use crate::util::config::{load_config, Config};

/// Project directories for Convoy
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "convoy", "convoy"));

/// Per-user Convoy directories, if the platform defines them.
pub fn project_dirs() -> Option<&'static ProjectDirs> {
    PROJECT_DIRS.as_ref()
}

/// Directory holding project-local tool configuration.
pub const PROJECT_CONFIG_DIR: &str = ".convoy";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config.toml
    config_home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let config_home = match project_dirs() {
            Some(dirs) => dirs.config_dir().to_path_buf(),
            None => cwd.join(PROJECT_CONFIG_DIR),
        };

        GlobalContext { cwd, config_home }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.config_home.join("config.toml")
    }

    /// Get the project configuration file path for a root project.
    pub fn project_config_path(&self, root: &Path) -> PathBuf {
        root.join(PROJECT_CONFIG_DIR).join("config.toml")
    }

    /// Load the merged global and project configuration for `root`.
    pub fn load_config(&self, root: &Path) -> Config {
        load_config(&self.config_path(), &self.project_config_path(root))
    }

    /// Resolve the root project directory.
    ///
    /// An explicit directory is taken relative to cwd. Otherwise the nearest
    /// ancestor of cwd holding a `Convoy.toml` is used, falling back to cwd
    /// so the loader reports the missing configuration.
    pub fn root_dir(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit {
            return self.cwd.join(dir);
        }

        self.cwd
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
            .unwrap_or(&self.cwd)
            .to_path_buf()
    }
}
