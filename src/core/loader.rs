//! Loading configurations for project directories.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::core::config::Configuration;
use crate::core::status::StatusCode;
use crate::util::fs::normalize_path;

/// Result of loading the configuration of one directory.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The configuration, when one was found
    pub configuration: Option<Rc<Configuration>>,

    /// The normalized directory that was loaded
    pub directory: PathBuf,

    /// Load status
    pub status: StatusCode,
}

impl LoadOutcome {
    /// A successful load.
    pub fn loaded(configuration: Configuration, directory: PathBuf) -> Self {
        LoadOutcome {
            configuration: Some(Rc::new(configuration)),
            directory,
            status: StatusCode::Success,
        }
    }

    /// A failed load.
    pub fn failed(status: StatusCode, directory: PathBuf) -> Self {
        LoadOutcome {
            configuration: None,
            directory,
            status,
        }
    }
}

/// Source of project configurations.
///
/// A loader may report success without a configuration, for example for a
/// bare checkout. Visitors treat that as a project with nothing to do.
pub trait ConfigLoader {
    /// Load the configuration of `directory`.
    fn load(&self, directory: &Path) -> LoadOutcome;
}

/// Loads `Convoy.toml` files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    pub fn new() -> Self {
        TomlConfigLoader
    }
}

impl ConfigLoader for TomlConfigLoader {
    fn load(&self, directory: &Path) -> LoadOutcome {
        let directory = normalize_path(directory);

        match Configuration::load(&directory) {
            Ok(config) => {
                tracing::debug!("loaded `{}` from {}", config.name(), directory.display());
                LoadOutcome::loaded(config, directory)
            }
            Err(e) => {
                tracing::error!("{}", e);
                LoadOutcome::failed(e.status(), directory)
            }
        }
    }
}
