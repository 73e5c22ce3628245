//! `Convoy.toml` project configuration.
//!
//! A configuration names the project, lists the checkouts it depends on (in
//! traversal order), says how to rebuild it and where its packages land.
//! Configurations are immutable once loaded and shared behind `Rc`.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::core::loader::ConfigLoader;
use crate::core::status::StatusCode;
use crate::util::fs::normalize_path;

/// File name of the per-project configuration.
pub const CONFIG_FILE_NAME: &str = "Convoy.toml";

/// Package output directory used when `[packages]` is omitted.
pub const DEFAULT_PACKAGES_DIR: &str = "packages";

/// Errors from reading a `Convoy.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("directory not found: {}", .dir.display())]
    DirectoryNotFound { dir: PathBuf },

    #[error("no {} found in {}", CONFIG_FILE_NAME, .dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// The status code this error is reported as.
    pub fn status(&self) -> StatusCode {
        match self {
            ConfigError::DirectoryNotFound { .. } => StatusCode::DirectoryNotFound,
            ConfigError::NotFound { .. } => StatusCode::ConfigNotFound,
            ConfigError::Read { .. } | ConfigError::Parse { .. } => StatusCode::ConfigInvalid,
        }
    }
}

/// Parsed contents of a `Convoy.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    name: String,

    #[serde(default)]
    dependencies: Vec<Dependency>,

    #[serde(default)]
    build: Option<BuildInstructions>,

    #[serde(default)]
    packages: PackagesSpec,
}

/// How to rebuild a project from source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildInstructions {
    /// Script path, relative to the project directory
    pub script: PathBuf,

    /// Arguments passed to the script
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Where a project writes its package artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagesSpec {
    /// Output directory, relative to the project directory
    #[serde(default = "default_packages_dir")]
    pub directory: PathBuf,
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PACKAGES_DIR)
}

impl Default for PackagesSpec {
    fn default() -> Self {
        PackagesSpec {
            directory: default_packages_dir(),
        }
    }
}

impl Configuration {
    /// Create a configuration with no dependencies and no build block.
    pub fn new(name: impl Into<String>) -> Self {
        Configuration {
            name: name.into(),
            dependencies: Vec::new(),
            build: None,
            packages: PackagesSpec::default(),
        }
    }

    /// Append a dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Set the build instructions.
    pub fn with_build(mut self, script: impl Into<PathBuf>, arguments: Vec<String>) -> Self {
        self.build = Some(BuildInstructions {
            script: script.into(),
            arguments,
        });
        self
    }

    /// Set the package output directory.
    pub fn with_packages_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.packages.directory = directory.into();
        self
    }

    /// Load the `Convoy.toml` inside `dir`.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        if !dir.is_dir() {
            return Err(ConfigError::DirectoryNotFound {
                dir: dir.to_path_buf(),
            });
        }

        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                dir: dir.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        contents
            .parse()
            .map_err(|source| ConfigError::Parse { path, source })
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared dependencies, in traversal order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Build instructions, if the project can be rebuilt.
    pub fn build(&self) -> Option<&BuildInstructions> {
        self.build.as_ref()
    }

    /// Package output directory, relative to the project.
    pub fn packages_dir(&self) -> &Path {
        &self.packages.directory
    }

    /// Check the project name against a list of names, ignoring ASCII case.
    pub fn name_in(&self, names: &[String]) -> bool {
        names.iter().any(|n| n.eq_ignore_ascii_case(&self.name))
    }
}

impl FromStr for Configuration {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// A declared dependency on another checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    /// Checkout directory, relative to the owning project
    directory: PathBuf,

    /// Branch the checkout should be on
    branch: String,

    /// Remote to clone from when the checkout is missing
    #[serde(default)]
    url: Option<String>,

    #[serde(skip)]
    configuration: OnceCell<Rc<Configuration>>,
}

impl Dependency {
    /// Create a dependency on `directory` tracking `branch`.
    pub fn new(directory: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Dependency {
            directory: directory.into(),
            branch: branch.into(),
            url: None,
            configuration: OnceCell::new(),
        }
    }

    /// Set the clone URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Relative checkout directory as declared.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Declared branch.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Clone URL, if declared.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Normalized absolute directory of this dependency, which is also its
    /// identity in a traversal.
    pub fn resolve_directory(&self, owner_dir: &Path) -> PathBuf {
        normalize_path(&owner_dir.join(&self.directory))
    }

    /// The dependency's own configuration, loaded on first use and cached.
    pub fn configuration(
        &self,
        loader: &dyn ConfigLoader,
        owner_dir: &Path,
    ) -> Result<Rc<Configuration>, StatusCode> {
        if let Some(config) = self.configuration.get() {
            return Ok(Rc::clone(config));
        }

        let outcome = loader.load(&self.resolve_directory(owner_dir));
        outcome.status.into_result()?;
        let config = outcome.configuration.ok_or(StatusCode::ConfigNotFound)?;

        let _ = self.configuration.set(Rc::clone(&config));
        Ok(config)
    }
}
