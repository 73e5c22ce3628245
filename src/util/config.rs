//! Tool configuration for Convoy.
//!
//! Convoy reads two optional configuration files:
//! - Global: `<user config dir>/convoy/config.toml` - user-wide defaults
//! - Project: `.convoy/config.toml` next to the root `Convoy.toml`
//!
//! Project config takes precedence over global config. These files tune the
//! tool itself; the dependency graph lives in each project's `Convoy.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default glob for package files inside a package output directory.
pub const DEFAULT_PACKAGE_PATTERN: &str = "*.nupkg";

/// Default glob for solution files, relative to a project.
pub const DEFAULT_SOLUTION_PATTERN: &str = "**/*.sln";

/// Convoy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact cache settings
    pub cache: CacheConfig,

    /// External tool settings
    pub tools: ToolsConfig,

    /// Package discovery settings
    pub packages: PackagesConfig,
}

/// Artifact cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Use this directory instead of the per-user data directory
    pub dir: Option<PathBuf>,
}

/// External tool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Git executable (default: `git`)
    pub git: Option<String>,

    /// Package manager executable (default: `nuget`)
    pub package_manager: Option<String>,
}

/// Package discovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Glob for package files in a package output directory
    pub package_pattern: Option<String>,

    /// Glob for solution files under a project
    pub solution_pattern: Option<String>,

    /// Globs for files staged after package references are updated
    pub stage_patterns: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.cache.dir.is_some() {
            self.cache.dir = other.cache.dir;
        }

        if other.tools.git.is_some() {
            self.tools.git = other.tools.git;
        }
        if other.tools.package_manager.is_some() {
            self.tools.package_manager = other.tools.package_manager;
        }

        if other.packages.package_pattern.is_some() {
            self.packages.package_pattern = other.packages.package_pattern;
        }
        if other.packages.solution_pattern.is_some() {
            self.packages.solution_pattern = other.packages.solution_pattern;
        }
        if other.packages.stage_patterns.is_some() {
            self.packages.stage_patterns = other.packages.stage_patterns;
        }
    }

    pub fn git_program(&self) -> &str {
        self.tools.git.as_deref().unwrap_or("git")
    }

    pub fn package_manager_program(&self) -> &str {
        self.tools.package_manager.as_deref().unwrap_or("nuget")
    }

    /// Effective package discovery settings.
    pub fn package_settings(&self) -> PackageSettings {
        let defaults = PackageSettings::default();
        PackageSettings {
            package_pattern: self
                .packages
                .package_pattern
                .clone()
                .unwrap_or(defaults.package_pattern),
            solution_pattern: self
                .packages
                .solution_pattern
                .clone()
                .unwrap_or(defaults.solution_pattern),
            stage_patterns: self
                .packages
                .stage_patterns
                .clone()
                .unwrap_or(defaults.stage_patterns),
        }
    }
}

/// Resolved package discovery settings handed to visitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSettings {
    pub package_pattern: String,
    pub solution_pattern: String,
    pub stage_patterns: Vec<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        PackageSettings {
            package_pattern: DEFAULT_PACKAGE_PATTERN.to_string(),
            solution_pattern: DEFAULT_SOLUTION_PATTERN.to_string(),
            stage_patterns: vec![
                "**/*.csproj".to_string(),
                "**/packages.config".to_string(),
                "**/*.sln".to_string(),
            ],
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.convoy/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
