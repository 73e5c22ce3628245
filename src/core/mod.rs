//! Core data structures for Convoy.
//!
//! This module contains the foundational types used throughout Convoy:
//! - Status codes shared by every component
//! - Project configuration and dependencies
//! - The configuration loader boundary
//! - Package file references

pub mod config;
pub mod loader;
pub mod package_ref;
pub mod status;

pub use config::{BuildInstructions, ConfigError, Configuration, Dependency, CONFIG_FILE_NAME};
pub use loader::{ConfigLoader, LoadOutcome, TomlConfigLoader};
pub use package_ref::PackageRef;
pub use status::StatusCode;
