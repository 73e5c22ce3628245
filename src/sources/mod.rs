//! External collaborators.
//!
//! The artifact cache, the version-control client and the package-manager
//! client. Each client sits behind a trait so visitors receive them by
//! injection and tests can substitute recording doubles.

pub mod cache;
pub mod git;
pub mod package_manager;

pub use cache::ArtifactCache;
pub use git::{GitClient, VersionControl};
pub use package_manager::{NuGetClient, PackageManager};
