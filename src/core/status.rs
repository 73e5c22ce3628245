//! Status codes returned by every Convoy operation.
//!
//! Components never hand errors to each other. Each operation reports a
//! [`StatusCode`], and the traversal stops at the first one that is not
//! [`StatusCode::Success`].

use std::fmt;

/// Outcome of a traversal, visitor hook or collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusCode {
    /// The operation completed.
    #[default]
    Success,

    /// A project or dependency directory does not exist.
    DirectoryNotFound,

    /// The directory exists but has no `Convoy.toml`.
    ConfigNotFound,

    /// `Convoy.toml` could not be read or parsed.
    ConfigInvalid,

    /// A build script exited with a non-zero code or could not be started.
    BuildFailed,

    /// A version-control command failed.
    VcsFailed,

    /// A package-manager command failed.
    PackageManagerFailed,

    /// The artifact cache directory could not be resolved or created.
    CacheUnavailable,

    /// A dependency has no package output directory.
    ArtifactsNotFound,

    /// Copying package files into the cache failed.
    ArtifactCopyFailed,

    /// Anything not covered above.
    Unknown,
}

impl StatusCode {
    /// Whether this is [`StatusCode::Success`].
    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }

    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            StatusCode::Success => 0,
            StatusCode::Unknown => 1,
            StatusCode::DirectoryNotFound => 2,
            StatusCode::ConfigNotFound => 3,
            StatusCode::ConfigInvalid => 4,
            StatusCode::BuildFailed => 5,
            StatusCode::VcsFailed => 6,
            StatusCode::PackageManagerFailed => 7,
            StatusCode::CacheUnavailable => 8,
            StatusCode::ArtifactsNotFound => 9,
            StatusCode::ArtifactCopyFailed => 10,
        }
    }

    /// Convert into a `Result`, so callers can use `?` between steps.
    pub fn into_result(self) -> Result<(), StatusCode> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusCode::Success => "success",
            StatusCode::DirectoryNotFound => "directory not found",
            StatusCode::ConfigNotFound => "configuration not found",
            StatusCode::ConfigInvalid => "configuration could not be parsed",
            StatusCode::BuildFailed => "build failed",
            StatusCode::VcsFailed => "version control command failed",
            StatusCode::PackageManagerFailed => "package manager command failed",
            StatusCode::CacheUnavailable => "artifact cache unavailable",
            StatusCode::ArtifactsNotFound => "package artifacts not found",
            StatusCode::ArtifactCopyFailed => "failed to copy package artifacts",
            StatusCode::Unknown => "unknown error",
        };
        f.write_str(text)
    }
}

impl From<Result<(), StatusCode>> for StatusCode {
    fn from(result: Result<(), StatusCode>) -> Self {
        match result {
            Ok(()) => StatusCode::Success,
            Err(status) => status,
        }
    }
}
