//! Cloning missing dependency checkouts.

use std::path::Path;
use std::sync::Arc;

use crate::core::{Configuration, Dependency, StatusCode};
use crate::sources::VersionControl;
use crate::util::shell::{Shell, Status};
use crate::visitors::Visitor;

/// Clones each missing dependency from its `url` before the traversal
/// descends into it. Existing checkouts are left alone.
pub struct CloneRepositoriesVisitor {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
    cloned: Vec<String>,
    return_code: StatusCode,
}

impl CloneRepositoriesVisitor {
    pub fn new(vcs: Box<dyn VersionControl>, shell: Arc<Shell>) -> Self {
        CloneRepositoriesVisitor {
            vcs,
            shell,
            cloned: Vec::new(),
            return_code: StatusCode::Success,
        }
    }

    /// URLs cloned during the pass, in order.
    pub fn cloned(&self) -> &[String] {
        &self.cloned
    }

    fn clone_missing(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = dependency.resolve_directory(directory);
        if checkout.is_dir() {
            tracing::debug!("{} already exists", checkout.display());
            return StatusCode::Success;
        }

        let Some(url) = dependency.url() else {
            tracing::error!("{} is missing and has no url", checkout.display());
            self.shell.error(format!(
                "dependency checkout `{}` does not exist and declares no `url` to clone from",
                checkout.display()
            ));
            return StatusCode::DirectoryNotFound;
        };

        self.shell.status(
            Status::Cloning,
            format!("{} ({}) into {}", url, dependency.branch(), checkout.display()),
        );
        let status = self
            .vcs
            .clone_repository(url, &checkout, dependency.branch());
        if status.is_success() {
            self.cloned.push(url.to_string());
        }
        status
    }
}

impl Visitor for CloneRepositoriesVisitor {
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        self.return_code = self.clone_missing(directory, dependency);
        self.return_code
    }

    fn visit_project(&mut self, _directory: &Path, _configuration: Option<&Configuration>) -> StatusCode {
        self.return_code = StatusCode::Success;
        self.return_code
    }

    fn return_code(&self) -> StatusCode {
        self.return_code
    }
}
