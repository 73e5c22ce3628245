//! Branch checkout across the dependency graph.

use std::path::Path;
use std::sync::Arc;

use crate::core::{Configuration, Dependency, StatusCode};
use crate::sources::VersionControl;
use crate::util::shell::{Shell, Status};
use crate::visitors::{existing_checkout, Visitor};

/// Checks out each dependency's declared branch, optionally creating it.
pub struct CheckOutBranchVisitor {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
    create: bool,
    return_code: StatusCode,
}

impl CheckOutBranchVisitor {
    pub fn new(vcs: Box<dyn VersionControl>, shell: Arc<Shell>, create: bool) -> Self {
        CheckOutBranchVisitor {
            vcs,
            shell,
            create,
            return_code: StatusCode::Success,
        }
    }

    fn check_out(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = match existing_checkout(&self.shell, directory, dependency) {
            Ok(checkout) => checkout,
            Err(status) => return status,
        };

        self.vcs.set_working_directory(&checkout);
        let branch = dependency.branch();

        if self.vcs.current_branch().as_deref() == Some(branch) {
            self.shell.status(
                Status::Skipped,
                format!("{} (already on `{}`)", checkout.display(), branch),
            );
            return StatusCode::Success;
        }

        self.shell.status(
            Status::CheckingOut,
            format!("`{}` in {}", branch, checkout.display()),
        );
        self.vcs.checkout(branch, self.create)
    }
}

impl Visitor for CheckOutBranchVisitor {
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        self.return_code = self.check_out(directory, dependency);
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
