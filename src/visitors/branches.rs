//! Branch maintenance across dependency checkouts.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::core::{ConfigLoader, Configuration, Dependency, StatusCode};
use crate::sources::VersionControl;
use crate::util::shell::{Shell, Status};
use crate::visitors::{existing_checkout, DependencyVisit, NamedDependenciesVisitor, Visitor};

/// Creates a branch in each selected dependency.
pub struct CreateBranch {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
    branch: String,
    created: Vec<PathBuf>,
}

impl CreateBranch {
    /// Checkouts the branch was created in.
    pub fn created(&self) -> &[PathBuf] {
        &self.created
    }
}

impl DependencyVisit for CreateBranch {
    fn on_visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = match existing_checkout(&self.shell, directory, dependency) {
            Ok(checkout) => checkout,
            Err(status) => return status,
        };

        self.vcs.set_working_directory(&checkout);
        let status = self.vcs.create_branch(&self.branch);
        if status.is_success() {
            self.shell.status(
                Status::Created,
                format!("branch `{}` in {}", self.branch, checkout.display()),
            );
            self.created.push(checkout);
        }
        status
    }
}

pub type CreateBranchVisitor = NamedDependenciesVisitor<CreateBranch>;

impl CreateBranchVisitor {
    pub fn new(
        vcs: Box<dyn VersionControl>,
        shell: Arc<Shell>,
        branch: impl Into<String>,
        names: Vec<String>,
        loader: Rc<dyn ConfigLoader>,
    ) -> Self {
        let body = CreateBranch {
            vcs,
            shell,
            branch: branch.into(),
            created: Vec::new(),
        };
        NamedDependenciesVisitor::with_body(body, names, loader)
    }
}

/// Deletes a branch in each selected dependency.
pub struct DeleteBranch {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
    branch: String,
    force: bool,
    deleted: Vec<PathBuf>,
}

impl DeleteBranch {
    /// Checkouts the branch was deleted from.
    pub fn deleted(&self) -> &[PathBuf] {
        &self.deleted
    }
}

impl DependencyVisit for DeleteBranch {
    fn on_visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = match existing_checkout(&self.shell, directory, dependency) {
            Ok(checkout) => checkout,
            Err(status) => return status,
        };

        self.vcs.set_working_directory(&checkout);
        let status = self.vcs.delete_branch(&self.branch, self.force);
        if status.is_success() {
            self.shell.status(
                Status::Removed,
                format!("branch `{}` in {}", self.branch, checkout.display()),
            );
            self.deleted.push(checkout);
        }
        status
    }
}

pub type DeleteBranchVisitor = NamedDependenciesVisitor<DeleteBranch>;

impl DeleteBranchVisitor {
    pub fn new(
        vcs: Box<dyn VersionControl>,
        shell: Arc<Shell>,
        branch: impl Into<String>,
        force: bool,
        names: Vec<String>,
        loader: Rc<dyn ConfigLoader>,
    ) -> Self {
        let body = DeleteBranch {
            vcs,
            shell,
            branch: branch.into(),
            force,
            deleted: Vec::new(),
        };
        NamedDependenciesVisitor::with_body(body, names, loader)
    }
}

/// Lists the local branches of each dependency.
pub struct ListBranchesVisitor {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
    merged_only: bool,
    return_code: StatusCode,
}

impl ListBranchesVisitor {
    pub fn new(vcs: Box<dyn VersionControl>, shell: Arc<Shell>, merged_only: bool) -> Self {
        ListBranchesVisitor {
            vcs,
            shell,
            merged_only,
            return_code: StatusCode::Success,
        }
    }

    fn list(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = match existing_checkout(&self.shell, directory, dependency) {
            Ok(checkout) => checkout,
            Err(status) => return status,
        };

        self.vcs.set_working_directory(&checkout);
        self.shell.out_line(format!("== {}", checkout.display()));

        if self.merged_only {
            self.vcs.list_merged_branches()
        } else {
            self.vcs.list_all_branches()
        }
    }
}

impl Visitor for ListBranchesVisitor {
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        self.return_code = self.list(directory, dependency);
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
