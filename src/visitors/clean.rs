//! Removing untracked files from dependency checkouts.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::core::{ConfigLoader, Dependency, StatusCode};
use crate::sources::VersionControl;
use crate::util::shell::{Shell, Status};
use crate::visitors::{existing_checkout, DependencyVisit, NamedDependenciesVisitor};

/// Runs a VCS clean in each selected dependency checkout.
pub struct CleanDependency {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
}

impl DependencyVisit for CleanDependency {
    fn on_visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = match existing_checkout(&self.shell, directory, dependency) {
            Ok(checkout) => checkout,
            Err(status) => return status,
        };

        self.vcs.set_working_directory(&checkout);
        self.shell
            .status(Status::Cleaning, checkout.display());
        self.vcs.clean()
    }
}

/// Cleans the dependencies named on the command line, or all of them.
pub type CleanVisitor = NamedDependenciesVisitor<CleanDependency>;

impl CleanVisitor {
    pub fn new(
        vcs: Box<dyn VersionControl>,
        shell: Arc<Shell>,
        names: Vec<String>,
        loader: Rc<dyn ConfigLoader>,
    ) -> Self {
        NamedDependenciesVisitor::with_body(CleanDependency { vcs, shell }, names, loader)
    }
}
