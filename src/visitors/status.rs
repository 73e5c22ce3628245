//! Version-control status of dependency checkouts.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::core::{ConfigLoader, Dependency, StatusCode};
use crate::sources::VersionControl;
use crate::util::shell::Shell;
use crate::visitors::{existing_checkout, DependencyVisit, NamedDependenciesVisitor};

/// Prints a header and the VCS status for each selected dependency checkout.
pub struct StatusDependency {
    vcs: Box<dyn VersionControl>,
    shell: Arc<Shell>,
}

impl DependencyVisit for StatusDependency {
    fn on_visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let checkout = match existing_checkout(&self.shell, directory, dependency) {
            Ok(checkout) => checkout,
            Err(status) => return status,
        };

        self.vcs.set_working_directory(&checkout);

        if self.shell.is_json() {
            self.shell.json_event(&serde_json::json!({
                "reason": "dependency-status",
                "directory": checkout,
                "branch": dependency.branch(),
                "current_branch": self.vcs.current_branch(),
            }));
        } else {
            let current = self.vcs.current_branch().unwrap_or_else(|| "?".to_string());
            self.shell.out_line(format!(
                "== {} (on `{}`, expects `{}`)",
                checkout.display(),
                current,
                dependency.branch()
            ));
        }

        self.vcs.status()
    }
}

/// Reports the dependencies named on the command line, or all of them.
pub type DisplayStatusVisitor = NamedDependenciesVisitor<StatusDependency>;

impl DisplayStatusVisitor {
    pub fn new(
        vcs: Box<dyn VersionControl>,
        shell: Arc<Shell>,
        names: Vec<String>,
        loader: Rc<dyn ConfigLoader>,
    ) -> Self {
        NamedDependenciesVisitor::with_body(StatusDependency { vcs, shell }, names, loader)
    }
}
