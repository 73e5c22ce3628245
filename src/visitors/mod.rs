//! Visitors driven by the [`Traversal`](crate::traversal::Traversal).
//!
//! A visitor gets two hooks per project: [`Visitor::visit_dependency`] runs
//! in pre-order, before the traversal descends into a dependency, and
//! [`Visitor::visit_project`] runs in post-order, after every dependency of
//! a project has been handled.

use std::path::{Path, PathBuf};

use crate::core::{Configuration, Dependency, StatusCode};
use crate::util::shell::Shell;

pub mod branches;
pub mod build_and_update;
pub mod checkout;
pub mod clean;
pub mod clone;
pub mod named;
pub mod status;

pub use branches::{CreateBranchVisitor, DeleteBranchVisitor, ListBranchesVisitor};
pub use build_and_update::BuildAndUpdateDependenciesVisitor;
pub use checkout::CheckOutBranchVisitor;
pub use clean::CleanVisitor;
pub use clone::CloneRepositoriesVisitor;
pub use named::{DependencyVisit, NamedDependenciesVisitor};
pub use status::DisplayStatusVisitor;

/// Operation applied to each node of a dependency graph.
pub trait Visitor {
    /// Pre-visit hook for `dependency`, declared by the project in
    /// `directory`.
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode;

    /// Post-visit hook for the project in `directory`.
    ///
    /// `configuration` is `None` only when the loader reported success
    /// without a configuration; visitors treat that as nothing to do.
    fn visit_project(
        &mut self,
        directory: &Path,
        configuration: Option<&Configuration>,
    ) -> StatusCode;

    /// The most recent status produced by either hook.
    fn return_code(&self) -> StatusCode;
}

/// Resolve the checkout of `dependency` and require that it exists.
pub(crate) fn existing_checkout(
    shell: &Shell,
    directory: &Path,
    dependency: &Dependency,
) -> Result<PathBuf, StatusCode> {
    let checkout = dependency.resolve_directory(directory);
    if checkout.is_dir() {
        Ok(checkout)
    } else {
        tracing::error!("checkout not found: {}", checkout.display());
        shell.error(format!(
            "dependency checkout `{}` does not exist",
            checkout.display()
        ));
        Err(StatusCode::DirectoryNotFound)
    }
}
