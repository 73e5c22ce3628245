//! `convoy update` command
//!
//! Two passes over the same traversal: first every dependency is put on its
//! declared branch, then dependencies are rebuilt and cached and the selected
//! projects are pointed at the fresh packages. The second pass only runs when
//! the first succeeded.

use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, UpdateArgs};
use convoy::util::process::SystemProcessRunner;
use convoy::util::shell::Status;
use convoy::visitors::{BuildAndUpdateDependenciesVisitor, CheckOutBranchVisitor};
use convoy::StatusCode;

pub fn execute(global: &GlobalArgs, args: UpdateArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;
    let mut traversal = session.traversal();

    let status = {
        let _span = session.shell.span(Status::CheckingOut, "dependency branches");
        let mut checkout =
            CheckOutBranchVisitor::new(session.vcs(), Arc::clone(&session.shell), args.create);
        traversal.traverse(&mut checkout, &session.root)
    };
    if !status.is_success() {
        return Ok(session.finish(status));
    }

    traversal.reset();

    let mut visitor = BuildAndUpdateDependenciesVisitor::new(
        Rc::clone(&session.loader),
        Box::new(SystemProcessRunner),
        session.package_manager(),
        session.vcs(),
        session.cache(args.cache.cache_dir.as_deref()),
        Arc::clone(&session.shell),
    )
    .with_settings(session.config.package_settings())
    .with_rebuild(args.rebuild)
    .with_update(args.update);

    let status = {
        let _span = session.shell.span(Status::Building, "dependency packages");
        traversal.traverse(&mut visitor, &session.root)
    };

    for package in visitor.updated_packages() {
        if session.shell.is_json() {
            session.shell.json_event(&serde_json::json!({
                "reason": "package-updated",
                "id": package.id(),
                "version": package.version(),
            }));
        } else {
            session.shell.out_line(package);
        }
    }

    Ok(session.finish(status))
}
