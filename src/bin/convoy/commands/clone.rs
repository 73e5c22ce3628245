//! `convoy clone` command
//!
//! Clones missing dependency checkouts. The traversal descends into each
//! fresh clone, so transitive dependencies are cloned in the same pass.

use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::GlobalArgs;
use convoy::util::shell::Status;
use convoy::visitors::CloneRepositoriesVisitor;
use convoy::StatusCode;

pub fn execute(global: &GlobalArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = CloneRepositoriesVisitor::new(session.vcs(), Arc::clone(&session.shell));
    let status = session.run(&mut visitor);

    if status.is_success() {
        session.shell.status(
            Status::Finished,
            format!("{} repositories cloned", visitor.cloned().len()),
        );
    }
    Ok(status)
}
