//! `convoy branch` commands

use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{BranchCreateArgs, BranchDeleteArgs, BranchListArgs, GlobalArgs};
use convoy::util::shell::Status;
use convoy::visitors::{CreateBranchVisitor, DeleteBranchVisitor, ListBranchesVisitor};
use convoy::StatusCode;

pub fn create(global: &GlobalArgs, args: BranchCreateArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = CreateBranchVisitor::new(
        session.vcs(),
        Arc::clone(&session.shell),
        args.branch,
        args.names,
        Rc::clone(&session.loader),
    );
    let status = session.run(&mut visitor);

    if status.is_success() {
        session.shell.status(
            Status::Finished,
            format!("branch created in {} repositories", visitor.body().created().len()),
        );
    }
    Ok(status)
}

pub fn delete(global: &GlobalArgs, args: BranchDeleteArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = DeleteBranchVisitor::new(
        session.vcs(),
        Arc::clone(&session.shell),
        args.branch,
        args.force,
        args.names,
        Rc::clone(&session.loader),
    );
    let status = session.run(&mut visitor);

    if status.is_success() {
        session.shell.status(
            Status::Finished,
            format!("branch deleted in {} repositories", visitor.body().deleted().len()),
        );
    }
    Ok(status)
}

pub fn list(global: &GlobalArgs, args: BranchListArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = ListBranchesVisitor::new(session.vcs(), Arc::clone(&session.shell), args.merged);
    Ok(session.run(&mut visitor))
}
