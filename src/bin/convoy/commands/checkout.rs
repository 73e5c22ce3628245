//! `convoy checkout` command

use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{CheckoutArgs, GlobalArgs};
use convoy::visitors::CheckOutBranchVisitor;
use convoy::StatusCode;

pub fn execute(global: &GlobalArgs, args: CheckoutArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = CheckOutBranchVisitor::new(session.vcs(), Arc::clone(&session.shell), args.create);
    Ok(session.run(&mut visitor))
}
