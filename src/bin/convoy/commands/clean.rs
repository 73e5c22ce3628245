//! `convoy clean` command

use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{CleanArgs, GlobalArgs};
use convoy::visitors::CleanVisitor;
use convoy::StatusCode;

pub fn execute(global: &GlobalArgs, args: CleanArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = CleanVisitor::new(
        session.vcs(),
        Arc::clone(&session.shell),
        args.names,
        Rc::clone(&session.loader),
    );
    Ok(session.run(&mut visitor))
}
