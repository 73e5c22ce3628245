//! `convoy status` command

use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, StatusArgs};
use convoy::visitors::DisplayStatusVisitor;
use convoy::StatusCode;

pub fn execute(global: &GlobalArgs, args: StatusArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let mut visitor = DisplayStatusVisitor::new(
        session.vcs(),
        Arc::clone(&session.shell),
        args.names,
        Rc::clone(&session.loader),
    );
    Ok(session.run(&mut visitor))
}
