//! `convoy cache` command

use anyhow::Result;

use super::Session;
use crate::cli::{CacheArgs, GlobalArgs};
use convoy::StatusCode;

pub fn execute(global: &GlobalArgs, args: CacheArgs) -> Result<StatusCode> {
    let session = Session::new(global)?;

    let dir = match session.cache(args.cache.cache_dir.as_deref()).resolve() {
        Ok(dir) => dir,
        Err(status) => {
            session
                .shell
                .error("the artifact cache directory could not be created");
            return Ok(session.finish(status));
        }
    };

    if session.shell.is_json() {
        session.shell.json_event(&serde_json::json!({
            "reason": "cache",
            "directory": dir,
        }));
    } else {
        session.shell.out_line(dir.display());
    }

    Ok(StatusCode::Success)
}
