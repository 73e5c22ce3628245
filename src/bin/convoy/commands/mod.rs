//! Command implementations

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalArgs, MessageFormat};
use convoy::core::{ConfigLoader, StatusCode, TomlConfigLoader};
use convoy::sources::{ArtifactCache, GitClient, NuGetClient, PackageManager, VersionControl};
use convoy::traversal::Traversal;
use convoy::util::process::{resolve_tool, SystemProcessRunner};
use convoy::util::{Config, GlobalContext, Shell};
use convoy::visitors::Visitor;

pub mod branch;
pub mod cache;
pub mod checkout;
pub mod clean;
pub mod clone;
pub mod completions;
pub mod status;
pub mod update;

/// Everything a command needs to drive a traversal.
pub struct Session {
    pub shell: Arc<Shell>,
    pub root: PathBuf,
    pub config: Config,
    pub loader: Rc<dyn ConfigLoader>,
}

impl Session {
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let ctx = GlobalContext::new()?;
        let root = ctx.root_dir(global.directory.as_deref());
        let config = ctx.load_config(&root);

        let shell = Arc::new(Shell::from_flags(
            global.quiet,
            global.verbose,
            global.color,
            global.message_format == MessageFormat::Json,
        ));

        tracing::debug!("root project: {}", root.display());

        Ok(Session {
            shell,
            root,
            config,
            loader: Rc::new(TomlConfigLoader::new()),
        })
    }

    pub fn vcs(&self) -> Box<dyn VersionControl> {
        Box::new(GitClient::new(
            resolve_tool(self.config.git_program()),
            Box::new(SystemProcessRunner),
            Arc::clone(&self.shell),
        ))
    }

    pub fn package_manager(&self) -> Box<dyn PackageManager> {
        Box::new(NuGetClient::new(
            resolve_tool(self.config.package_manager_program()),
            Box::new(SystemProcessRunner),
            Arc::clone(&self.shell),
        ))
    }

    /// The artifact cache; a command-line directory beats the config file.
    pub fn cache(&self, cli_dir: Option<&Path>) -> ArtifactCache {
        let dir = cli_dir
            .map(Path::to_path_buf)
            .or_else(|| self.config.cache.dir.clone());
        ArtifactCache::new(dir)
    }

    pub fn traversal(&self) -> Traversal {
        Traversal::new(Rc::clone(&self.loader))
    }

    /// Run one pass of `visitor` over the graph.
    pub fn run(&self, visitor: &mut dyn Visitor) -> StatusCode {
        self.finish(self.traversal().traverse(visitor, &self.root))
    }

    /// Report the final status of a command.
    pub fn finish(&self, status: StatusCode) -> StatusCode {
        if self.shell.is_json() {
            self.shell.json_event(&serde_json::json!({
                "reason": "finished",
                "status": status.to_string(),
                "exit_code": status.exit_code(),
            }));
        } else if !status.is_success() {
            tracing::debug!("finished with {}", status);
        }
        status
    }
}
