//! Version-control client.
//!
//! [`GitClient`] runs mutating commands (`checkout`, `add`, `commit`, ...)
//! through the `git` executable so hooks and user configuration apply, and
//! answers read-only questions (current branch, branch lists) and clones
//! through libgit2.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use git2::{BranchType, Repository};
use tempfile::NamedTempFile;

use crate::core::StatusCode;
use crate::util::process::{ProcessBuilder, ProcessRunner};
use crate::util::shell::{Shell, Status};

/// Operations Convoy needs from a version-control system.
///
/// Every command runs in the current working directory, set with
/// [`VersionControl::set_working_directory`].
pub trait VersionControl {
    fn set_working_directory(&mut self, directory: &Path);

    /// Switch to `branch`, creating it first when `create` is set and it
    /// does not exist yet.
    fn checkout(&self, branch: &str, create: bool) -> StatusCode;

    fn create_branch(&self, branch: &str) -> StatusCode;

    /// Clone `url` into `directory` with `branch` checked out.
    fn clone_repository(&self, url: &str, directory: &Path, branch: &str) -> StatusCode;

    /// Stage `paths`.
    fn add(&self, paths: &[PathBuf]) -> StatusCode;

    /// Print the working tree status.
    fn status(&self) -> StatusCode;

    /// Remove untracked and ignored files.
    fn clean(&self) -> StatusCode;

    fn delete_branch(&self, branch: &str, force: bool) -> StatusCode;

    /// Print local and remote-tracking branches.
    fn list_all_branches(&self) -> StatusCode;

    /// Print branches already merged into HEAD.
    fn list_merged_branches(&self) -> StatusCode;

    fn current_branch(&self) -> Option<String>;

    /// Commit staged changes with `message`.
    fn commit(&self, message: &str) -> StatusCode;
}

/// [`VersionControl`] backed by git.
pub struct GitClient {
    program: PathBuf,
    directory: PathBuf,
    runner: Box<dyn ProcessRunner>,
    shell: Arc<Shell>,
    message_dir: Option<PathBuf>,
}

impl GitClient {
    pub fn new(program: impl Into<PathBuf>, runner: Box<dyn ProcessRunner>, shell: Arc<Shell>) -> Self {
        GitClient {
            program: program.into(),
            directory: PathBuf::from("."),
            runner,
            shell,
            message_dir: None,
        }
    }

    /// Write commit message files into `dir` instead of the system temp dir.
    pub fn with_message_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.message_dir = Some(dir.into());
        self
    }

    fn run<I, S>(&self, args: I) -> StatusCode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let cmd = ProcessBuilder::new(&self.program)
            .args(args)
            .cwd(&self.directory);

        match self.runner.run(&cmd) {
            Ok(0) => StatusCode::Success,
            Ok(code) => {
                tracing::error!("`{}` exited with code {}", cmd.display_command(), code);
                self.shell.error(format!(
                    "`{}` failed in {} (exit code {})",
                    cmd.display_command(),
                    self.directory.display(),
                    code
                ));
                StatusCode::VcsFailed
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                self.shell.error(format!("{:#}", e));
                StatusCode::VcsFailed
            }
        }
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.directory)
            .with_context(|| format!("failed to open git repository: {}", self.directory.display()))
    }

    fn has_local_branch(&self, branch: &str) -> bool {
        self.open()
            .map(|repo| repo.find_branch(branch, BranchType::Local).is_ok())
            .unwrap_or(false)
    }

    /// Branch names in the working directory.
    ///
    /// With `merged_only`, only local branches whose tip is reachable from
    /// HEAD are returned; otherwise local and remote-tracking branches.
    pub fn branch_names(&self, merged_only: bool) -> Result<Vec<String>> {
        let repo = self.open()?;
        let filter = if merged_only {
            Some(BranchType::Local)
        } else {
            None
        };
        let head = if merged_only {
            Some(repo.head()?.peel_to_commit()?.id())
        } else {
            None
        };

        let mut names = Vec::new();
        for entry in repo.branches(filter)? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };

            if let Some(head) = head {
                let Some(tip) = branch.get().target() else {
                    continue;
                };
                if tip != head && !repo.graph_descendant_of(head, tip)? {
                    continue;
                }
            }

            names.push(name.to_string());
        }

        names.sort();
        Ok(names)
    }

    fn print_branches(&self, merged_only: bool) -> StatusCode {
        match self.branch_names(merged_only) {
            Ok(names) => {
                let current = self.current_branch();
                for name in names {
                    let marker = if current.as_deref() == Some(name.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    self.shell.out_line(format!("  {} {}", marker, name));
                }
                StatusCode::Success
            }
            Err(e) => {
                self.shell.error(format!("{:#}", e));
                StatusCode::VcsFailed
            }
        }
    }

    fn message_file(&self, message: &str) -> Result<NamedTempFile> {
        let mut file = match &self.message_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .context("failed to create commit message file")?;

        file.write_all(message.as_bytes())
            .context("failed to write commit message")?;
        file.flush().context("failed to write commit message")?;
        Ok(file)
    }
}

impl VersionControl for GitClient {
    fn set_working_directory(&mut self, directory: &Path) {
        self.directory = directory.to_path_buf();
    }

    fn checkout(&self, branch: &str, create: bool) -> StatusCode {
        if create && !self.has_local_branch(branch) {
            self.run(["checkout", "-b", branch])
        } else {
            self.run(["checkout", branch])
        }
    }

    fn create_branch(&self, branch: &str) -> StatusCode {
        self.run(["branch", branch])
    }

    fn clone_repository(&self, url: &str, directory: &Path, branch: &str) -> StatusCode {
        tracing::info!("cloning {} ({}) into {}", url, branch, directory.display());

        if let Some(parent) = directory.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                self.shell
                    .error(format!("failed to create {}: {}", parent.display(), e));
                return StatusCode::DirectoryNotFound;
            }
        }

        match git2::build::RepoBuilder::new()
            .branch(branch)
            .clone(url, directory)
        {
            Ok(_) => StatusCode::Success,
            Err(e) => {
                tracing::error!("clone of {} failed: {}", url, e);
                self.shell.error(format!("failed to clone {}: {}", url, e));
                StatusCode::VcsFailed
            }
        }
    }

    fn add(&self, paths: &[PathBuf]) -> StatusCode {
        if paths.is_empty() {
            return StatusCode::Success;
        }
        let mut args = vec!["add".into(), "--".into()];
        args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
        self.run(args)
    }

    fn status(&self) -> StatusCode {
        self.run(["status", "--short", "--branch"])
    }

    fn clean(&self) -> StatusCode {
        self.run(["clean", "-fdx"])
    }

    fn delete_branch(&self, branch: &str, force: bool) -> StatusCode {
        let flag = if force { "-D" } else { "-d" };
        self.run(["branch", flag, branch])
    }

    fn list_all_branches(&self) -> StatusCode {
        self.print_branches(false)
    }

    fn list_merged_branches(&self) -> StatusCode {
        self.print_branches(true)
    }

    fn current_branch(&self) -> Option<String> {
        let repo = Repository::open(&self.directory).ok()?;
        let head = repo.head().ok()?;
        head.shorthand().map(str::to_string)
    }

    fn commit(&self, message: &str) -> StatusCode {
        let file = match self.message_file(message) {
            Ok(file) => file,
            Err(e) => {
                self.shell.error(format!("{:#}", e));
                return StatusCode::VcsFailed;
            }
        };

        let status = self.run([
            std::ffi::OsStr::new("commit"),
            std::ffi::OsStr::new("-F"),
            file.path().as_os_str(),
        ]);
        if status.is_success() {
            self.shell
                .status(Status::Committed, self.directory.display());
        }
        status
    }
}
