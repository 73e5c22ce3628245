//! Subprocess execution.
//!
//! [`ProcessBuilder`] describes a command. A [`ProcessRunner`] starts it and
//! hands back a [`ProcessHandle`] whose `wait` blocks until the process exits.
//! There is no timeout: a hung child blocks the caller until it is killed out
//! of band.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Start the command with inherited stdio.
    pub fn spawn(&self) -> Result<Child> {
        self.build_command()
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.display_command()))
    }

    /// Display the command for messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// A started process.
pub trait ProcessHandle {
    /// Block until the process exits and return its exit code.
    ///
    /// A process killed by a signal reports `-1`.
    fn wait(&mut self) -> Result<i32>;
}

/// Starts external processes.
pub trait ProcessRunner {
    /// Start `command`; the returned handle is waited on by the caller.
    fn start(&self, command: &ProcessBuilder) -> Result<Box<dyn ProcessHandle>>;

    /// Start `command` and block until it exits.
    fn run(&self, command: &ProcessBuilder) -> Result<i32> {
        self.start(command)?.wait()
    }
}

/// Runs processes on the host, sharing the parent's stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

struct ChildHandle {
    child: Child,
    command: String,
}

impl ProcessHandle for ChildHandle {
    fn wait(&mut self) -> Result<i32> {
        let status = self
            .child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.command))?;
        Ok(status.code().unwrap_or(-1))
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn start(&self, command: &ProcessBuilder) -> Result<Box<dyn ProcessHandle>> {
        tracing::info!("running `{}`", command.display_command());
        let child = command.spawn()?;
        Ok(Box::new(ChildHandle {
            child,
            command: command.display_command(),
        }))
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a configured tool to a program path.
///
/// Falls back to the name itself so the spawn error names the missing tool.
pub fn resolve_tool(name: &str) -> PathBuf {
    find_executable(name).unwrap_or_else(|| PathBuf::from(name))
}
