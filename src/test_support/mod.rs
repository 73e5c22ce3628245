//! Test doubles and fixtures for Convoy unit tests.
//!
//! Recording implementations of the collaborator traits (process runner,
//! version control, package manager) and a visitor that logs every hook
//! call, plus helpers that lay out project graphs on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! let tmp = TempDir::new().unwrap();
//! write_project(&tmp.path().join("App"), "App", &[("../Core", "main")]);
//! write_project(&tmp.path().join("Core"), "Core", &[]);
//!
//! let mut visitor = RecordingVisitor::new();
//! let mut traversal = Traversal::new(Rc::new(TomlConfigLoader::new()));
//! traversal.traverse(&mut visitor, &tmp.path().join("App"));
//! assert_eq!(visitor.events(), ["dep:Core", "project:Core", "project:App"]);
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::core::{Configuration, Dependency, StatusCode, CONFIG_FILE_NAME};
use crate::sources::{PackageManager, VersionControl};
use crate::util::process::{ProcessBuilder, ProcessHandle, ProcessRunner};
use crate::visitors::Visitor;

// ============================================================================
// Fixtures
// ============================================================================

/// Create `dir` with a `Convoy.toml` naming the project and its dependencies.
pub fn write_project(dir: &Path, name: &str, deps: &[(&str, &str)]) {
    let mut contents = format!("name = \"{}\"\n", name);
    for (directory, branch) in deps {
        contents.push_str(&format!(
            "\n[[dependencies]]\ndirectory = \"{}\"\nbranch = \"{}\"\n",
            directory, branch
        ));
    }
    write_config(dir, &contents);
}

/// Create `dir` with a `Convoy.toml` holding `contents`.
pub fn write_config(dir: &Path, contents: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(CONFIG_FILE_NAME), contents).unwrap();
}

/// Write an empty file, creating parent directories.
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

// ============================================================================
// Process runner
// ============================================================================

/// A process start request seen by [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

type RunHook = Box<dyn FnMut(&Invocation)>;

/// Records every command instead of running it.
pub struct RecordingRunner {
    log: Rc<RefCell<Vec<Invocation>>>,
    exit_code: i32,
    fail_to_start: bool,
    hook: RefCell<Option<RunHook>>,
}

impl RecordingRunner {
    /// A runner whose processes all exit with 0.
    pub fn new() -> Self {
        RecordingRunner {
            log: Rc::new(RefCell::new(Vec::new())),
            exit_code: 0,
            fail_to_start: false,
            hook: RefCell::new(None),
        }
    }

    /// Make every process exit with `code`.
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Make every start fail, as if the program were missing.
    pub fn fail_to_start(mut self) -> Self {
        self.fail_to_start = true;
        self
    }

    /// Call `hook` for every start, before the exit code is reported.
    pub fn on_run(self, hook: impl FnMut(&Invocation) + 'static) -> Self {
        *self.hook.borrow_mut() = Some(Box::new(hook));
        self
    }

    /// Shared handle to the invocation log.
    pub fn log(&self) -> Rc<RefCell<Vec<Invocation>>> {
        Rc::clone(&self.log)
    }
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

struct FinishedProcess(i32);

impl ProcessHandle for FinishedProcess {
    fn wait(&mut self) -> Result<i32> {
        Ok(self.0)
    }
}

impl ProcessRunner for RecordingRunner {
    fn start(&self, command: &ProcessBuilder) -> Result<Box<dyn ProcessHandle>> {
        let invocation = Invocation {
            program: command.get_program().to_path_buf(),
            args: command.get_args().to_vec(),
            cwd: command.get_cwd().map(Path::to_path_buf),
        };
        self.log.borrow_mut().push(invocation.clone());

        if self.fail_to_start {
            bail!("failed to spawn `{}`", command.display_command());
        }

        if let Some(hook) = self.hook.borrow_mut().as_mut() {
            hook(&invocation);
        }

        Ok(Box::new(FinishedProcess(self.exit_code)))
    }
}

// ============================================================================
// Version control and package manager
// ============================================================================

/// A collaborator call: operation name, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Call {
    /// The last component of the working directory, for compact asserts.
    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Shared call log.
pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Records version-control calls; optionally fails one operation.
pub struct RecordingVcs {
    log: CallLog,
    directory: PathBuf,
    fail_op: Option<&'static str>,
    branch: Option<String>,
}

impl RecordingVcs {
    pub fn new() -> Self {
        RecordingVcs {
            log: Rc::new(RefCell::new(Vec::new())),
            directory: PathBuf::from("."),
            fail_op: None,
            branch: None,
        }
    }

    /// Make calls of operation `op` fail with `VcsFailed`.
    pub fn failing(mut self, op: &'static str) -> Self {
        self.fail_op = Some(op);
        self
    }

    /// Report `branch` from `current_branch`.
    pub fn on_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    fn record(&self, op: &str, args: &[&str]) -> StatusCode {
        self.log.borrow_mut().push(Call {
            op: op.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            dir: self.directory.clone(),
        });
        if self.fail_op == Some(op) {
            StatusCode::VcsFailed
        } else {
            StatusCode::Success
        }
    }
}

impl Default for RecordingVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for RecordingVcs {
    fn set_working_directory(&mut self, directory: &Path) {
        self.directory = directory.to_path_buf();
    }

    fn checkout(&self, branch: &str, create: bool) -> StatusCode {
        self.record("checkout", &[branch, if create { "create" } else { "" }])
    }

    fn create_branch(&self, branch: &str) -> StatusCode {
        self.record("create_branch", &[branch])
    }

    fn clone_repository(&self, url: &str, directory: &Path, branch: &str) -> StatusCode {
        let status = self.record("clone", &[url, &directory.to_string_lossy(), branch]);
        if status.is_success() {
            std::fs::create_dir_all(directory).unwrap();
        }
        status
    }

    fn add(&self, paths: &[PathBuf]) -> StatusCode {
        let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        self.record("add", &refs)
    }

    fn status(&self) -> StatusCode {
        self.record("status", &[])
    }

    fn clean(&self) -> StatusCode {
        self.record("clean", &[])
    }

    fn delete_branch(&self, branch: &str, force: bool) -> StatusCode {
        self.record("delete_branch", &[branch, if force { "force" } else { "" }])
    }

    fn list_all_branches(&self) -> StatusCode {
        self.record("list_all_branches", &[])
    }

    fn list_merged_branches(&self) -> StatusCode {
        self.record("list_merged_branches", &[])
    }

    fn current_branch(&self) -> Option<String> {
        self.branch.clone()
    }

    fn commit(&self, message: &str) -> StatusCode {
        self.record("commit", &[message])
    }
}

/// Records package-manager calls; optionally fails one operation.
pub struct RecordingPackageManager {
    log: CallLog,
    directory: PathBuf,
    fail_op: Option<&'static str>,
}

impl RecordingPackageManager {
    pub fn new() -> Self {
        RecordingPackageManager {
            log: Rc::new(RefCell::new(Vec::new())),
            directory: PathBuf::from("."),
            fail_op: None,
        }
    }

    /// Make calls of operation `op` fail with `PackageManagerFailed`.
    pub fn failing(mut self, op: &'static str) -> Self {
        self.fail_op = Some(op);
        self
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    fn record(&self, op: &str, args: Vec<String>) -> StatusCode {
        self.log.borrow_mut().push(Call {
            op: op.to_string(),
            args,
            dir: self.directory.clone(),
        });
        if self.fail_op == Some(op) {
            StatusCode::PackageManagerFailed
        } else {
            StatusCode::Success
        }
    }
}

impl Default for RecordingPackageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for RecordingPackageManager {
    fn set_working_directory(&mut self, directory: &Path) {
        self.directory = directory.to_path_buf();
    }

    fn restore(&self, solution: &Path) -> StatusCode {
        self.record("restore", vec![solution.to_string_lossy().into_owned()])
    }

    fn update(&self, solution: &Path, id: &str, version: &str, source: &Path) -> StatusCode {
        self.record(
            "update",
            vec![
                solution.to_string_lossy().into_owned(),
                id.to_string(),
                version.to_string(),
                source.to_string_lossy().into_owned(),
            ],
        )
    }
}

// ============================================================================
// Visitor
// ============================================================================

/// Logs `dep:<dir name>` and `project:<name>` for every hook call.
#[derive(Debug, Default)]
pub struct RecordingVisitor {
    events: Vec<String>,
    fail_dependency: Option<String>,
    fail_project: Option<String>,
    return_code: StatusCode,
}

impl RecordingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the pre-visit of the dependency whose directory is named `name`.
    pub fn failing_dependency(mut self, name: &str) -> Self {
        self.fail_dependency = Some(name.to_string());
        self
    }

    /// Fail the post-visit of the project named `name`.
    pub fn failing_project(mut self, name: &str) -> Self {
        self.fail_project = Some(name.to_string());
        self
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Visitor for RecordingVisitor {
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let name = dir_name(&dependency.resolve_directory(directory));
        self.events.push(format!("dep:{}", name));
        self.return_code = if self.fail_dependency.as_deref() == Some(name.as_str()) {
            StatusCode::Unknown
        } else {
            StatusCode::Success
        };
        self.return_code
    }

    fn visit_project(
        &mut self,
        _directory: &Path,
        configuration: Option<&Configuration>,
    ) -> StatusCode {
        let name = configuration.map(|c| c.name().to_string()).unwrap_or_default();
        self.events.push(format!("project:{}", name));
        self.return_code = if self.fail_project.as_deref() == Some(name.as_str()) {
            StatusCode::Unknown
        } else {
            StatusCode::Success
        };
        self.return_code
    }

    fn return_code(&self) -> StatusCode {
        self.return_code
    }
}
