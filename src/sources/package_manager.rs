//! Package-manager client.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::StatusCode;
use crate::util::process::{ProcessBuilder, ProcessRunner};
use crate::util::shell::Shell;

/// Operations Convoy needs from a package manager.
pub trait PackageManager {
    fn set_working_directory(&mut self, directory: &Path);

    /// Restore the package references of `solution`.
    fn restore(&self, solution: &Path) -> StatusCode;

    /// Pin package `id` in `solution` to `version`, taken from `source`.
    fn update(&self, solution: &Path, id: &str, version: &str, source: &Path) -> StatusCode;
}

/// [`PackageManager`] backed by the `nuget` command line.
pub struct NuGetClient {
    program: PathBuf,
    directory: PathBuf,
    runner: Box<dyn ProcessRunner>,
    shell: Arc<Shell>,
}

impl NuGetClient {
    pub fn new(program: impl Into<PathBuf>, runner: Box<dyn ProcessRunner>, shell: Arc<Shell>) -> Self {
        NuGetClient {
            program: program.into(),
            directory: PathBuf::from("."),
            runner,
            shell,
        }
    }

    fn run(&self, cmd: ProcessBuilder) -> StatusCode {
        let cmd = cmd.cwd(&self.directory);
        match self.runner.run(&cmd) {
            Ok(0) => StatusCode::Success,
            Ok(code) => {
                tracing::error!("`{}` exited with code {}", cmd.display_command(), code);
                self.shell.error(format!(
                    "`{}` failed (exit code {})",
                    cmd.display_command(),
                    code
                ));
                StatusCode::PackageManagerFailed
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                self.shell.error(format!("{:#}", e));
                StatusCode::PackageManagerFailed
            }
        }
    }
}

impl PackageManager for NuGetClient {
    fn set_working_directory(&mut self, directory: &Path) {
        self.directory = directory.to_path_buf();
    }

    fn restore(&self, solution: &Path) -> StatusCode {
        self.run(
            ProcessBuilder::new(&self.program)
                .arg("restore")
                .arg(solution)
                .arg("-NonInteractive"),
        )
    }

    fn update(&self, solution: &Path, id: &str, version: &str, source: &Path) -> StatusCode {
        self.run(
            ProcessBuilder::new(&self.program)
                .arg("update")
                .arg(solution)
                .args(["-Id", id, "-Version", version, "-Source"])
                .arg(source)
                .arg("-NonInteractive"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRunner;

    fn client(runner: RecordingRunner) -> NuGetClient {
        let mut nuget = NuGetClient::new("nuget", Box::new(runner), Arc::new(Shell::quiet()));
        nuget.set_working_directory(Path::new("/work/app"));
        nuget
    }

    #[test]
    fn test_update_arguments() {
        let runner = RecordingRunner::new();
        let log = runner.log();
        let nuget = client(runner);

        let status = nuget.update(
            Path::new("/work/app/App.sln"),
            "Core",
            "1.2.3-beta1",
            Path::new("/cache/packages"),
        );
        assert_eq!(status, StatusCode::Success);

        let log = log.borrow();
        assert_eq!(log[0].program, PathBuf::from("nuget"));
        assert_eq!(
            log[0].args,
            vec![
                "update",
                "/work/app/App.sln",
                "-Id",
                "Core",
                "-Version",
                "1.2.3-beta1",
                "-Source",
                "/cache/packages",
                "-NonInteractive"
            ]
        );
        assert_eq!(log[0].cwd.as_deref(), Some(Path::new("/work/app")));
    }

    #[test]
    fn test_restore_failure() {
        let nuget = client(RecordingRunner::new().exit_code(1));
        assert_eq!(
            nuget.restore(Path::new("App.sln")),
            StatusCode::PackageManagerFailed
        );
    }

    #[test]
    fn test_unstartable_program() {
        let nuget = client(RecordingRunner::new().fail_to_start());
        assert_eq!(
            nuget.restore(Path::new("App.sln")),
            StatusCode::PackageManagerFailed
        );
    }
}
