//! Rebuilding dependencies and propagating their packages into dependents.
//!
//! The pre-visit hook runs for every dependency before the traversal
//! descends into it: it optionally rebuilds the dependency with its build
//! script and then copies whatever packages the dependency has produced into
//! the artifact cache. The post-visit hook runs once all of a project's
//! dependencies are done: for projects selected for update it restores every
//! solution, points each solution at the cached packages of the project's
//! direct dependencies, and commits the changed project files.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::core::{ConfigLoader, Configuration, Dependency, PackageRef, StatusCode};
use crate::sources::{ArtifactCache, PackageManager, VersionControl};
use crate::util::config::PackageSettings;
use crate::util::fs::{copy_into, files_matching, glob_files, relative_path};
use crate::util::process::{ProcessBuilder, ProcessRunner};
use crate::util::shell::{Shell, Status};
use crate::visitors::Visitor;

/// First line of the commit created after updating package references.
pub const COMMIT_HEADER: &str = "Update dependency packages";

/// Environment variable naming the artifact cache for build scripts.
pub const PACKAGE_SOURCE_ENV: &str = "CONVOY_PACKAGE_SOURCE";

/// Packages a solution was updated to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SolutionUpdate {
    solution: PathBuf,
    packages: Vec<PackageRef>,
}

/// Rebuilds selected dependencies, caches their packages and updates the
/// package references of selected projects.
pub struct BuildAndUpdateDependenciesVisitor {
    loader: Rc<dyn ConfigLoader>,
    runner: Box<dyn ProcessRunner>,
    package_manager: Box<dyn PackageManager>,
    vcs: Box<dyn VersionControl>,
    cache: ArtifactCache,
    shell: Arc<Shell>,
    settings: PackageSettings,
    rebuild: Vec<String>,
    update: Vec<String>,
    updated: BTreeSet<PackageRef>,
    return_code: StatusCode,
}

impl BuildAndUpdateDependenciesVisitor {
    pub fn new(
        loader: Rc<dyn ConfigLoader>,
        runner: Box<dyn ProcessRunner>,
        package_manager: Box<dyn PackageManager>,
        vcs: Box<dyn VersionControl>,
        cache: ArtifactCache,
        shell: Arc<Shell>,
    ) -> Self {
        BuildAndUpdateDependenciesVisitor {
            loader,
            runner,
            package_manager,
            vcs,
            cache,
            shell,
            settings: PackageSettings::default(),
            rebuild: Vec::new(),
            update: Vec::new(),
            updated: BTreeSet::new(),
            return_code: StatusCode::Success,
        }
    }

    pub fn with_settings(mut self, settings: PackageSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Names of the projects to rebuild from source.
    pub fn with_rebuild(mut self, names: Vec<String>) -> Self {
        self.rebuild = names;
        self
    }

    /// Names of the projects whose package references are updated.
    pub fn with_update(mut self, names: Vec<String>) -> Self {
        self.update = names;
        self
    }

    /// Every package a solution was updated to during this pass.
    pub fn updated_packages(&self) -> &BTreeSet<PackageRef> {
        &self.updated
    }

    // ------------------------------------------------------------------
    // Pre-visit: build and cache
    // ------------------------------------------------------------------

    fn build_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let config = match dependency.configuration(self.loader.as_ref(), directory) {
            Ok(config) => config,
            Err(status) => return status,
        };

        let cache_dir = match self.resolve_cache() {
            Ok(dir) => dir,
            Err(status) => return status,
        };

        let checkout = dependency.resolve_directory(directory);

        let build_status = if config.name_in(&self.rebuild) {
            self.run_build(&checkout, &config, &cache_dir)
        } else {
            StatusCode::Success
        };

        match self.cache_artifacts(&checkout, &config, &cache_dir) {
            StatusCode::ArtifactsNotFound => StatusCode::ArtifactsNotFound,
            _ if !build_status.is_success() => build_status,
            copy_status => copy_status,
        }
    }

    fn resolve_cache(&self) -> Result<PathBuf, StatusCode> {
        self.cache.resolve().inspect_err(|_| {
            self.shell
                .error("the artifact cache directory could not be created");
        })
    }

    fn run_build(&self, checkout: &Path, config: &Configuration, cache_dir: &Path) -> StatusCode {
        let Some(build) = config.build() else {
            self.shell.warn(format!(
                "`{}` has no [build] section; using its existing packages",
                config.name()
            ));
            return StatusCode::Success;
        };

        let cmd = ProcessBuilder::new(checkout.join(&build.script))
            .args(&build.arguments)
            .cwd(checkout)
            .env(PACKAGE_SOURCE_ENV, cache_dir.to_string_lossy());

        self.shell.status(Status::Building, config.name());

        match self.runner.run(&cmd) {
            Ok(0) => {
                self.shell
                    .status(Status::Finished, format!("build of `{}`", config.name()));
                StatusCode::Success
            }
            Ok(code) => {
                tracing::error!("`{}` exited with code {}", cmd.display_command(), code);
                self.shell.error(format!(
                    "build of `{}` failed (exit code {})",
                    config.name(),
                    code
                ));
                StatusCode::BuildFailed
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                self.shell
                    .error(format!("build of `{}` failed: {:#}", config.name(), e));
                StatusCode::BuildFailed
            }
        }
    }

    fn cache_artifacts(&self, checkout: &Path, config: &Configuration, cache_dir: &Path) -> StatusCode {
        let packages_dir = checkout.join(config.packages_dir());
        if !packages_dir.is_dir() {
            tracing::error!("missing package directory {}", packages_dir.display());
            self.shell.error(format!(
                "`{}` has no package directory at {}",
                config.name(),
                packages_dir.display()
            ));
            return StatusCode::ArtifactsNotFound;
        }

        let copied = files_matching(&packages_dir, &self.settings.package_pattern).and_then(|files| {
            let progress = self
                .shell
                .progress(files.len() as u64, format!("caching {}", config.name()));
            let copied = files
                .iter()
                .map(|file| {
                    progress.inc(1);
                    copy_into(file, cache_dir)
                })
                .collect::<anyhow::Result<Vec<_>>>();
            progress.finish();
            copied
        });

        match copied {
            Ok(files) => {
                self.shell.status(
                    Status::Copying,
                    format!("{} package(s) of `{}` to the cache", files.len(), config.name()),
                );
                StatusCode::Success
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                self.shell.error(format!(
                    "failed to cache packages of `{}`: {:#}",
                    config.name(),
                    e
                ));
                StatusCode::ArtifactCopyFailed
            }
        }
    }

    // ------------------------------------------------------------------
    // Post-visit: update and commit
    // ------------------------------------------------------------------

    fn update_project(&mut self, directory: &Path, config: &Configuration) -> StatusCode {
        if !config.name_in(&self.update) {
            tracing::debug!("`{}` is not selected for update", config.name());
            return StatusCode::Success;
        }

        match self.try_update_project(directory, config) {
            Ok(status) | Err(status) => status,
        }
    }

    fn try_update_project(
        &mut self,
        directory: &Path,
        config: &Configuration,
    ) -> Result<StatusCode, StatusCode> {
        if !directory.is_dir() {
            self.shell
                .error(format!("project directory `{}` does not exist", directory.display()));
            return Err(StatusCode::DirectoryNotFound);
        }

        let cache_dir = self.resolve_cache()?;
        let solutions = self.find_solutions(directory)?;
        if solutions.is_empty() {
            self.shell
                .warn(format!("no solutions found under {}", directory.display()));
        }

        self.package_manager.set_working_directory(directory);
        for solution in &solutions {
            self.shell.status(
                Status::Restoring,
                relative_path(directory, solution).display(),
            );
            self.package_manager.restore(solution).into_result()?;
        }

        let mut updates = Vec::new();
        for solution in &solutions {
            let packages = self.update_solution(directory, config, solution, &cache_dir)?;
            updates.push(SolutionUpdate {
                solution: relative_path(directory, solution),
                packages,
            });
        }

        if updates.iter().all(|u| u.packages.is_empty()) {
            self.shell.note(format!(
                "no dependency packages to update in `{}`; nothing to commit",
                config.name()
            ));
            return Ok(StatusCode::Success);
        }

        self.commit(directory, &commit_message(&updates))?;
        Ok(StatusCode::Success)
    }

    fn find_solutions(&self, directory: &Path) -> Result<Vec<PathBuf>, StatusCode> {
        glob_files(directory, std::slice::from_ref(&self.settings.solution_pattern)).map_err(|e| {
            tracing::error!("{:#}", e);
            self.shell.error(format!("{:#}", e));
            StatusCode::Unknown
        })
    }

    /// Point `solution` at the packages of every direct dependency.
    fn update_solution(
        &mut self,
        directory: &Path,
        config: &Configuration,
        solution: &Path,
        cache_dir: &Path,
    ) -> Result<Vec<PackageRef>, StatusCode> {
        let mut packages = Vec::new();

        for dependency in config.dependencies() {
            let dep_config = dependency.configuration(self.loader.as_ref(), directory)?;
            let packages_dir = dependency
                .resolve_directory(directory)
                .join(dep_config.packages_dir());

            for package in self.scan_packages(&packages_dir) {
                self.shell.status(
                    Status::Updated,
                    format!("{} in {}", package, relative_path(directory, solution).display()),
                );
                self.package_manager
                    .update(solution, package.id(), package.version(), cache_dir)
                    .into_result()?;
                self.updated.insert(package.clone());
                packages.push(package);
            }
        }

        Ok(packages)
    }

    fn scan_packages(&self, packages_dir: &Path) -> Vec<PackageRef> {
        if !packages_dir.is_dir() {
            self.shell.warn(format!(
                "package directory {} does not exist; skipping",
                packages_dir.display()
            ));
            return Vec::new();
        }

        let files = match files_matching(packages_dir, &self.settings.package_pattern) {
            Ok(files) => files,
            Err(e) => {
                self.shell.warn(format!("{:#}", e));
                return Vec::new();
            }
        };

        files
            .iter()
            .filter_map(|file| {
                let package = PackageRef::from_path(file);
                if package.is_none() {
                    tracing::debug!("ignoring unversioned package file {}", file.display());
                }
                package
            })
            .collect()
    }

    fn commit(&mut self, directory: &Path, message: &str) -> Result<(), StatusCode> {
        let staged = glob_files(directory, &self.settings.stage_patterns).map_err(|e| {
            tracing::error!("{:#}", e);
            self.shell.error(format!("{:#}", e));
            StatusCode::VcsFailed
        })?;

        self.vcs.set_working_directory(directory);
        self.vcs.add(&staged).into_result()?;
        self.vcs.status().into_result()?;
        self.vcs.commit(message).into_result()
    }
}

/// Build the commit message listing every solution and the packages it was
/// updated to.
fn commit_message(updates: &[SolutionUpdate]) -> String {
    let mut message = format!("{}\n", COMMIT_HEADER);

    for update in updates {
        let _ = write!(message, "\n{}\n", update.solution.display());
        for package in &update.packages {
            let _ = writeln!(message, "* {}", package);
        }
    }

    message
}

impl Visitor for BuildAndUpdateDependenciesVisitor {
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        self.return_code = self.build_dependency(directory, dependency);
        self.return_code
    }

    fn visit_project(
        &mut self,
        directory: &Path,
        configuration: Option<&Configuration>,
    ) -> StatusCode {
        self.return_code = match configuration {
            Some(config) => self.update_project(directory, config),
            None => StatusCode::Success,
        };
        self.return_code
    }

    fn return_code(&self) -> StatusCode {
        self.return_code
    }
}
