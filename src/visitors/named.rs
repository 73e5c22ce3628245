//! Name filtering for visitors.

use std::path::Path;
use std::rc::Rc;

use crate::core::{ConfigLoader, Configuration, Dependency, StatusCode};
use crate::visitors::Visitor;

/// The work a [`NamedDependenciesVisitor`] applies to selected dependencies.
pub trait DependencyVisit {
    fn on_visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode;

    fn on_visit_project(&mut self, _directory: &Path, _configuration: &Configuration) -> StatusCode {
        StatusCode::Success
    }
}

/// Applies a [`DependencyVisit`] only to dependencies whose project name is
/// on a whitelist.
///
/// An empty whitelist selects every dependency. Otherwise the dependency's
/// configuration is loaded (and cached on the dependency) to read its name,
/// which is compared ASCII case-insensitively. Unselected dependencies are
/// skipped with `Success`.
pub struct NamedDependenciesVisitor<V> {
    body: V,
    names: Vec<String>,
    loader: Rc<dyn ConfigLoader>,
    return_code: StatusCode,
}

impl<V: DependencyVisit> NamedDependenciesVisitor<V> {
    pub fn with_body(body: V, names: Vec<String>, loader: Rc<dyn ConfigLoader>) -> Self {
        NamedDependenciesVisitor {
            body,
            names,
            loader,
            return_code: StatusCode::Success,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn body(&self) -> &V {
        &self.body
    }

    pub fn into_body(self) -> V {
        self.body
    }

    fn is_selected(&self, directory: &Path, dependency: &Dependency) -> Result<bool, StatusCode> {
        if self.names.is_empty() {
            return Ok(true);
        }

        let config = dependency.configuration(self.loader.as_ref(), directory)?;
        Ok(config.name_in(&self.names))
    }
}

impl<V: DependencyVisit> Visitor for NamedDependenciesVisitor<V> {
    fn visit_dependency(&mut self, directory: &Path, dependency: &Dependency) -> StatusCode {
        let status = match self.is_selected(directory, dependency) {
            Ok(true) => self.body.on_visit_dependency(directory, dependency),
            Ok(false) => {
                tracing::debug!(
                    "skipping {}: not in {:?}",
                    dependency.directory().display(),
                    self.names
                );
                StatusCode::Success
            }
            Err(status) => status,
        };

        self.return_code = status;
        status
    }

    fn visit_project(
        &mut self,
        directory: &Path,
        configuration: Option<&Configuration>,
    ) -> StatusCode {
        let status = match configuration {
            Some(config) => self.body.on_visit_project(directory, config),
            None => StatusCode::Success,
        };

        self.return_code = status;
        status
    }

    fn return_code(&self) -> StatusCode {
        self.return_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TomlConfigLoader;
    use crate::test_support::write_project;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Seen {
        dependencies: Vec<String>,
        projects: Vec<String>,
    }

    impl DependencyVisit for Seen {
        fn on_visit_dependency(&mut self, _directory: &Path, dependency: &Dependency) -> StatusCode {
            self.dependencies
                .push(dependency.directory().display().to_string());
            StatusCode::Success
        }

        fn on_visit_project(&mut self, _directory: &Path, configuration: &Configuration) -> StatusCode {
            self.projects.push(configuration.name().to_string());
            StatusCode::Success
        }
    }

    fn setup() -> (TempDir, Configuration) {
        let tmp = TempDir::new().unwrap();
        write_project(&tmp.path().join("Alpha"), "Alpha", &[]);
        write_project(&tmp.path().join("Beta"), "Beta", &[]);
        let app = Configuration::new("App")
            .with_dependency(Dependency::new("Alpha", "main"))
            .with_dependency(Dependency::new("Beta", "main"));
        (tmp, app)
    }

    fn visit_all(visitor: &mut dyn Visitor, root: &Path, app: &Configuration) -> Vec<StatusCode> {
        app.dependencies()
            .iter()
            .map(|dep| visitor.visit_dependency(root, dep))
            .collect()
    }

    #[test]
    fn test_empty_whitelist_selects_everything() {
        let (tmp, app) = setup();
        let mut visitor =
            NamedDependenciesVisitor::with_body(Seen::default(), vec![], Rc::new(TomlConfigLoader));

        visit_all(&mut visitor, tmp.path(), &app);
        assert_eq!(visitor.body().dependencies, ["Alpha", "Beta"]);
    }

    #[test]
    fn test_whitelist_is_case_insensitive() {
        let (tmp, app) = setup();
        let mut visitor = NamedDependenciesVisitor::with_body(
            Seen::default(),
            vec!["BETA".to_string()],
            Rc::new(TomlConfigLoader),
        );

        assert_eq!(visitor.names(), ["BETA"]);
        let statuses = visit_all(&mut visitor, tmp.path(), &app);
        assert!(statuses.iter().all(|s| s.is_success()));
        assert_eq!(visitor.into_body().dependencies, ["Beta"]);
    }

    #[test]
    fn test_filter_load_failure_is_returned() {
        let tmp = TempDir::new().unwrap();
        let mut visitor = NamedDependenciesVisitor::with_body(
            Seen::default(),
            vec!["Core".to_string()],
            Rc::new(TomlConfigLoader),
        );

        let status = visitor.visit_dependency(tmp.path(), &Dependency::new("Core", "main"));
        assert_eq!(status, StatusCode::DirectoryNotFound);
        assert_eq!(visitor.return_code(), StatusCode::DirectoryNotFound);
        assert!(visitor.body().dependencies.is_empty());
    }

    #[test]
    fn test_project_hook_is_not_filtered() {
        let mut visitor = NamedDependenciesVisitor::with_body(
            Seen::default(),
            vec!["Other".to_string()],
            Rc::new(TomlConfigLoader),
        );

        let app = Configuration::new("App");
        assert!(visitor.visit_project(Path::new("."), Some(&app)).is_success());
        assert!(visitor.visit_project(Path::new("."), None).is_success());
        assert_eq!(visitor.body().projects, ["App"]);
    }
}
