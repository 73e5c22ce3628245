//! Depth-first traversal of the project dependency graph.
//!
//! The walk loads a project's configuration, then for each declared
//! dependency (in order) calls the visitor's pre-visit hook and descends into
//! it, and finally calls the post-visit hook for the project itself. Each
//! directory is visited at most once per pass, which makes cycles and shared
//! (diamond) dependencies safe. The first non-success status from the loader
//! or from either hook ends the whole pass.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::core::{ConfigLoader, StatusCode};
use crate::util::fs::normalize_path;
use crate::visitors::Visitor;

/// A reusable graph walker.
///
/// The visited set persists across calls to [`Traversal::traverse`]. Call
/// [`Traversal::reset`] before starting an independent pass; otherwise the
/// new pass sees every directory as already visited and does nothing.
pub struct Traversal {
    loader: Rc<dyn ConfigLoader>,
    visited: HashSet<PathBuf>,
}

impl Traversal {
    pub fn new(loader: Rc<dyn ConfigLoader>) -> Self {
        Traversal {
            loader,
            visited: HashSet::new(),
        }
    }

    /// Walk the graph rooted at `root`, driving `visitor`.
    ///
    /// Returns the first failing status, or the visitor's return code when
    /// the whole graph was processed.
    pub fn traverse(&mut self, visitor: &mut dyn Visitor, root: &Path) -> StatusCode {
        self.visited.insert(normalize_path(root));

        match self.walk(visitor, root) {
            Ok(()) => visitor.return_code(),
            Err(status) => status,
        }
    }

    /// Forget every visited directory.
    pub fn reset(&mut self) {
        self.visited.clear();
    }

    /// Directories visited since the last reset.
    pub fn visited(&self) -> &HashSet<PathBuf> {
        &self.visited
    }

    fn walk(&mut self, visitor: &mut dyn Visitor, directory: &Path) -> Result<(), StatusCode> {
        let outcome = self.loader.load(directory);
        outcome.status.into_result()?;
        let directory = outcome.directory;

        if let Some(config) = &outcome.configuration {
            for dependency in config.dependencies() {
                let dep_dir = dependency.resolve_directory(&directory);

                if !self.visited.insert(dep_dir.clone()) {
                    tracing::debug!("already visited {}", dep_dir.display());
                    continue;
                }

                visitor
                    .visit_dependency(&directory, dependency)
                    .into_result()?;
                self.walk(visitor, &dep_dir)?;
            }
        }

        visitor
            .visit_project(&directory, outcome.configuration.as_deref())
            .into_result()
    }
}
