//! Convoy - build orchestration across interdependent checkouts
//!
//! This crate provides the library side of Convoy: the project
//! configuration model, the dependency-graph traversal and the visitors
//! that check out, rebuild, update, inspect and clean each project.

pub mod core;
pub mod sources;
pub mod traversal;
pub mod util;
pub mod visitors;

/// Test utilities and mocks for Convoy unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides recording implementations of the process
/// runner, version control and package manager collaborators.
#[cfg(test)]
pub mod test_support;

pub use core::{Configuration, Dependency, StatusCode};
pub use traversal::Traversal;
pub use util::context::GlobalContext;
pub use visitors::Visitor;
