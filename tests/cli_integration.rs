//! CLI integration tests for Convoy.
//!
//! These tests run the `convoy` binary against project graphs laid out in
//! temporary directories. Dependency checkouts are real git repositories
//! already on their declared branch, so no external tool is started.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use git2::{Repository, Signature};
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the convoy binary command.
fn convoy() -> Command {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.env_remove("CONVOY_CACHE_DIR").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, contents: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("Convoy.toml"), contents).unwrap();
}

/// Initialise a repository with one commit and return its branch name.
fn init_repo(dir: &Path) -> String {
    fs::create_dir_all(dir).unwrap();
    let repo = Repository::init(dir).unwrap();
    let sig = Signature::now("Convoy", "convoy@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();

    let head = repo.head().unwrap();
    head.shorthand().unwrap().to_string()
}

/// App depends on Core; Core is a git checkout on its declared branch.
fn app_with_core(tmp: &TempDir) -> std::path::PathBuf {
    let core = tmp.path().join("Core");
    let branch = init_repo(&core);
    write_config(&core, "name = \"Core\"\n");

    let app = tmp.path().join("App");
    write_config(
        &app,
        &format!(
            "name = \"App\"\n\n[[dependencies]]\ndirectory = \"../Core\"\nbranch = \"{}\"\n",
            branch
        ),
    );
    app
}

// ============================================================================
// Global behavior
// ============================================================================

#[test]
fn test_help_lists_commands() {
    convoy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("checkout"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_missing_config_exit_code() {
    let tmp = TempDir::new().unwrap();

    convoy()
        .arg("status")
        .current_dir(tmp.path())
        .assert()
        .code(3);
}

#[test]
fn test_missing_root_directory_exit_code() {
    let tmp = TempDir::new().unwrap();

    convoy()
        .args(["-C", "nowhere", "clean"])
        .current_dir(tmp.path())
        .assert()
        .code(2);
}

#[test]
fn test_invalid_config_exit_code() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "name = \n");

    convoy()
        .arg("checkout")
        .current_dir(tmp.path())
        .assert()
        .code(4);
}

#[test]
fn test_missing_dependency_checkout() {
    let tmp = TempDir::new().unwrap();
    write_config(
        tmp.path(),
        "name = \"App\"\n\n[[dependencies]]\ndirectory = \"../Gone\"\nbranch = \"main\"\n",
    );

    convoy()
        .arg("checkout")
        .current_dir(tmp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// convoy checkout / clone
// ============================================================================

#[test]
fn test_checkout_already_on_branch() {
    let tmp = TempDir::new().unwrap();
    let app = app_with_core(&tmp);

    convoy()
        .arg("checkout")
        .current_dir(&app)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped"));
}

#[test]
fn test_clone_without_url_fails() {
    let tmp = TempDir::new().unwrap();
    let app = tmp.path().join("App");
    write_config(
        &app,
        "name = \"App\"\n\n[[dependencies]]\ndirectory = \"../Core\"\nbranch = \"main\"\n",
    );

    convoy()
        .arg("clone")
        .current_dir(&app)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no `url`"));
}

// ============================================================================
// convoy update
// ============================================================================

#[test]
fn test_update_without_artifacts() {
    let tmp = TempDir::new().unwrap();
    let app = app_with_core(&tmp);
    let cache = tmp.path().join("cache");

    convoy()
        .arg("update")
        .arg("--cache-dir")
        .arg(&cache)
        .current_dir(&app)
        .assert()
        .code(9)
        .stderr(predicate::str::contains("no package directory"));
}

#[test]
fn test_update_caches_packages() {
    let tmp = TempDir::new().unwrap();
    let app = app_with_core(&tmp);
    let packages = tmp.path().join("Core/packages");
    fs::create_dir_all(&packages).unwrap();
    fs::write(packages.join("Core.1.4.0.nupkg"), "package").unwrap();
    let cache = tmp.path().join("cache");

    convoy()
        .args(["update", "--cache-dir"])
        .arg(&cache)
        .current_dir(&app)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(cache.join("Core.1.4.0.nupkg")).unwrap(),
        "package"
    );
}

#[test]
fn test_update_json_messages() {
    let tmp = TempDir::new().unwrap();
    let app = app_with_core(&tmp);

    convoy()
        .args(["--message-format", "json", "update"])
        .env("CONVOY_CACHE_DIR", tmp.path().join("cache"))
        .current_dir(&app)
        .assert()
        .code(9)
        .stdout(predicate::str::contains("\"reason\":\"finished\""))
        .stdout(predicate::str::contains("\"exit_code\":9"));
}

// ============================================================================
// convoy cache / completions
// ============================================================================

#[test]
fn test_cache_prints_and_creates_directory() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("feed");

    convoy()
        .arg("cache")
        .env("CONVOY_CACHE_DIR", &cache)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("feed"));

    assert!(cache.is_dir());
}

#[test]
fn test_cache_flag_beats_project_config() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "name = \"App\"\n");
    fs::create_dir_all(tmp.path().join(".convoy")).unwrap();
    fs::write(
        tmp.path().join(".convoy/config.toml"),
        format!("[cache]\ndir = {:?}\n", tmp.path().join("configured")),
    )
    .unwrap();

    convoy()
        .arg("cache")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("configured"));

    convoy()
        .arg("cache")
        .arg("--cache-dir")
        .arg(tmp.path().join("flag"))
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("flag"));
}

#[test]
fn test_completions_bash() {
    convoy()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("convoy"));
}
