//! End-to-end scenarios for the `micc` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../micc-adapters/templates")
}

/// `micc` running in `cwd`, isolated from the user's preferences.
fn micc(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("micc").unwrap();
    cmd.current_dir(cwd)
        .env("MICC_TEMPLATES_DIR", templates_dir())
        .env("MICC_PREFERENCES", cwd.join("no-preferences.json"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Create `name` in a fresh temporary directory.
fn project(name: &str, extra: &[&str]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    micc(tmp.path())
        .args(["-p", name, "create"])
        .args(extra)
        .assert()
        .success();
    let path = tmp.path().join(name);
    (tmp, path)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

fn pyproject(project: &Path) -> toml::Table {
    read(&project.join("pyproject.toml")).parse().unwrap()
}

fn poetry_str(project: &Path, key: &str) -> String {
    pyproject(project)["tool"]["poetry"][key]
        .as_str()
        .unwrap()
        .to_owned()
}

// ── S1: create ────────────────────────────────────────────────────────────────

#[test]
fn create_module_project() {
    let (_tmp, p) = project("foo-bar", &[]);

    assert!(p.join("foo_bar.py").is_file());
    assert!(!p.join("foo_bar").exists());
    assert_eq!(poetry_str(&p, "name"), "foo-bar");
    assert_eq!(poetry_str(&p, "version"), "0.0.0");
    assert!(read(&p.join("foo_bar.py")).contains("__version__ = \"0.0.0\""));
    assert!(!read(&p.join("micc.log")).is_empty());
    assert!(p.join("micc.json").is_file());
}

#[test]
fn create_package_project() {
    let (_tmp, p) = project("foo-bar", &["--package"]);

    assert!(p.join("foo_bar/__init__.py").is_file());
    assert!(!p.join("foo_bar.py").exists());
    assert!(p.join("AUTHORS.rst").is_file());
    assert!(!read(&p.join("micc.log")).is_empty());
}

#[test]
fn create_with_name_argument() {
    let tmp = TempDir::new().unwrap();
    micc(tmp.path())
        .args(["create", "my-tool", "-l", "BSD", "-d", "Does things."])
        .assert()
        .success()
        .stdout(predicate::str::contains("my-tool"));

    let p = tmp.path().join("my-tool");
    assert!(p.join("my_tool.py").is_file());
    assert_eq!(poetry_str(&p, "description"), "Does things.");
    assert!(read(&p.join("LICENSE")).contains("BSD"));
}

#[test]
fn create_without_license_removes_license_file() {
    let (_tmp, p) = project("closed", &["--lic", "Not"]);
    assert!(!p.join("LICENSE").exists());
}

#[test]
fn create_refuses_invalid_name() {
    let tmp = TempDir::new().unwrap();
    micc(tmp.path())
        .args(["-p", "1st-try", "create"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid project name"));
    assert!(!tmp.path().join("1st-try").join("pyproject.toml").exists());
}

#[test]
fn create_refuses_nesting_by_default() {
    let (_tmp, p) = project("outer", &[]);

    micc(&p)
        .args(["-p", "inner", "create"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("inside an existing project"))
        .stderr(predicate::str::contains("--allow-nesting"));

    micc(&p).args(["-p", "inner", "create", "-n"]).assert().success();
    assert!(p.join("inner/pyproject.toml").is_file());
}

#[test]
fn create_with_missing_template_exits_six() {
    let tmp = TempDir::new().unwrap();
    micc(tmp.path())
        .args(["-p", "foo", "create", "-T", "no-such-template"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Template not found"));
}

// ── S2: version ───────────────────────────────────────────────────────────────

#[test]
fn patch_bump_updates_both_versions() {
    let (_tmp, p) = project("foo-bar", &[]);
    micc(&p).args(["version", "0.3.1"]).assert().success();

    micc(&p).args(["version", "--patch"]).assert().success();

    assert_eq!(poetry_str(&p, "version"), "0.3.2");
    assert!(read(&p.join("foo_bar.py")).contains("__version__ = \"0.3.2\""));
}

#[test]
fn version_without_rule_prints_current() {
    let (_tmp, p) = project("foo-bar", &[]);

    micc(&p)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project foo-bar version 0.0.0"));
    micc(&p)
        .args(["version", "-s"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0.0.0\n"));
}

#[test]
fn dry_run_changes_nothing() {
    let (_tmp, p) = project("foo-bar", &[]);

    micc(&p)
        .args(["version", "--minor", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
    assert_eq!(poetry_str(&p, "version"), "0.0.0");
}

#[test]
fn version_found_from_subdirectory() {
    let (_tmp, p) = project("foo-bar", &["--package"]);
    micc(&p.join("docs"))
        .args(["version", "-s"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0.0.0\n"));
}

// ── S3: add ───────────────────────────────────────────────────────────────────

#[test]
fn add_existing_app_is_refused() {
    let (_tmp, p) = project("foo-bar", &["--package"]);
    micc(&p).args(["add", "greet", "--app"]).assert().success();
    let before = read(&p.join("pyproject.toml"));
    let app_before = read(&p.join("foo_bar/cli_greet.py"));

    micc(&p)
        .args(["add", "greet", "--app"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already an app named greet"));

    assert_eq!(read(&p.join("pyproject.toml")), before);
    assert_eq!(read(&p.join("foo_bar/cli_greet.py")), app_before);
}

#[test]
fn add_app_registers_script() {
    let (_tmp, p) = project("foo-bar", &["--package"]);
    micc(&p).args(["add", "greet", "--app"]).assert().success();

    let manifest = pyproject(&p);
    assert_eq!(
        manifest["tool"]["poetry"]["scripts"]["greet"].as_str(),
        Some("foo_bar:cli_greet.main")
    );
    assert!(read(&p.join("foo_bar/__init__.py")).contains("import foo_bar.cli_greet"));
    assert!(read(&p.join("APPS.rst")).contains(".. click:: foo_bar.cli_greet:main"));
}

#[test]
fn add_needs_exactly_one_kind() {
    let (_tmp, p) = project("foo-bar", &["--package"]);
    micc(&p)
        .args(["add", "thing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("one and only one"));
    micc(&p)
        .args(["add", "thing", "--app", "--py"])
        .assert()
        .code(1);
}

#[test]
fn add_to_module_project_is_refused() {
    let (_tmp, p) = project("foo-bar", &[]);
    micc(&p)
        .args(["add", "utils", "--py"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("convert-to-package"));
    assert!(!p.join("foo_bar").exists());
}

#[test]
fn info_lists_artifacts_at_high_verbosity() {
    let (_tmp, p) = project("foo-bar", &["--package"]);
    micc(&p).args(["add", "greet", "--app"]).assert().success();
    micc(&p).args(["add", "utils", "--py"]).assert().success();

    micc(&p)
        .args(["-vv", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo-bar"))
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("utils"));
    micc(&p)
        .args(["info", "--name"])
        .assert()
        .success()
        .stdout(predicate::str::diff("foo_bar\n"));
}

// ── S4: convert-to-package ────────────────────────────────────────────────────

#[test]
fn convert_refuses_to_overwrite_docs_by_default() {
    let (_tmp, p) = project("foo-bar", &[]);

    micc(&p)
        .arg("convert-to-package")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--overwrite"))
        .stderr(predicate::str::contains("--backup"));

    assert!(p.join("foo_bar.py").is_file());
    assert!(!p.join("foo_bar").exists());
}

#[test]
fn convert_with_overwrite_promotes_module() {
    let (_tmp, p) = project("foo-bar", &[]);

    micc(&p).args(["convert-to-package", "--overwrite"]).assert().success();

    assert!(p.join("foo_bar/__init__.py").is_file());
    assert!(!p.join("foo_bar.py").exists());
    assert!(p.join("AUTHORS.rst").is_file());
    assert!(read(&p.join("docs/index.rst")).contains("authors"));

    micc(&p)
        .arg("convert-to-package")
        .assert()
        .success()
        .stdout(predicate::str::contains("already a package"));
}

#[test]
fn convert_with_backup_keeps_old_index() {
    let (_tmp, p) = project("foo-bar", &[]);
    let old_index = read(&p.join("docs/index.rst"));

    micc(&p).args(["convert-to-package", "--backup"]).assert().success();

    assert_eq!(read(&p.join("docs/index.rst.bak")), old_index);
}

// ── S5: create twice ──────────────────────────────────────────────────────────

#[test]
fn second_create_fails_and_leaves_project_alone() {
    let (tmp, p) = project("foo-bar", &[]);
    let manifest = read(&p.join("pyproject.toml"));
    let log = read(&p.join("micc.log"));

    micc(tmp.path())
        .args(["-p", "foo-bar", "create"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("non-empty directory"));

    assert_eq!(read(&p.join("pyproject.toml")), manifest);
    assert_eq!(read(&p.join("micc.log")), log);
}

// ── S6: ambiguous version arguments ───────────────────────────────────────────

#[test]
fn rule_with_flag_is_ambiguous() {
    let (_tmp, p) = project("foo-bar", &[]);
    let manifest = read(&p.join("pyproject.toml"));

    micc(&p)
        .args(["version", "1.2.3", "--major"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Both a version rule"));

    assert_eq!(read(&p.join("pyproject.toml")), manifest);
}

// ── log file ──────────────────────────────────────────────────────────────────

#[test]
fn errors_are_recorded_in_project_log() {
    let (_tmp, p) = project("foo-bar", &["--package"]);
    micc(&p).args(["add", "greet", "--app"]).assert().success();
    micc(&p).args(["add", "greet", "--app"]).assert().code(1);

    assert!(read(&p.join("micc.log")).contains("already an app named greet"));
}

#[test]
fn clear_log_truncates() {
    let (_tmp, p) = project("foo-bar", &[]);
    assert!(read(&p.join("micc.log")).contains("create"));

    micc(&p).args(["--clear-log", "info"]).assert().success();

    let log = read(&p.join("micc.log"));
    assert!(!log.contains("micc create"));
    assert!(log.contains("micc info"));
}
