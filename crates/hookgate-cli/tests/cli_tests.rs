//! End-to-end tests invoking the compiled `hookgate` binary
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use hookgate_test_utils::TestRepo;
use predicates::prelude::*;
use tempfile::TempDir;

fn hookgate(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hookgate").unwrap();
    cmd.current_dir(dir)
        .env_remove("HOOKGATE_TIMEOUT")
        .env_remove("HOOKGATE_SKIP")
        .env_remove("HOOKGATE_FAIL_FAST")
        .env_remove("HOOKGATE_BUILD_TOOL");
    cmd
}

/// A stand-in build tool: answers every `-n` probe with success and runs
/// targets through `body`, a `case "$1"` arm list.
fn fake_build_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-make");
    fs::write(
        &path,
        format!("#!/bin/sh\ncase \"$1\" in\n  -n) exit 0 ;;\n{body}\n  *) exit 0 ;;\nesac\n"),
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_help_mentions_run() {
    Command::cargo_bin("hookgate")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_list_shows_builtin_checks() {
    let temp = TempDir::new().unwrap();
    hookgate(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("go-fmt"))
        .stdout(predicate::str::contains("go-lint"))
        .stdout(predicate::str::contains("go-mod-tidy"));
}

#[test]
fn test_run_outside_repository_fails() {
    let temp = TempDir::new().unwrap();
    hookgate(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not inside a git working tree"));
}

#[test]
fn test_install_status_uninstall() {
    let repo = TestRepo::new();

    hookgate(repo.root())
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed"));
    let hook = fs::read_to_string(repo.root().join(".git/hooks/pre-commit")).unwrap();
    assert!(hook.contains(hookgate_git::HOOK_MARKER));

    hookgate(repo.root())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("pre-commit").and(predicate::str::contains("installed")));

    hookgate(repo.root())
        .arg("uninstall")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!repo.root().join(".git/hooks/pre-commit").exists());
}

#[test]
fn test_install_keeps_foreign_hook() {
    let repo = TestRepo::new();
    let hook_path = repo.root().join(".git/hooks/pre-commit");
    fs::create_dir_all(hook_path.parent().unwrap()).unwrap();
    fs::write(&hook_path, "#!/bin/sh\necho mine\n").unwrap();

    hookgate(repo.root())
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&hook_path).unwrap(), "#!/bin/sh\necho mine\n");

    hookgate(repo.root())
        .args(["install", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced"));
}

#[test]
fn test_run_without_staged_files_skips_everything() {
    let repo = TestRepo::new();

    hookgate(repo.root())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("no matching files"));
}

#[test]
fn test_run_passes_through_build_targets() {
    let repo = TestRepo::new();
    let tool = fake_build_tool(repo.root(), "");
    repo.write("main.go", "package main\n");
    repo.stage(&["main.go"]);

    hookgate(repo.root())
        .arg("run")
        .env("HOOKGATE_BUILD_TOOL", &tool)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 check(s) passed"));
}

#[test]
fn test_run_reports_failing_check() {
    let repo = TestRepo::new();
    let tool = fake_build_tool(
        repo.root(),
        "  lint) echo 'main.go:1:1: exported function lacks comment'; exit 1 ;;",
    );
    repo.write("main.go", "package main\n");
    repo.stage(&["main.go"]);

    hookgate(repo.root())
        .args(["run", "--check", "go-lint"])
        .env("HOOKGATE_BUILD_TOOL", &tool)
        .assert()
        .failure()
        .stdout(predicate::str::contains("go-lint"))
        .stdout(predicate::str::contains("exported function lacks comment"))
        .stdout(predicate::str::contains("1 check(s) failed: go-lint"));
}

#[test]
fn test_run_timeout_flag() {
    let repo = TestRepo::new();
    let tool = fake_build_tool(repo.root(), "  lint) sleep 30 ;;");
    repo.write("main.go", "package main\n");
    repo.stage(&["main.go"]);

    let started = std::time::Instant::now();
    hookgate(repo.root())
        .args(["run", "--check", "go-lint", "--timeout", "1"])
        .env("HOOKGATE_BUILD_TOOL", &tool)
        .assert()
        .failure()
        .stdout(predicate::str::contains("timed out"));
    assert!(started.elapsed() < std::time::Duration::from_secs(15));
}

#[test]
fn test_unknown_check_is_reported() {
    let repo = TestRepo::new();

    hookgate(repo.root())
        .args(["run", "--check", "rust-fmt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown check 'rust-fmt'"));
}
