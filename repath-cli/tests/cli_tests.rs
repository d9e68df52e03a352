use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulk file rename/move tool"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repath"));
}

#[test]
fn test_dryrun_leaves_the_filesystem_untouched() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir.child("a.txt").write_str("a").unwrap();
    temp_dir.child("b.txt").write_str("b").unwrap();

    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.current_dir(temp_dir.path())
        .args(["a.txt", "b.txt", "a1.txt", "b1.txt", "--dryrun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt -> a1.txt"));

    temp_dir.child("a.txt").assert(predicate::path::exists());
    temp_dir.child("a1.txt").assert(predicate::path::missing());
}

#[test]
fn test_yes_flag_executes_without_prompting() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir.child("a.txt").write_str("a").unwrap();

    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.current_dir(temp_dir.path())
        .args(["a.txt", "a1.txt", "-y"])
        .assert()
        .success();

    temp_dir.child("a.txt").assert(predicate::path::missing());
    temp_dir.child("a1.txt").assert(predicate::path::exists());
}

#[test]
fn test_missing_original_without_a_skip_control_fails() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.current_dir(temp_dir.path())
        .args(["ghost.txt", "ghost1.txt", "-y"])
        .assert()
        .failure();
}

#[test]
fn test_skip_missing_control_drops_the_pair() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir.child("a.txt").write_str("a").unwrap();

    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.current_dir(temp_dir.path())
        .args([
            "a.txt",
            "ghost.txt",
            "a1.txt",
            "ghost1.txt",
            "--skip",
            "missing",
            "-y",
        ])
        .assert()
        .success();

    temp_dir.child("a1.txt").assert(predicate::path::exists());
    temp_dir.child("ghost1.txt").assert(predicate::path::missing());
}

#[test]
fn test_rename_hook_transforms_every_original() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir.child("foo.rs").write_str("fn main() {}").unwrap();

    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.current_dir(temp_dir.path())
        .args(["foo.rs", "--rename", "s/foo/bar/", "-y"])
        .assert()
        .success();

    temp_dir.child("bar.rs").assert(predicate::path::exists());
}

#[test]
fn test_conflicting_source_flags_are_rejected() {
    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.args(["--stdin", "--clipboard"]).assert().failure();
}

#[test]
fn test_log_file_records_completed_renames() {
    let temp_dir = TempDir::new().unwrap();
    temp_dir.child("a.txt").write_str("a").unwrap();

    let mut cmd = Command::cargo_bin("repath").unwrap();
    cmd.current_dir(temp_dir.path())
        .args(["a.txt", "a1.txt", "-y"])
        .assert()
        .success();

    let log = std::fs::read_to_string(temp_dir.path().join(".repath").join("log")).unwrap();
    assert!(log.contains("a.txt -> a1.txt"));
}
