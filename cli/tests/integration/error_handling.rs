//! Error handling integration tests for cpb CLI.
//!
//! These tests verify proper error handling behaviors:
//! - Source validation
//! - Files cannot overwrite directories (prevents data loss)
//! - Error-on-conflict mode works correctly
//! - Exit codes

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_missing_source_fails() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg(fx.src.path().join("nope.bin"))
        .arg(fx.dst.path().join("nope.bin"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Source does not exist"));
}

#[test]
fn test_missing_destination_operand() {
    let fx = TestFixture::new();
    let src = fx.create_file("lonely.bin", 1);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg(&src)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Missing destination operand"));
}

#[test]
fn test_directory_source_rejected() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg(fx.src.path())
        .arg(fx.dst.path().join("copy"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Source is a directory"));
}

#[test]
fn test_multiple_sources_require_directory() {
    let fx = TestFixture::new();
    let sources = fx.create_files(2, 4);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.args(&sources)
        .arg(fx.dst.path().join("not-a-dir"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_target_directory_must_exist() {
    let fx = TestFixture::new();
    let src = fx.create_file("a.bin", 4);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-t")
        .arg(fx.dst.path().join("missing"))
        .arg(&src)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Target is not a directory"));
}

/// Overwriting a directory with a file must fail and leave the directory intact.
#[test]
fn test_overwrite_directory_with_file_fails() {
    let fx = TestFixture::new();
    let src = fx.create_file("testdir", 12);

    fs::create_dir(fx.dst.path().join("testdir")).unwrap();
    fs::write(fx.dst.path().join("testdir/inside.txt"), "inside content").unwrap();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-c")
        .arg("overwrite")
        .arg("-t")
        .arg(fx.dst.path())
        .arg(&src)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Destination is a directory"));

    assert!(fx.dst.path().join("testdir").is_dir());
    assert_eq!(
        fs::read_to_string(fx.dst.path().join("testdir/inside.txt")).unwrap(),
        "inside content"
    );
}

#[test]
fn test_error_on_conflict() {
    let fx = TestFixture::new();
    let src = fx.create_file("clash.bin", 32);
    let dst = fx.dst.path().join("clash.bin");
    fs::write(&dst, "existing").unwrap();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-c")
        .arg("error")
        .arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Destination already exists"));

    assert_eq!(fs::read_to_string(&dst).unwrap(), "existing");
}

#[test]
fn test_failed_copy_still_closes_progress_line() {
    let fx = TestFixture::new();
    let src = fx.create_file("clash.bin", 32);
    let dst = fx.dst.path().join("clash.bin");
    fs::write(&dst, "existing").unwrap();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-c")
        .arg("error")
        .arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[ done ]"));
}

#[test]
fn test_invalid_display_mode() {
    let fx = TestFixture::new();
    let src = fx.create_file("x.bin", 1);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("--display")
        .arg("sparkles")
        .arg(&src)
        .arg(fx.dst.path())
        .assert()
        .failure()
        .code(2);
}
