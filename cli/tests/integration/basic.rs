//! Basic functionality integration tests for cpb CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_basic_file_copy() {
    let fx = TestFixture::new();
    let src = fx.create_file("test.bin", 4096);
    let dst = fx.dst.path().join("test.bin");

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q").arg(&src).arg(&dst).assert().success();

    fx.assert_same_content(&src, &dst);
}

#[test]
fn test_copy_into_existing_directory() {
    let fx = TestFixture::new();
    let src = fx.create_file("into.bin", 100);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q").arg(&src).arg(fx.dst.path()).assert().success();

    fx.assert_same_content(&src, &fx.dst.path().join("into.bin"));
}

#[test]
fn test_copy_multiple_sources_in_parallel() {
    let fx = TestFixture::new();
    let sources = fx.create_files(6, 300_000);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q").arg("-j").arg("3");
    for src in &sources {
        cmd.arg(src);
    }
    cmd.arg(fx.dst.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 6 files"));

    for src in &sources {
        let name = src.file_name().unwrap();
        fx.assert_same_content(src, &fx.dst.path().join(name));
    }
}

#[test]
fn test_target_directory_flag() {
    let fx = TestFixture::new();
    let sources = fx.create_files(2, 10);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q")
        .arg("-t")
        .arg(fx.dst.path())
        .args(&sources)
        .assert()
        .success();

    assert!(fx.dst.path().join("file0.bin").exists());
    assert!(fx.dst.path().join("file1.bin").exists());
}

#[test]
fn test_empty_file_copy() {
    let fx = TestFixture::new();
    let src = fx.create_file("empty.bin", 0);
    let dst = fx.dst.path().join("empty.bin");

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg(&src).arg(&dst).assert().success();

    assert_eq!(fs::metadata(&dst).unwrap().len(), 0);
}

#[test]
fn test_overwrite_is_default() {
    let fx = TestFixture::new();
    let src = fx.create_file("data.bin", 64);
    let dst = fx.dst.path().join("data.bin");
    fs::write(&dst, "old").unwrap();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q").arg(&src).arg(&dst).assert().success();

    fx.assert_same_content(&src, &dst);
}

#[test]
fn test_skip_existing() {
    let fx = TestFixture::new();
    let src = fx.create_file("keep.bin", 64);
    let dst = fx.dst.path().join("keep.bin");
    fs::write(&dst, "keep me").unwrap();

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q")
        .arg("-c")
        .arg("skip")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to copy (1 file skipped)"));

    assert_eq!(fs::read_to_string(&dst).unwrap(), "keep me");
}

#[test]
fn test_no_temp_files_left_behind() {
    let fx = TestFixture::new();
    let sources = fx.create_files(3, 1000);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q")
        .arg("--no-sync")
        .args(&sources)
        .arg(fx.dst.path())
        .assert()
        .success();

    assert_eq!(fx.count_dst_entries(), 3);
}

#[test]
fn test_preserves_modification_time() {
    let fx = TestFixture::new();
    let src = fx.create_file("old.bin", 16);
    let mtime = filetime_from_secs(1_000_000_000);
    set_mtime(&src, mtime);

    let dst = fx.dst.path().join("old.bin");
    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q").arg(&src).arg(&dst).assert().success();

    let copied = fs::metadata(&dst).unwrap().modified().unwrap();
    assert_eq!(copied, mtime);
}

#[test]
fn test_verbose_prints_configuration() {
    let fx = TestFixture::new();
    let src = fx.create_file("v.bin", 8);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("-q")
        .arg("-v")
        .arg(&src)
        .arg(fx.dst.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Effective configuration:"))
        .stdout(predicate::str::contains("Files copied:   1"));
}

fn filetime_from_secs(secs: u64) -> std::time::SystemTime {
    std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs)
}

fn set_mtime(path: &std::path::Path, time: std::time::SystemTime) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}
