//! Progress display integration tests for cpb CLI.
//!
//! Standard output is not a terminal here, so the line is written without
//! erase sequences or colors and can be matched as plain text.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use rstest::rstest;

#[test]
fn test_line_display_shows_status_and_done() {
    let fx = TestFixture::new();
    let src = fx.create_file("source.txt", 2048);

    let mut cmd = cargo_bin_cmd!("cpb");
    let output = cmd
        .arg(&src)
        .arg(fx.dst.path().join("dest.txt"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    assert!(stdout.contains("\r[ COPY ] [ "), "stdout: {stdout:?}");
    assert!(stdout.contains("] [2048]"), "stdout: {stdout:?}");
    assert_eq!(stdout.matches("[ done ]").count(), 1, "stdout: {stdout:?}");
    assert!(!stdout.contains("Copied"), "stdout: {stdout:?}");
}

#[test]
fn test_line_display_fits_captions() {
    let fx = TestFixture::new();
    let src = fx.create_file("a-rather-long-source-file-name.bin", 16);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("--caption-width")
        .arg("12")
        .arg(&src)
        .arg(fx.dst.path().join("b.bin"))
        .assert()
        .success()
        .stdout(predicate::str::contains("...-name.bin >"));
}

#[test]
fn test_slow_refresh_still_finishes() {
    let fx = TestFixture::new();
    let src = fx.create_file("slow.bin", 10);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("--refresh-ms")
        .arg("60000")
        .arg(&src)
        .arg(fx.dst.path())
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("[ done ]"));
}

#[rstest]
#[case::quiet_flag(&["-q"])]
#[case::display_none(&["--display", "none"])]
fn test_silent_modes_print_summary(#[case] flags: &[&str]) {
    let fx = TestFixture::new();
    let src = fx.create_file("s.bin", 2048);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.args(flags)
        .arg(&src)
        .arg(fx.dst.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 1 file (2.00 KB)"))
        .stdout(predicate::str::contains("[ done ]").not());
}

#[test]
fn test_bar_display_finishes_without_summary() {
    let fx = TestFixture::new();
    let src = fx.create_file("b.bin", 4096);

    let mut cmd = cargo_bin_cmd!("cpb");
    cmd.arg("--display")
        .arg("bar")
        .arg(&src)
        .arg(fx.dst.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied").not());

    fx.assert_same_content(&src, &fx.dst.path().join("b.bin"));
}
