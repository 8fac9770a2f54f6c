use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `ebill` with the user config directory pointed at `home`.
fn ebill(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ebill").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

#[test]
fn empty_directory_reports_no_input() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    ebill(home.path())
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input found"));

    assert!(!dir.path().join("账单.csv").exists());
}

#[test]
fn corrupt_pdf_is_skipped_and_nothing_written() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();

    ebill(home.path())
        .arg(dir.path())
        .arg("--pivot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped broken.pdf"))
        .stdout(predicate::str::contains("没有可匹配的电费单"))
        .stdout(predicate::str::contains("1 skipped"));

    assert!(!dir.path().join("账单.csv").exists());
    assert!(!dir.path().join("账单透视表.csv").exists());
}

#[test]
fn output_override_is_not_created_without_bills() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let out = home.path().join("bills.csv");
    fs::write(dir.path().join("letter.pdf"), "%PDF-1.4").unwrap();

    ebill(home.path())
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(!out.exists());
}

#[test]
fn directory_named_like_a_subcommand() {
    let home = TempDir::new().unwrap();
    let cwd = TempDir::new().unwrap();
    fs::create_dir(cwd.path().join("config")).unwrap();

    ebill(home.path())
        .current_dir(cwd.path())
        .arg("./config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input found"))
        .stderr(predicate::str::contains("config"));
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().unwrap();

    ebill(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""file_name": "账单.csv""#))
        .stdout(predicate::str::contains(r#""layout": "csg""#));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("ebill.json");

    ebill(home.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    ebill(home.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn explicit_config_is_used() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let config = home.path().join("ebill.json");
    fs::write(&config, r#"{ "input": { "extension": "bill" } }"#).unwrap();
    fs::write(dir.path().join("a.pdf"), "not a pdf").unwrap();

    ebill(home.path())
        .arg("-c")
        .arg(&config)
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .bill files"));
}

#[test]
fn malformed_config_is_rejected() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let config = home.path().join("ebill.json");
    fs::write(&config, "{ not json").unwrap();

    ebill(home.path())
        .arg("--config")
        .arg(&config)
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn inspect_missing_file_fails() {
    let home = TempDir::new().unwrap();

    ebill(home.path())
        .args(["inspect", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.pdf"));
}
