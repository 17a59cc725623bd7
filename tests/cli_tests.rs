#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("push-report").expect("push-report binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_config_writes_documented_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config_fechas.txt");
    cli()
        .args(["init-config", "--config-file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(str_contains("Date config written to"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("MES=10"));
    assert!(written.contains("# FECHA_INICIO=2025-10-01"));
}

#[test]
fn init_config_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config_fechas.txt");
    fs::write(&path, "MES=1\nAÑO=2024\n").unwrap();

    cli()
        .args(["init-config", "--config-file"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(str_contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "MES=1\nAÑO=2024\n");
}

#[test]
fn invalid_month_fails_before_contacting_aws() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config_fechas.txt");
    fs::write(&path, "MES=13\nAÑO=2024\n").unwrap();

    cli()
        .args(["messages-sent", "--config-file"])
        .arg(&path)
        .arg("--output-folder")
        .arg(dir.path().join("output"))
        .env("AWS_ACCESS_KEY_ID", "test")
        .env("AWS_SECRET_ACCESS_KEY", "test")
        .assert()
        .failure()
        .stderr(str_contains("INVALID_MONTH"))
        .stderr(str_contains("MES must be between 1 and 12"));
    assert!(!dir.path().join("output").exists());
}
