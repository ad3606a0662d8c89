// ABOUTME: Integration tests for the sshrun binary.
// ABOUTME: Validates --help output and failures that happen before any network traffic.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn sshrun_cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sshrun"));
    cmd.env("HOME", home)
        .env_remove("USERPROFILE")
        .env_remove("RUST_LOG");
    cmd
}

fn temp_home() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".ssh")).unwrap();
    dir
}

#[test]
fn help_shows_connection_flags() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("--pass"))
        .stdout(predicate::str::contains("--cmd"))
        .stdout(predicate::str::contains("--preset"));
}

#[test]
fn host_is_required() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .args(["--cmd", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--host"));
}

#[test]
fn unknown_preset_is_rejected() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .args(["--host", "127.0.0.1", "--preset", "format-disk"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn missing_key_file_fails_before_connecting() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .args(["--host", "127.0.0.1", "--user", "alice", "--cmd", "whoami"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unable to read private key"))
        .stderr(predicate::str::contains("id_rsa"));
}

#[test]
fn missing_known_hosts_fails_before_connecting() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .args([
            "--host", "127.0.0.1", "--user", "alice", "--pass", "hunter2", "--cmd", "whoami",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unable to load known hosts"));
}

#[test]
fn json_mode_reports_errors_as_json() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .args(["--host", "127.0.0.1", "--user", "alice", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""event":"error""#));
}

#[test]
fn invalid_config_file_is_reported() {
    let home = temp_home();
    let config_dir = home.path().join(".config/sshrun");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.yml"), "port: [not, a, port]\n").unwrap();

    sshrun_cmd(home.path())
        .args(["--host", "127.0.0.1", "--user", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn explicit_config_path_must_exist() {
    let home = temp_home();
    sshrun_cmd(home.path())
        .args(["--host", "127.0.0.1", "--config", "~/missing.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}
