//! Integration tests for the `adbdeck` CLI binary.
//!
//! These cover argument parsing, help output, shell completions, the
//! config commands, and error exit codes. None of them need a device: the
//! device-bound cases point `--adb` at a binary that does not exist.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `adbdeck` binary with env isolation.
fn adbdeck_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("adbdeck");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("ADBDECK_CONFIG")
        .env_remove("ADBDECK_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = adbdeck_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_command_groups() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("fastboot"))
            .and(predicate::str::contains("packages"))
            .and(predicate::str::contains("files")),
    );
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("adbdeck"));
}

#[test]
fn packages_help_lists_actions() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["packages", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("uninstall")
                .and(predicate::str::contains("disable"))
                .and(predicate::str::contains("install"))
                .and(predicate::str::contains("pull")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn completions_bash() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_path_honours_flag() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("custom.toml");
    adbdeck_cmd(home.path())
        .args(["config", "path", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn config_show_prints_defaults() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("absent.toml");
    adbdeck_cmd(home.path())
        .args(["config", "show", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[polling]")
                .and(predicate::str::contains("devices = 3"))
                .and(predicate::str::contains("path = \"/sdcard/\"")),
        );
}

#[test]
fn config_show_applies_env_overrides() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("absent.toml");
    adbdeck_cmd(home.path())
        .env("ADBDECK_POLLING__FILES", "25")
        .args(["config", "show", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("files = 25"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("conf").join("config.toml");

    adbdeck_cmd(home.path())
        .args(["config", "init", "--config"])
        .arg(&file)
        .assert()
        .success();
    assert!(file.is_file());

    adbdeck_cmd(home.path())
        .args(["config", "init", "--config"])
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    adbdeck_cmd(home.path())
        .args(["config", "init", "--force", "--config"])
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn invalid_config_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("bad.toml");
    std::fs::write(&file, "[polling]\ndevices = 0\n").unwrap();
    adbdeck_cmd(home.path())
        .args(["config", "show", "--config"])
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("polling.devices"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = adbdeck_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("foobar"));
}

#[test]
fn uninstall_requires_confirmation() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["packages", "uninstall", "com.example.app"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn missing_adb_binary_exit_code() {
    let home = tempfile::tempdir().unwrap();
    let adb = home.path().join("no-such-adb");
    // An empty PATH so discovery cannot fall back to an installed adb.
    adbdeck_cmd(home.path())
        .env("PATH", home.path())
        .args(["devices", "--adb"])
        .arg(&adb)
        .assert()
        .code(5);
}

#[test]
fn zero_timeout_rejected() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["devices", "--timeout", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout"));
}

#[test]
fn install_rejects_missing_apk() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["packages", "install"])
        .arg(home.path().join("missing.apk"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a file"));
}

#[test]
fn reboot_requires_confirmation() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["devices", "reboot", "R58M123", "--mode", "recovery"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn reboot_rejects_unknown_mode() {
    let home = tempfile::tempdir().unwrap();
    adbdeck_cmd(home.path())
        .args(["devices", "reboot", "--mode", "factory", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("factory"));
}

/// An adb stand-in whose `push` fails for any host path containing "bad".
#[cfg(unix)]
fn push_adb(dir: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("adb");
    std::fs::write(
        &path,
        "#!/bin/sh\n\
         case \"$1\" in\n\
           push) case \"$2\" in *bad*) echo \"adb: error: cannot stat '$2'\" >&2; exit 1;; esac\n\
                 echo \"$2: 1 file pushed\";;\n\
         esac\n\
         exit 0\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn push_attempts_every_file_and_reports_failures() {
    let home = tempfile::tempdir().unwrap();
    let good = home.path().join("good.txt");
    let bad = home.path().join("bad.txt");
    std::fs::write(&good, b"1").unwrap();
    std::fs::write(&bad, b"2").unwrap();

    let output = adbdeck_cmd(home.path())
        .args(["files", "push", "-o", "table", "--adb"])
        .arg(push_adb(home.path()))
        .arg(&bad)
        .arg(&good)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("push: 1/2 succeeded"), "{text}");
    assert!(text.contains("bad.txt"), "{text}");
}
