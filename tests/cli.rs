#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fconf(state: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fconf").unwrap();
    cmd.env("FCONF_CONFIGDIR", state.path().join("fconf"))
        .env_remove("RUST_LOG");
    cmd
}

// ── Help ────────────────────────────────────────────────────────────

#[test]
fn help_lists_media() {
    let state = tempfile::tempdir().unwrap();
    fconf(&state)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ethernet"))
        .stdout(predicate::str::contains("wifi-client"))
        .stdout(predicate::str::contains("4g-ndis"))
        .stdout(predicate::str::contains("list-interface"));
}

#[test]
fn conflicting_actions_are_rejected() {
    let state = tempfile::tempdir().unwrap();
    fconf(&state)
        .args(["ethernet", "--enable", "--remove", "eth0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[test]
fn configure_ethernet_from_file() {
    let state = tempfile::tempdir().unwrap();
    let units = state.path().join("network");
    let payload = state.path().join("ethernet.json");
    fs::write(&payload, r#"{"interface":"eth3","dhcp":true}"#).unwrap();

    fconf(&state)
        .args(["ethernet", "--config"])
        .arg(&payload)
        .arg("--dir")
        .arg(&units)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"))
        .stdout(predicate::str::contains("successfully configured ethernet eth3"));

    assert_eq!(
        fs::read_to_string(units.join("fconf-wired-eth3.network")).unwrap(),
        "[Match]\nName=eth3\n[Network]\nDHCP=ipv4\n"
    );
    assert!(state.path().join("fconf/ethernet@eth3.json").exists());
}

#[test]
fn configure_reads_stdin_and_custom_name() {
    let state = tempfile::tempdir().unwrap();
    let units = state.path().join("network");

    fconf(&state)
        .args(["e", "--config", "stdin", "--name", "10-%s.network", "--dir"])
        .arg(&units)
        .write_stdin("{\"interface\":\"eth4\",\"dhcp\":true}\n")
        .assert()
        .success();

    assert!(units.join("10-eth4.network").exists());
}

#[test]
fn enable_without_configure_fails() {
    let state = tempfile::tempdir().unwrap();
    fconf(&state)
        .args(["ethernet", "--enable", "--interface", "eth7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not configured"));

    assert!(!state.path().join("fconf").exists());
}

#[test]
fn invalid_configuration_fails() {
    let state = tempfile::tempdir().unwrap();
    let units = state.path().join("network");
    let payload = state.path().join("ethernet.json");
    fs::write(&payload, r#"{"interface":"eth0","dns":["8.8.8.8"]}"#).unwrap();

    fconf(&state)
        .args(["ethernet", "--config"])
        .arg(&payload)
        .arg("--dir")
        .arg(&units)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no addressing method specified"));

    assert!(!units.exists());
}

#[test]
fn missing_target_is_reported() {
    let state = tempfile::tempdir().unwrap();
    fconf(&state)
        .args(["wifi-client", "--disable"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing interface"));
}

// ── Settings ────────────────────────────────────────────────────────

#[test]
fn malformed_settings_only_affect_media_commands() {
    let state = tempfile::tempdir().unwrap();
    let root = state.path().join("fconf");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("fconf.toml"), "network_dir = [unterminated").unwrap();

    fconf(&state)
        .arg("list-interface")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));

    fconf(&state)
        .args(["ethernet", "--disable", "eth0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn nothing_to_do_without_flags() {
    let state = tempfile::tempdir().unwrap();
    fconf(&state)
        .arg("access-point")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to do"));
}
