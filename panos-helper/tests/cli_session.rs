use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn helper() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("panos-helper"));
    cmd.env("NO_COLOR", "1")
        .env("NO_PROXY", "*")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_settings_flags() {
    helper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--verify-tls"))
        .stdout(predicate::str::contains("--vsys"));
}

#[test]
fn malformed_addresses_reprompt_until_input_ends() {
    let output = helper()
        .write_stdin("firewall.local\n300.1.1.1\n\n")
        .output()
        .expect("run helper");
    assert!(output.status.success(), "closing input is a normal exit");

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.starts_with("Welcome!"));
    assert_eq!(stdout.matches("Invalid IP format").count(), 3);
    assert!(!stdout.contains("Enter API Key"));
    assert!(!stdout.contains("Available operations"));
}

#[test]
fn blank_api_key_reprompts_key_only() {
    let output = helper()
        .write_stdin("192.0.2.1\n\n   \n")
        .output()
        .expect("run helper");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout.matches("Enter firewall IP").count(), 1);
    assert_eq!(stdout.matches("API key cannot be empty").count(), 2);
    assert!(!stdout.contains("Establishing connection"));
}

#[test]
fn unreachable_device_ends_without_menu() {
    helper()
        .write_stdin("127.0.0.1\nLUFRPT14MW5xOEo1R09KVlBZNnpnemh0VHRBOWl6TGM9\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Establishing connection to firewall"))
        .stdout(predicate::str::contains("Failed to connect to firewall"))
        .stdout(predicate::str::contains("Available operations").not())
        .stdout(predicate::str::contains("LUFRPT14MW5xOEo1R09KVlBZNnpnemh0VHRBOWl6TGM9").not());
}

#[test]
fn unreadable_settings_file_is_a_startup_error() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");

    helper()
        .arg("--config")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load settings"));
}

#[test]
fn invalid_settings_file_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("helper.toml");
    fs::write(&config, "default_log_limit = \"ten\"\n").expect("write config");

    helper()
        .arg("--config")
        .arg(&config)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse settings file"));
}
