//! Integration tests for the `portsplit` CLI binary.
//!
//! Argument parsing, help output, offline previews, and one reconcile run
//! against a mocked CVP server.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECONCILE_CONFIG: &str = "\
hostname leaf1
interface Ethernet1/1/1
   switchport mode tap
   shutdown
interface Ethernet1/1/2
   description reserved
interface Ethernet1/2/1
   switchport mode tool
interface Ethernet1/1/5
   description mgmt
ip routing
";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `portsplit` binary with env isolation.
///
/// Clears all `PORTSPLIT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn portsplit_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("portsplit");
    cmd.env("HOME", "/tmp/portsplit-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/portsplit-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PORTSPLIT_PROFILE")
        .env_remove("PORTSPLIT_SERVER")
        .env_remove("PORTSPLIT_USERNAME")
        .env_remove("PORTSPLIT_PASSWORD")
        .env_remove("PORTSPLIT_TOKEN")
        .env_remove("PORTSPLIT_TIMEOUT")
        .env_remove("PORTSPLIT_OUTPUT");
    cmd
}

fn config_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RECONCILE_CONFIG.as_bytes()).unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = portsplit_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    portsplit_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("reconcile")
            .and(predicate::str::contains("preview"))
            .and(predicate::str::contains("--cvp")),
    );
}

#[test]
fn test_version_flag() {
    portsplit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("portsplit"));
}

#[test]
fn test_completions_zsh() {
    portsplit_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    portsplit_cmd()
        .args(["--output", "xml", "preview"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("xml"));
}

// ── Preview ─────────────────────────────────────────────────────────

#[test]
fn test_preview_table() {
    let file = config_file();
    portsplit_cmd()
        .args(["preview", "--file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Ethernet1/1/1")
                .and(predicate::str::contains("templated"))
                .and(predicate::str::contains("excluded"))
                .and(predicate::str::contains("dropped")),
        )
        .stderr(predicate::str::contains("2 templated"));
}

#[test]
fn test_preview_json() {
    let file = config_file();
    let output = portsplit_cmd()
        .args(["-o", "json", "preview", "-f"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["outcomes"][0]["interface"], "interface Ethernet1/1/1");
    assert_eq!(plan["outcomes"][0]["category"], "tap");
    assert_eq!(plan["outcomes"][1]["disposition"], "excluded");
    assert_eq!(plan["residual"], "hostname leaf1\nip routing\n");
    assert!(plan["rendered"]["shutdown"].is_null());
}

#[test]
fn test_preview_show_tool_from_stdin() {
    portsplit_cmd()
        .args(["preview", "--show", "tool"])
        .write_stdin(RECONCILE_CONFIG)
        .assert()
        .success()
        .stdout("!\ninterface Ethernet1/2/1\n   switchport mode tool\n   no shutdown\n!\n");
}

#[test]
fn test_preview_show_residual_retained() {
    portsplit_cmd()
        .args(["preview", "--retain-unmatched", "--show", "residual"])
        .write_stdin(RECONCILE_CONFIG)
        .assert()
        .success()
        .stdout(
            "hostname leaf1\n\
             interface Ethernet1/1/2\n   description reserved\n\
             interface Ethernet1/1/5\n   description mgmt\n\
             ip routing\n",
        );
}

#[test]
fn test_preview_missing_file() {
    portsplit_cmd()
        .args(["preview", "--file", "/nonexistent/reconcile.cfg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/reconcile.cfg"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    portsplit_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_use_unknown_profile() {
    portsplit_cmd()
        .args(["config", "use", "lab"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("lab"));
}

// ── Reconcile ───────────────────────────────────────────────────────

#[test]
fn test_reconcile_without_server() {
    portsplit_cmd()
        .args(["reconcile", "leaf1.lab", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No CVP server configured"));
}

#[test]
fn test_reconcile_unknown_profile() {
    portsplit_cmd()
        .args(["--profile", "nope", "reconcile", "leaf1.lab", "--yes"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_reconcile_malformed_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("portsplit");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[profiles.prod\nserver = \"cvp.prod\"\n",
    )
    .unwrap();

    portsplit_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["-p", "prod", "reconcile", "leaf1.lab", "--yes"])
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("Invalid configuration")
                .and(predicate::str::contains("not found in configuration").not()),
        );
}

#[test]
fn test_reconcile_requires_yes_without_tty() {
    portsplit_cmd()
        .args(["--server", "127.0.0.1:9", "--token", "t", "reconcile", "leaf1.lab"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reconcile_dry_run_against_mock() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cvpservice/cvpInfo/getCvpInfo.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "2024.2.0" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cvpservice/provisioning/searchTopology.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "netElementList": [{ "fqdn": "leaf1.lab", "systemMacAddress": "00:1c:73:00:00:01" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cvpservice/provisioning/getConfigletsByNetElementId.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "configletList": [{
                "key": "c_rec",
                "name": "leaf1_reconcile",
                "config": RECONCILE_CONFIG,
                "reconciled": true
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cvpservice/configlet/getConfigletByName.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "c_auto",
            "name": "automation",
            "config": "!\n"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cvpservice/login/logout.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "success" })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        portsplit_cmd()
            .args(["--server", &uri, "--token", "tok", "-o", "json"])
            .args(["reconcile", "leaf1.lab", "--dry-run"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["device_mac"], "00:1c:73:00:00:01");
    assert_eq!(report["reconcile_configlet"], "leaf1_reconcile");
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["updated"], json!([]));

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests
            .iter()
            .all(|r| r.method.as_str() == "GET" || r.url.path().ends_with("logout.do")),
        "dry run must not update configlets"
    );
}
