use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Command isolated from the user's config files and environment
fn linter(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dc-template-linter").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("DCTL_CONFIG")
        .env_remove("DCTL_CLOUDFLARE")
        .env_remove("DCTL_CHECK_LOGOS")
        .env_remove("DCTL_INDENT")
        .env_remove("DCTL_TTL")
        .env_remove("DCTL_TOLERATE")
        .env_remove("DCTL_PROBE_TIMEOUT");
    cmd
}

#[test]
fn test_cli_help() {
    let home = tempdir().unwrap();
    linter(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let home = tempdir().unwrap();
    linter(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_valid_template_exits_zero() {
    let home = tempdir().unwrap();
    linter(&home)
        .arg(fixture("example.com.web.json"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_error_template_exit_status() {
    let home = tempdir().unwrap();
    linter(&home)
        .arg(fixture("example.com.bad.json"))
        .assert()
        .code(8)
        .stderr(predicate::str::contains("DCTL1017"))
        .stderr(predicate::str::contains("DCTL1000"));
}

#[test]
fn test_tolerate_thresholds() {
    let home = tempdir().unwrap();
    linter(&home)
        .args(["--tolerate", "warn"])
        .arg(fixture("example.com.bad.json"))
        .assert()
        .code(8);
    linter(&home)
        .args(["--tolerate", "error"])
        .arg(fixture("example.com.bad.json"))
        .assert()
        .success();
    linter(&home)
        .args(["--tolerate", "warn"])
        .arg(fixture("example.com.quoted.json"))
        .assert()
        .success();
    linter(&home)
        .arg(fixture("example.com.quoted.json"))
        .assert()
        .code(4);
}

#[test]
fn test_severities_combine_across_templates() {
    let home = tempdir().unwrap();
    linter(&home)
        .arg(fixture("example.com.quoted.json"))
        .arg(fixture("example.com.web.json"))
        .arg(fixture("example.com.bad.json"))
        .assert()
        .code(8);
}

#[test]
fn test_missing_file_continues() {
    let home = tempdir().unwrap();
    linter(&home)
        .args(["--tolerate", "warn"])
        .arg(home.path().join("missing.json"))
        .arg(fixture("example.com.web.json"))
        .assert()
        .code(8)
        .stderr(predicate::str::contains("DCTL0001"));
}

#[test]
fn test_directory_argument() {
    let home = tempdir().unwrap();
    let dir = home.path().join("templates");
    std::fs::create_dir(&dir).unwrap();
    std::fs::copy(
        fixture("example.com.web.json"),
        dir.join("example.com.web.json"),
    )
    .unwrap();
    std::fs::write(dir.join("README.txt"), "not a template").unwrap();

    linter(&home).arg(&dir).assert().success();
}

#[test]
fn test_stdin_valid() {
    let home = tempdir().unwrap();
    let source = std::fs::read(fixture("example.com.web.json")).unwrap();
    linter(&home).write_stdin(source).assert().success();
}

#[test]
fn test_stdin_malformed_is_fatal() {
    let home = tempdir().unwrap();
    linter(&home)
        .write_stdin("{\"providerId\": ")
        .assert()
        .code(16)
        .stderr(predicate::str::contains("DCTL0003"));
}

#[test]
fn test_pretty_of_canonical_is_identical() {
    let home = tempdir().unwrap();
    let expected = std::fs::read_to_string(fixture("example.com.web.json")).unwrap();
    linter(&home)
        .arg("--pretty")
        .arg(fixture("example.com.web.json"))
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn test_pretty_indent_and_increment() {
    let home = tempdir().unwrap();
    let output = linter(&home)
        .args(["--pretty", "--increment", "--indent", "2"])
        .arg(fixture("example.com.web.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("{\n  \"providerId\""));
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["version"], 2);
}

#[test]
fn test_inplace_rewrites_file() {
    let home = tempdir().unwrap();
    let path = home.path().join("example.com.quoted.json");
    std::fs::copy(fixture("example.com.quoted.json"), &path).unwrap();

    linter(&home)
        .args(["--inplace", "--pretty", "--ttl", "3600", "--tolerate", "warn"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["version"], 2);
    assert_eq!(json["records"][0]["priority"], 10);
    assert_eq!(json["records"][0]["ttl"], 3600);

    linter(&home).arg(&path).assert().success();
}

#[test]
fn test_cloudflare_adds_findings() {
    let home = tempdir().unwrap();
    let source = r#"{
        "providerId": "example.org",
        "providerName": "Example Org",
        "serviceId": "site",
        "serviceName": "Site",
        "version": 1,
        "records": [{"type": "A", "host": "www", "pointsTo": "192.0.2.10", "ttl": 300}]
    }"#;

    linter(&home).write_stdin(source).assert().success();
    linter(&home)
        .arg("--cloudflare")
        .write_stdin(source)
        .assert()
        .code(8)
        .stderr(predicate::str::contains("DCTL5001"));
}

#[test]
fn test_apex_cname_file_name_mismatch() {
    let home = tempdir().unwrap();
    let path = home.path().join("wrong-name.json");
    std::fs::copy(fixture("example.net.apex.json"), &path).unwrap();

    linter(&home)
        .arg(&path)
        .assert()
        .code(8)
        .stderr(predicate::str::contains("DCTL1003"))
        .stderr(predicate::str::contains("DCTL1012"));
}

#[test]
fn test_config_file_tolerance() {
    let home = tempdir().unwrap();
    let config = home.path().join("lint.toml");
    std::fs::write(&config, "[lint]\ntolerate = \"any\"\n").unwrap();

    linter(&home)
        .arg("--config")
        .arg(&config)
        .arg(fixture("example.com.bad.json"))
        .assert()
        .success();
}

#[test]
fn test_project_config_and_env_override() {
    let home = tempdir().unwrap();
    std::fs::write(home.path().join(".dctlint.toml"), "[lint]\ntolerate = \"any\"\n").unwrap();

    linter(&home)
        .arg(fixture("example.com.bad.json"))
        .assert()
        .success();
    linter(&home)
        .env("DCTL_TOLERATE", "info")
        .arg(fixture("example.com.bad.json"))
        .assert()
        .code(8);
}

#[test]
fn test_invalid_indent_is_fatal() {
    let home = tempdir().unwrap();
    linter(&home)
        .args(["--indent", "256"])
        .arg(fixture("example.com.web.json"))
        .assert()
        .code(16);
}

#[test]
fn test_robot_config_error() {
    let home = tempdir().unwrap();
    let output = linter(&home)
        .args(["--robot", "--indent", "256"])
        .arg(fixture("example.com.web.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(16));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"]["error"]["code"], "config");
    assert!(json["status"]["error"]["message"].as_str().unwrap().contains("indent"));
}

#[test]
fn test_ttl_above_max_is_fatal() {
    let home = tempdir().unwrap();
    linter(&home)
        .args(["--ttl", "2147483648"])
        .arg(fixture("example.com.web.json"))
        .assert()
        .code(16);
}

#[test]
fn test_list_codes() {
    let home = tempdir().unwrap();
    linter(&home)
        .arg("--list-codes")
        .assert()
        .success()
        .stdout(predicate::str::contains("DCTL1003"))
        .stdout(predicate::str::contains("DCTL5011"));
}

#[test]
fn test_explain_robot() {
    let home = tempdir().unwrap();
    let output = linter(&home)
        .args(["--robot", "--explain", "dctl1021"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["code"], "DCTL1021");
    assert_eq!(json["data"]["category"], "record");
}

#[test]
fn test_explain_unknown_code() {
    let home = tempdir().unwrap();
    linter(&home).args(["--explain", "DCTL9999"]).assert().failure();
}

#[test]
fn test_list_rules_robot() {
    let home = tempdir().unwrap();
    let output = linter(&home)
        .args(["--robot", "--cloudflare", "--list-rules"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = json["data"].as_array().unwrap();
    let cloudflare = rules
        .iter()
        .find(|rule| rule["id"] == "cloudflare-template")
        .unwrap();
    assert_eq!(cloudflare["enabled"], true);
}
