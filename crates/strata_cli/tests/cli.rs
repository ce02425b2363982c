//! Runs the `strata` binary against bundles on disk.

use std::path::PathBuf;
use std::process::{Command, Output};

const BUNDLE: &str = r#"{
    "global": {
        "appNameShort": "pm",
        "app-name": "pm-app",
        "source-id-short": "PM",
        "email": "a@x.com",
        "storage-arn": "arn:aws:s3:::bucket",
        "common_location": "layers/common"
    },
    "layers": [{ "name": "common" }]
}"#;

fn write(dir: &tempfile::TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, text).unwrap();
    path
}

fn strata(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_strata"))
        .args(args)
        .env_remove("STRATA_CONFIG")
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn synth_prints_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, BUNDLE);
    let out = strata(&["synth", "--config", config.to_str().unwrap(), "--env", "dev"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let manifest: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(manifest["stack"], "pm-app-dev-stack");
    assert_eq!(manifest["environment"], "dev");
    assert_eq!(
        manifest["resources"]["pm-common-Id"]["Type"],
        "AWS::Lambda::LayerVersion"
    );
}

#[test]
fn synth_reads_config_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, BUNDLE);
    let manifest_path = dir.path().join("manifest.json");
    let out = Command::new(env!("CARGO_BIN_EXE_strata"))
        .args(["synth", "--out", manifest_path.to_str().unwrap()])
        .env("STRATA_CONFIG", &config)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());

    let text = std::fs::read_to_string(&manifest_path).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(manifest["stack"], "pm-app-stack");
}

#[test]
fn synth_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, BUNDLE);
    let first = strata(&["synth", "-c", config.to_str().unwrap()]);
    let second = strata(&["synth", "-c", config.to_str().unwrap()]);
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn order_lists_role_before_its_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, BUNDLE);
    let out = strata(&["order", "--config", config.to_str().unwrap()]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let ids: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();
    assert_eq!(
        ids,
        vec![
            "pm-kms-key-id",
            "pm-app-sns-topic",
            "pm-app-sns-topic-email-subscription",
            "pm-mainStack-role-id",
            "pm-app-mainStack-policy-id",
            "pm-common-Id",
        ]
    );
}

#[test]
fn validate_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, BUNDLE);
    let out = strata(&["validate", "--config", config.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("pm-app-stack is valid (6 resources)"));
}

#[test]
fn validate_enforces_resource_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, BUNDLE);
    let out = strata(&[
        "validate",
        "--config",
        config.to_str().unwrap(),
        "--max-resources",
        "2",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Resource count 6 exceeds max 2"));
}

#[test]
fn missing_key_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(&dir, r#"{ "global": { "appNameShort": "pm" } }"#);
    let out = strata(&["synth", "--config", config.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("app-name"));
}
