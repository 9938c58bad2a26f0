use assert_cmd::prelude::*;
use serde_json::Value;
use std::process::Command;

fn feedreply() -> Command {
    let mut cmd = Command::cargo_bin("feedreply").expect("binary built");
    cmd.env_remove("FEEDREPLY_API_BASE")
        .env_remove("FEEDREPLY_DEBOUNCE_MS")
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf8 output");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn detect_classifies_addresses() {
    let assert = feedreply()
        .args(["--output", "json", "detect", "https://x.com/jack/status/20"])
        .assert()
        .success();
    let value = json_stdout(assert.get_output());
    assert_eq!(value["platform"].as_str(), Some("microblog"));
    assert_eq!(value["supported"].as_bool(), Some(true));

    let assert = feedreply()
        .args(["detect", "https://example.com/"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("unknown"));
}

#[test]
fn scan_lists_annotated_units_with_text() {
    let assert = feedreply()
        .args([
            "--output",
            "json",
            "scan",
            "--url",
            "https://www.linkedin.com/feed/",
            "--html",
            "tests/fixtures/linkedin_feed.html",
        ])
        .assert()
        .success();
    let value = json_stdout(assert.get_output());

    assert_eq!(value["platform"].as_str(), Some("professional_feed"));
    assert_eq!(value["in_scope"].as_bool(), Some(true));
    assert_eq!(value["filtered"].as_u64(), Some(1));
    let units = value["units"].as_array().unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(
        units[0]["text"].as_str(),
        Some("Great insight on scaling systems!")
    );
}

#[test]
fn scan_skips_microblog_feed_view() {
    let assert = feedreply()
        .args([
            "--output",
            "json",
            "scan",
            "--url",
            "https://x.com/home",
            "--html",
            "tests/fixtures/x_home.html",
        ])
        .assert()
        .success();
    let value = json_stdout(assert.get_output());
    assert_eq!(value["in_scope"].as_bool(), Some(false));
    assert!(value["units"].as_array().unwrap().is_empty());
}

#[test]
fn reply_without_credential_fails_with_sign_in_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    std::fs::write(&store, r#"{ "toneSetting": "value" }"#).unwrap();

    let assert = feedreply()
        .args([
            "--output",
            "json",
            "reply",
            "--url",
            "https://www.linkedin.com/feed/",
            "--html",
            "tests/fixtures/linkedin_feed.html",
            "--store",
            store.to_str().unwrap(),
        ])
        .env("FEEDREPLY_API_BASE", "http://127.0.0.1:9")
        .assert()
        .failure();
    let value = json_stdout(assert.get_output());
    assert_eq!(value["state"].as_str(), Some("error"));
    assert_eq!(value["status"].as_str(), Some("Please sign in first."));
    assert_eq!(value["input_text"].as_str(), Some(""));
}

#[test]
fn missing_snapshot_is_reported() {
    feedreply()
        .args([
            "scan",
            "--url",
            "https://www.linkedin.com/feed/",
            "--html",
            "tests/fixtures/does-not-exist.html",
        ])
        .assert()
        .failure();
}
