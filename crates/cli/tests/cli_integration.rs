//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `tick` binary and verify exit codes,
//! stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to conformance stories resolve and `tick.toml` is picked up.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `tick` binary, rooted at workspace.
fn tick() -> Command {
    let mut cmd = cargo_bin_cmd!("tick");
    cmd.current_dir(workspace_root());
    cmd.env_remove("TICK_LOG");
    cmd
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    tick()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tick story toolchain"));
}

#[test]
fn version_exits_0() {
    tick()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tick"));
}

// ──────────────────────────────────────────────
// 2. Validate subcommand
// ──────────────────────────────────────────────

#[test]
fn validate_consistent_story_exits_0() {
    tick()
        .args(["validate", "conformance/valid/weather.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_inconsistent_story_exits_1_with_violations() {
    tick()
        .args(["validate", "conformance/invalid/weather-broken.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Action handler weather_api not found in handlers repository",
        ))
        .stderr(predicate::str::contains(
            "Transition bye not found in story intents or triggers",
        ));
}

#[test]
fn validate_json_output_lists_violations() {
    let output = tick()
        .args([
            "validate",
            "--output",
            "json",
            "conformance/invalid/self-loop.json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["stage"], "consistency");
    assert_eq!(json["violations"][0]["rule"], "self-loop");
}

#[test]
fn validate_uses_handlers_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tick.toml");
    fs::write(&config, "[handlers]\nnames = []\n").unwrap();

    tick()
        .args(["validate", "conformance/valid/weather.json", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Action handler weather_lookup not found in handlers repository",
        ));
}

#[test]
fn validate_schema_failure_exits_1() {
    let dir = TempDir::new().unwrap();
    let story = dir.path().join("story.json");
    fs::write(&story, r#"{ "stateMachine": { "id": "Global" }, "colour": "red" }"#).unwrap();

    tick()
        .arg("validate")
        .arg(&story)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid story document"));
}

#[test]
fn validate_nonexistent_file_exits_1() {
    tick()
        .args(["validate", "nonexistent_story_xyz.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn unparsable_config_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tick.toml");
    fs::write(&config, "[handlers\n").unwrap();

    tick()
        .args(["validate", "conformance/valid/greeting.json", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));
}

// ──────────────────────────────────────────────
// 3. Inspect subcommand
// ──────────────────────────────────────────────

#[test]
fn inspect_lists_states_and_actions() {
    tick()
        .args(["inspect", "conformance/valid/weather.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on city -> FETCH_WEATHER"))
        .stdout(predicate::str::contains(
            "FETCH_WEATHER (handler weather_lookup, trigger weather_ready, silent)",
        ));
}

#[test]
fn inspect_json_lists_leaf_states() {
    let output = tick()
        .args([
            "inspect",
            "--output",
            "json",
            "conformance/valid/meeting.json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let leaves: Vec<&str> = json["leafStates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(leaves.contains(&"S_ASK_CHANNEL"));
    assert!(!leaves.contains(&"S_BOOK_MEETING"));
}

// ──────────────────────────────────────────────
// 4. Step subcommand
// ──────────────────────────────────────────────

#[test]
fn step_from_root() {
    tick()
        .args(["step", "conformance/valid/weather.json", "--event", "weather"])
        .assert()
        .success()
        .stdout(predicate::str::contains("advance -> ASK_CITY (ASK_CITY x1)"))
        .stdout(predicate::str::contains("follow-up: await user"));
}

#[test]
fn step_with_entity_reaches_silent_action() {
    tick()
        .args([
            "step",
            "conformance/valid/weather.json",
            "--state",
            "ASK_CITY",
            "--step",
            "ASK_CITY",
            "--event",
            "city",
            "--entity",
            "city=Paris",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("advance -> FETCH_WEATHER"))
        .stdout(predicate::str::contains("follow-up: trigger weather_ready"));
}

#[test]
fn step_past_repetition_limit_overflows() {
    tick()
        .args([
            "step",
            "conformance/valid/greeting.json",
            "--state",
            "WELCOME",
            "--step",
            "WELCOME",
            "--repeated",
            "2",
            "--event",
            "greet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("overflow -> redirect to fallback"));
}

#[test]
fn step_unknown_event_json() {
    let output = tick()
        .args([
            "step",
            "--output",
            "json",
            "conformance/valid/weather.json",
            "--state",
            "ASK_CITY",
            "--step",
            "ASK_CITY",
            "--event",
            "unknown",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["outcome"], "unknown");
    assert_eq!(json["answerId"], "which_city");
    assert_eq!(json["step"]["kind"], "unknown");
    assert_eq!(json["step"]["repeated"], 1);
}

#[test]
fn step_undeclared_state_exits_1() {
    tick()
        .args([
            "step",
            "conformance/valid/weather.json",
            "--state",
            "NOWHERE",
            "--event",
            "weather",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("NOWHERE"));
}

#[test]
fn step_malformed_entity_is_rejected() {
    tick()
        .args([
            "step",
            "conformance/valid/weather.json",
            "--entity",
            "Paris",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

// ──────────────────────────────────────────────
// 5. Publish subcommand
// ──────────────────────────────────────────────

#[test]
fn publish_twice_archives_first_version() {
    tick()
        .args([
            "publish",
            "conformance/valid/greeting.json",
            "conformance/valid/greeting.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("greeting v1 archived"))
        .stdout(predicate::str::contains("greeting v2 current"));
}

#[test]
fn publish_inconsistent_story_exits_1() {
    tick()
        .args(["publish", "conformance/invalid/self-loop.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("refusing to publish"))
        .stderr(predicate::str::contains("State WELCOME has a transition to itself"));
}
