//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_dayglass-cli"))
        .args(args)
        .env("DAYGLASS_HOME", home)
        .env_remove("DAYGLASS_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_config_set_get() {
    let home = tempfile::tempdir().unwrap();
    let (code, out, _) = run_cli(home.path(), &["config", "get", "staging.lookahead_days"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "3");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "staging.lookahead_days", "5"]);
    assert_eq!(code, 0);
    let (_, out, _) = run_cli(home.path(), &["config", "get", "staging.lookahead_days"]);
    assert_eq!(out.trim(), "5");
    assert!(home.path().join("config.toml").exists());

    let (code, _, err) = run_cli(home.path(), &["config", "set", "staging.lookahead_days", "soon"]);
    assert_eq!(code, 1);
    assert!(err.contains("error:"));
}

#[test]
fn test_chain_stage_commit() {
    let home = tempfile::tempdir().unwrap();
    let (code, out, _) = run_cli(
        home.path(),
        &[
            "chain",
            "add",
            "Morning",
            "--step",
            "Stretch:20:sunrise",
            "--step",
            "Plan:25:sunrise:crystal",
        ],
    );
    assert_eq!(code, 0);
    assert!(out.contains("Chain created: Morning"));

    let (code, out, _) = run_cli(
        home.path(),
        &["stage", "chain", "morning", "--date", "2024-05-06", "--at", "07:00"],
    );
    assert_eq!(code, 0);
    assert!(out.contains("Staged 2 blocks from Morning"));

    let (_, out, _) = run_cli(home.path(), &["stage", "list", "--json"]);
    let staged = json(&out);
    assert_eq!(staged.as_array().unwrap().len(), 2);
    assert_eq!(staged[0]["staged_by"], "chain:Morning#1");

    let (code, out, _) = run_cli(home.path(), &["stage", "commit"]);
    assert_eq!(code, 0);
    assert!(out.contains("Committed 2 blocks"));

    let calendar = std::fs::read_to_string(home.path().join("calendar.json")).unwrap();
    assert_eq!(json(&calendar).as_array().unwrap().len(), 2);

    let (_, out, _) = run_cli(home.path(), &["stage", "list"]);
    assert!(out.contains("nothing staged"));

    let (_, out, _) = run_cli(
        home.path(),
        &["gaps", "--date", "2024-05-06", "--from", "07:00", "--to", "09:00", "--json"],
    );
    // Stretch 07:00-07:20, buffer, Plan 07:25-07:50
    assert_eq!(json(&out).as_array().unwrap().len(), 2);

    let (_, out, _) = run_cli(home.path(), &["events", "list", "--json"]);
    let labels: Vec<String> = json(&out)
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"]["type"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(labels.iter().any(|l| l == "chain_applied"));
}

#[test]
fn test_stage_undo() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["stage", "block", "Lunch", "--date", "2024-05-06", "--at", "12:00"]);
    run_cli(home.path(), &["stage", "block", "Walk", "--date", "2024-05-06", "--at", "13:00"]);

    let (code, out, _) = run_cli(home.path(), &["stage", "undo"]);
    assert_eq!(code, 0);
    assert!(out.contains("Discarded 2 staged blocks"));
    assert!(!home.path().join("calendar.json").exists());
}

#[test]
fn test_completions_become_patterns() {
    let home = tempfile::tempdir().unwrap();
    for day in 1..=12 {
        let date = format!("2024-05-{day:02}");
        let (code, _, _) = run_cli(
            home.path(),
            &[
                "events",
                "complete",
                "Deep work",
                "--date",
                &date,
                "--at",
                "09:00",
                "--flow",
                "crystal",
            ],
        );
        assert_eq!(code, 0);
    }

    let (code, out, _) = run_cli(home.path(), &["analyze", "--json"]);
    assert_eq!(code, 0);
    let snapshot = json(&out);
    let ids: Vec<&str> = snapshot["patterns"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["id"].as_str())
        .collect();
    assert!(ids.contains(&"temporal-focus-hours"));

    let (_, out, _) = run_cli(home.path(), &["insights", "--json"]);
    assert!(!json(&out).as_array().unwrap().is_empty());
}

#[test]
fn test_vibe_classify_and_record() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, err) = run_cli(home.path(), &["vibe", "record", "--date", "2024-05-06"]);
    assert_eq!(code, 1);
    assert!(err.contains("nothing to record"));

    for (title, at) in [("Email", "09:00"), ("Call", "11:00")] {
        run_cli(home.path(), &["events", "create", title, "--date", "2024-05-06", "--at", at]);
    }
    let (code, out, _) =
        run_cli(home.path(), &["vibe", "classify", "--date", "2024-05-06", "--json"]);
    assert_eq!(code, 0);
    let classified = json(&out);
    assert_eq!(classified["block_count"], 2);
    // nothing completed, short day
    assert_eq!(classified["vibe"], "taking_it_slow");

    let (code, _, _) = run_cli(home.path(), &["vibe", "record", "--date", "2024-05-06"]);
    assert_eq!(code, 0);
    let (_, out, _) = run_cli(home.path(), &["vibe", "history", "--json"]);
    assert_eq!(json(&out).as_array().unwrap().len(), 1);

    run_cli(home.path(), &["events", "create", "Email", "--date", "2024-05-05", "--at", "09:00"]);
    for date in ["2024-05-06", "2024-05-05"] {
        let (code, _, err) = run_cli(home.path(), &["vibe", "record", "--date", date]);
        assert_eq!(code, 1);
        assert!(err.contains("not after the last recorded day"));
    }
    let (_, out, _) = run_cli(home.path(), &["vibe", "history", "--json"]);
    assert_eq!(json(&out).as_array().unwrap().len(), 1);
}

#[test]
fn test_invalid_input_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, err) = run_cli(home.path(), &["stage", "chain", "Nope", "--at", "07:00"]);
    assert_eq!(code, 1);
    assert!(err.contains("no chain named 'Nope'"));

    let (code, _, err) = run_cli(home.path(), &["gaps", "--from", "25:00"]);
    assert_eq!(code, 1);
    assert!(err.contains("invalid time"));
}

#[test]
fn test_oversized_block_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    for minutes in ["10000000000000", "999999999999999999", "0"] {
        let (code, _, err) = run_cli(
            home.path(),
            &["stage", "block", "X", "--date", "2024-05-06", "--at", "09:00", "--minutes", minutes],
        );
        assert_eq!(code, 1, "--minutes {minutes} was accepted");
        assert!(err.contains("duration must be between 1 and 1440 minutes"));
    }

    let (code, out, _) = run_cli(home.path(), &["stage", "list"]);
    assert_eq!(code, 0);
    assert!(out.contains("nothing staged"));
    let (code, _, _) = run_cli(home.path(), &["gaps", "--date", "2024-05-06"]);
    assert_eq!(code, 0);
}
