//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "studyplan-cli", "--"])
        .args(args)
        .env("STUDYPLAN_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_subject_add_and_list() {
    let (stdout, _, code) = run_cli(&["subject", "add", "CLI Test Subject", "--weight", "2"]);
    assert_eq!(code, 0, "subject add failed");
    assert!(stdout.contains("Subject created:"));

    let (stdout, _, code) = run_cli(&["subject", "list", "--json"]);
    assert_eq!(code, 0, "subject list failed");
    let subjects: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert!(subjects.as_array().is_some_and(|a| !a.is_empty()));
}

#[test]
fn test_subject_add_rejects_bad_weight() {
    let (_, stderr, code) = run_cli(&["subject", "add", "Bad Weight", "--weight=-1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("weight must be positive"));
}

#[test]
fn test_plan_create_and_schedule_week() {
    let (stdout, _, code) = run_cli(&["subject", "add", "Week Test Subject"]);
    assert_eq!(code, 0);
    let subject_id = stdout
        .lines()
        .next()
        .and_then(|l| l.strip_prefix("Subject created: "))
        .expect("missing subject id")
        .to_string();

    let (stdout, _, code) = run_cli(&[
        "plan",
        "create",
        "Week Test Plan",
        "--subjects",
        &subject_id,
    ]);
    assert_eq!(code, 0, "plan create failed");
    let plan_id = stdout
        .lines()
        .next()
        .and_then(|l| l.strip_prefix("Plan created: "))
        .expect("missing plan id")
        .to_string();

    let (stdout, _, code) = run_cli(&["schedule", "week", &plan_id, "--json"]);
    assert_eq!(code, 0, "schedule week failed");
    let schedule: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert_eq!(schedule["days"].as_array().map(|d| d.len()), Some(7));

    // Second invocation hits the cache and returns the same schedule
    let (stdout2, _, code) = run_cli(&["schedule", "week", &plan_id, "--json"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, stdout2);

    let (_, _, code) = run_cli(&["schedule", "week", &plan_id, "--regenerate"]);
    assert_eq!(code, 0, "schedule regenerate failed");
}

#[test]
fn test_schedule_week_without_plan_fails() {
    let (_, stderr, code) = run_cli(&["schedule", "week", "no-such-plan"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_schedule_preview() {
    let _ = run_cli(&["subject", "add", "Preview Subject"]);
    let (stdout, _, code) = run_cli(&["schedule", "preview", "--hours", "10", "--json"]);
    assert_eq!(code, 0, "schedule preview failed");
    let schedule: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert_eq!(schedule["days"].as_array().map(|d| d.len()), Some(7));
}

#[test]
fn test_session_log_and_list() {
    let (stdout, _, code) = run_cli(&["subject", "add", "Session Subject"]);
    assert_eq!(code, 0);
    let subject_id = stdout
        .lines()
        .next()
        .and_then(|l| l.strip_prefix("Subject created: "))
        .expect("missing subject id")
        .to_string();

    let (stdout, _, code) = run_cli(&["session", "log", &subject_id, "--minutes", "30"]);
    assert_eq!(code, 0, "session log failed");
    assert!(stdout.contains("Logged 30m"));

    let (_, _, code) = run_cli(&["session", "complete", &subject_id]);
    assert_eq!(code, 0, "session complete failed");

    let (stdout, _, code) = run_cli(&["session", "list", "--subject", &subject_id, "--json"]);
    assert_eq!(code, 0, "session list failed");
    let sessions: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert_eq!(sessions.as_array().map(|a| a.len()), Some(2));
}

#[test]
fn test_review_cycle() {
    let (stdout, _, code) = run_cli(&["subject", "add", "Review Subject"]);
    assert_eq!(code, 0);
    let subject_id = stdout
        .lines()
        .next()
        .and_then(|l| l.strip_prefix("Subject created: "))
        .expect("missing subject id")
        .to_string();

    // 4 days snaps down to the 3-day interval
    let (stdout, _, code) = run_cli(&["review", "schedule", &subject_id, "--days", "4"]);
    assert_eq!(code, 0, "review schedule failed");
    assert!(stdout.contains("(3d)"));
}

#[test]
fn test_config_show_and_get() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("schedule"));

    let (stdout, _, code) = run_cli(&["config", "get", "schedule.daily_goal_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());

    let (_, stderr, code) = run_cli(&["config", "get", "nope.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}
