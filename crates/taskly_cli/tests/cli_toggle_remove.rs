use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskly-{nanos}-{file_name}"))
}

fn write_seed(path: &Path) {
    let content = serde_json::json!([
        {"id": 1, "title": "first"},
        {"id": 3, "title": "third"},
        {"id": 2, "title": "second", "description": "middle"}
    ]);
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run_json(args: &[&str], name: &str) -> serde_json::Value {
    let exe = env!("CARGO_BIN_EXE_taskly");
    let seed = temp_path(name);
    write_seed(&seed);

    let output = Command::new(exe)
        .arg("--json")
        .arg("--seed")
        .arg(&seed)
        .args(args)
        .env("TASKLY_CONFIG_PATH", temp_path("no-config.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run taskly");
    std::fs::remove_file(&seed).ok();

    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn ids(payload: &serde_json::Value) -> Vec<u64> {
    payload["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|task| task["id"].as_u64().expect("numeric id"))
        .collect()
}

#[test]
fn toggle_command_marks_task_done() {
    let payload = run_json(&["toggle", "2"], "cli-toggle.json");

    assert_eq!(payload["changed"], true);
    assert_eq!(payload["task"]["id"], 2);
    assert_eq!(payload["task"]["completed"], true);
    assert_eq!(ids(&payload), vec![3, 2, 1]);
    assert_eq!(payload["progress"]["completed"], 1);
    assert_eq!(payload["progress"]["rounded_percentage"], 33);
}

#[test]
fn toggle_command_unknown_id_is_noop() {
    let payload = run_json(&["toggle", "9"], "cli-toggle-missing.json");

    assert_eq!(payload["changed"], false);
    assert_eq!(ids(&payload), vec![3, 2, 1]);
    assert_eq!(payload["progress"]["completed"], 0);
}

#[test]
fn remove_command_keeps_order() {
    let payload = run_json(&["remove", "2"], "cli-remove.json");

    assert_eq!(payload["changed"], true);
    assert_eq!(payload["task"]["description"], "middle");
    assert_eq!(ids(&payload), vec![3, 1]);
}

#[test]
fn remove_command_unknown_id_is_noop() {
    let payload = run_json(&["remove", "42"], "cli-remove-missing.json");

    assert_eq!(payload["changed"], false);
    assert_eq!(ids(&payload), vec![3, 2, 1]);
}

#[test]
fn toggle_command_rejects_non_numeric_id() {
    let exe = env!("CARGO_BIN_EXE_taskly");
    let output = Command::new(exe)
        .args(["toggle", "first"])
        .env("TASKLY_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run taskly");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
