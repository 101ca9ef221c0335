use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("checklist-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "entries": {
            "tasks": tasks.to_string(),
            "nextId": "4"
        }
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn stored_tasks(path: &PathBuf) -> serde_json::Value {
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    serde_json::from_str(stored["entries"]["tasks"].as_str().unwrap()).unwrap()
}

fn run(store_path: &PathBuf, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_checklist"))
        .args(args)
        .env("CHECKLIST_STORE_PATH", store_path)
        .env("CHECKLIST_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run checklist")
}

fn three_tasks() -> serde_json::Value {
    serde_json::json!([
        { "id": 1, "text": "a", "done": true },
        { "id": 2, "text": "b", "done": false },
        { "id": 3, "text": "c", "done": true }
    ])
}

#[test]
fn edit_command_updates_text_in_place() {
    let store_path = temp_path("cli-edit.json");
    write_store(&store_path, three_tasks());

    let output = run(&store_path, &["edit", "3", " new text "]);
    assert!(output.status.success());

    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks[2]["id"], 3);
    assert_eq!(tasks[2]["text"], "new text");
    assert_eq!(tasks[2]["done"], true);
}

#[test]
fn edit_command_with_blank_text_keeps_task() {
    let store_path = temp_path("cli-edit-blank.json");
    write_store(&store_path, three_tasks());

    let output = run(&store_path, &["edit", "2", "   "]);
    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("left unchanged"));
    assert_eq!(tasks[1]["text"], "b");
}

#[test]
fn edit_command_reports_missing_id() {
    let store_path = temp_path("cli-edit-missing.json");
    write_store(&store_path, serde_json::json!([]));

    let output = run(&store_path, &["edit", "7", "new text"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No task with id 7"));
}

#[test]
fn delete_command_removes_task() {
    let store_path = temp_path("cli-delete.json");
    write_store(&store_path, three_tasks());

    let output = run(&store_path, &["delete", "2"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deleted task: b (2)"));

    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks.as_array().unwrap().len(), 2);
}

#[test]
fn clear_done_keeps_open_tasks_in_order() {
    let store_path = temp_path("cli-clear-done.json");
    write_store(&store_path, three_tasks());

    let output = run(&store_path, &["clear-done"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cleared 2 completed tasks"));

    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks, serde_json::json!([{ "id": 2, "text": "b", "done": false }]));
}

#[test]
fn corrupt_store_values_start_fresh() {
    let store_path = temp_path("cli-corrupt.json");
    let content = serde_json::json!({
        "schema_version": 1,
        "entries": {
            "tasks": "[{\"id\":1,\"text\":\"a\",\"done\":false}]",
            "history": "[broken",
            "nextId": "9"
        }
    });
    std::fs::write(&store_path, content.to_string()).unwrap();

    let output = run(&store_path, &["add", "fresh"]);
    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added task: fresh (1)"));
    assert_eq!(tasks.as_array().unwrap().len(), 1);
}
