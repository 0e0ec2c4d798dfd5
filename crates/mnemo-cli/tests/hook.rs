use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mnemo() -> Command {
    Command::cargo_bin("mnemo").unwrap()
}

fn hook_cmd(home: &TempDir) -> Command {
    let mut cmd = mnemo();
    cmd.arg("hook")
        .env("MNEMO_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("MNEMO_SYNC_REMOTE");
    cmd
}

#[test]
fn garbage_payload_exits_successfully_and_silently() {
    let home = TempDir::new().unwrap();
    hook_cmd(&home)
        .write_stdin("this is not json")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn empty_stdin_exits_successfully() {
    let home = TempDir::new().unwrap();
    hook_cmd(&home)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn session_start_without_sync_is_a_quiet_noop() {
    let home = TempDir::new().unwrap();
    let payload = serde_json::json!({
        "session_id": "s1",
        "cwd": "/work/demo",
        "hook_event_name": "SessionStart",
    });
    hook_cmd(&home)
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn stop_event_advances_cursor_even_without_classifier() {
    let home = TempDir::new().unwrap();
    let transcript = home.path().join("t.jsonl");
    std::fs::write(
        &transcript,
        concat!(
            r#"{"role":"user","content":"Add a login endpoint"}"#,
            "\n",
            r#"{"role":"assistant","content":[{"type":"tool_use","name":"Edit","input":{"file_path":"src/api.rs"}}]}"#,
            "\n",
        ),
    )
    .unwrap();

    let payload = serde_json::json!({
        "session_id": "s1",
        "transcript_path": transcript,
        "cwd": "/work/demo",
        "hook_event_name": "Stop",
    });
    hook_cmd(&home)
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // No credentials: nothing recorded, but the region is consumed.
    let cursors = home.path().join("projects/-work-demo/.cursors.json");
    let content = std::fs::read_to_string(cursors).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["s1"], 2);

    let handoff = home.path().join("projects/-work-demo/HANDOFF.md");
    assert!(!handoff.exists());
}

#[test]
fn missing_transcript_path_is_tolerated() {
    let home = TempDir::new().unwrap();
    let payload = serde_json::json!({
        "session_id": "s1",
        "cwd": "/work/demo",
        "hook_event_name": "Stop",
    });
    hook_cmd(&home)
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
