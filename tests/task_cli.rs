use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn trk(data: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("trk").expect("binary");
    cmd.arg("--data").arg(data);
    cmd
}

fn parse_stdout(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("json envelope")
}

#[test]
fn create_list_show_round_trip() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    let assert = trk(&data)
        .args(["task", "new", "--name", "Write docs", "--description", "User guide", "--json"])
        .assert()
        .success();
    let created = parse_stdout(&assert.get_output().stdout);
    assert_eq!(created["schema_version"], "trk.v1");
    assert_eq!(created["status"], "success");
    assert_eq!(created["data"]["id"], 1);
    assert_eq!(created["data"]["status"], "new");

    let assert = trk(&data).args(["task", "list", "--json"]).assert().success();
    let listed = parse_stdout(&assert.get_output().stdout);
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["tasks"][0]["name"], "Write docs");

    let assert = trk(&data).args(["task", "show", "1", "--json"]).assert().success();
    let shown = parse_stdout(&assert.get_output().stdout);
    assert_eq!(shown["data"]["description"], "User guide");
}

#[test]
fn show_unknown_task_exits_2() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    trk(&data)
        .args(["task", "show", "9"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("task not found: 9"));
}

#[test]
fn overlapping_create_exits_3_and_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    trk(&data)
        .args([
            "task", "new", "--name", "Standup",
            "--start", "2024-05-20T10:00:00Z", "--duration", "30",
        ])
        .assert()
        .success();

    trk(&data)
        .args([
            "task", "new", "--name", "Overlap",
            "--start", "2024-05-20T10:15:00Z", "--duration", "10",
        ])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("overlaps scheduled item 1"));

    // exactly touching is allowed (half-open windows)
    trk(&data)
        .args([
            "task", "new", "--name", "Touching",
            "--start", "2024-05-20T10:30:00Z", "--duration", "10",
        ])
        .assert()
        .success();

    let assert = trk(&data).args(["task", "list", "--json"]).assert().success();
    let listed = parse_stdout(&assert.get_output().stdout);
    assert_eq!(listed["data"]["total"], 2);
}

#[test]
fn conflict_error_envelope_names_the_other_item() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    trk(&data)
        .args([
            "task", "new", "--name", "Standup",
            "--start", "2024-05-20T10:00:00Z", "--duration", "30",
        ])
        .assert()
        .success();

    let assert = trk(&data)
        .args([
            "task", "new", "--name", "Overlap", "--json",
            "--start", "2024-05-20T10:00:00Z", "--duration", "5",
        ])
        .assert()
        .failure()
        .code(3);
    let envelope = parse_stdout(&assert.get_output().stdout);
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"]["kind"], "conflict");
    assert_eq!(envelope["error"]["details"]["conflicts_with"], 1);
}

#[test]
fn update_merges_flags_and_unschedules() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    trk(&data)
        .args([
            "task", "new", "--name", "Plan",
            "--start", "2024-05-20T08:50:00Z", "--duration", "5",
        ])
        .assert()
        .success();

    let assert = trk(&data)
        .args(["task", "update", "1", "--status", "done", "--duration", "10", "--json"])
        .assert()
        .success();
    let updated = parse_stdout(&assert.get_output().stdout);
    assert_eq!(updated["data"]["status"], "done");
    assert_eq!(updated["data"]["duration"], 10);
    // untouched fields survive the update
    assert_eq!(updated["data"]["name"], "Plan");

    trk(&data)
        .args(["task", "update", "1", "--unschedule"])
        .assert()
        .success();

    let assert = trk(&data).args(["prioritized", "--json"]).assert().success();
    let prioritized = parse_stdout(&assert.get_output().stdout);
    assert_eq!(prioritized["data"]["total"], 0);
}

#[test]
fn unschedule_conflicts_with_schedule_flags() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    trk(&data)
        .args(["task", "new", "--name", "Plan"])
        .assert()
        .success();

    trk(&data)
        .args(["task", "update", "1", "--unschedule", "--duration", "10"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("--unschedule"));
}

#[test]
fn remove_and_clear_persist_across_invocations() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    for name in ["One", "Two", "Three"] {
        trk(&data)
            .args(["task", "new", "--name", name])
            .assert()
            .success();
    }

    trk(&data).args(["task", "remove", "2"]).assert().success();

    let assert = trk(&data).args(["task", "list", "--json"]).assert().success();
    let listed = parse_stdout(&assert.get_output().stdout);
    assert_eq!(listed["data"]["total"], 2);

    // the counter resyncs from the highest surviving id (3), so the next
    // invocation hands out 4 rather than reusing 2
    let assert = trk(&data)
        .args(["task", "new", "--name", "Four", "--json"])
        .assert()
        .success();
    let created = parse_stdout(&assert.get_output().stdout);
    assert_eq!(created["data"]["id"], 4);

    trk(&data).args(["task", "clear"]).assert().success();

    let assert = trk(&data).args(["task", "list", "--json"]).assert().success();
    let listed = parse_stdout(&assert.get_output().stdout);
    assert_eq!(listed["data"]["total"], 0);

    // an empty snapshot resyncs the counter to zero, so ids restart
    let assert = trk(&data)
        .args(["task", "new", "--name", "Fresh", "--json"])
        .assert()
        .success();
    let created = parse_stdout(&assert.get_output().stdout);
    assert_eq!(created["data"]["id"], 1);
}

#[test]
fn invalid_start_and_duration_are_user_errors() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("items.jsonl");

    trk(&data)
        .args(["task", "new", "--name", "Bad", "--start", "yesterday"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid start"));

    trk(&data)
        .args(["task", "new", "--name", "Bad", "--duration=-5"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("non-negative"));
}
