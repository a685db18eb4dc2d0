//! Integration tests for the `dt` CLI.
//!
//! Each test starts a mock API server, points `dt` at it with a temp config
//! directory, runs it as a subprocess and checks output and stored files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Get the path to the built `dt` binary.
fn dt_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dt");
    path
}

/// Run `dt` against `server` with `config_dir` as its config directory.
fn run_dt(config_dir: &Path, server: &Server, args: &[&str]) -> Output {
    Command::new(dt_bin())
        .args(args)
        .arg("--api-url")
        .arg(server.url())
        .env("DEVTRACKR_CONFIG_DIR", config_dir)
        .env_remove("DEVTRACKR_API_BASE_URL")
        .env_remove("DEVTRACKR_LOG")
        .output()
        .expect("failed to run dt")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn logged_in_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("session.json"),
        r#"{ "devtrackr_token": "tok-123" }"#,
    )
    .unwrap();
    dir
}

#[test]
fn health_reports_status() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    let out = run_dt(dir.path(), &server, &["health"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), format!("ok ({})\n", server.url()));
    mock.assert();
}

#[test]
fn login_stores_token_in_session_file() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/auth/login")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "ada@example.com".into()),
            Matcher::UrlEncoded("password".into(), "hunter22".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"tok-abc","token_type":"bearer"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    let out = run_dt(
        dir.path(),
        &server,
        &["login", " Ada@Example.com ", "--password", "hunter22"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "logged in as ada@example.com\n");
    mock.assert();

    let saved = fs::read_to_string(dir.path().join("session.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value["devtrackr_token"], "tok-abc");
}

#[test]
fn failed_login_exits_nonzero_with_server_message() {
    let mut server = Server::new();
    server
        .mock("POST", "/auth/login")
        .with_status(400)
        .with_body(r#"{"detail":"Incorrect email or password"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    let out = run_dt(dir.path(), &server, &["login", "a@b.co", "--password", "nope"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Incorrect email or password"));
    assert!(!dir.path().join("session.json").exists());
}

#[test]
fn goals_lists_with_bearer_token() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/goals")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(
            r#"[
                {"id": 2, "title": "Ship v1", "description": "cut the release\nwrite notes", "created_at": "2025-06-02T09:00:00"},
                {"id": 1, "title": "Learn Rust", "description": null, "created_at": "2025-06-01T09:00:00"}
            ]"#,
        )
        .create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["goals"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "\
#2 Ship v1 (2025-06-02)
    cut the release
    write notes
#1 Learn Rust (2025-06-01)
"
    );
    mock.assert();
}

#[test]
fn goals_json_output() {
    let mut server = Server::new();
    server
        .mock("GET", "/goals")
        .with_status(200)
        .with_body(r#"[{"id": 1, "title": "Learn Rust", "created_at": "2025-06-01T09:00:00"}]"#)
        .create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["goals", "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(value[0]["id"], 1);
    assert_eq!(value[0]["title"], "Learn Rust");
}

#[test]
fn goal_add_rejects_short_title_without_calling_api() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/goals").expect(0).create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["goal", "add", "ab"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "error: Title must be at least 3 characters.\n");
    mock.assert();
}

#[test]
fn goal_add_trims_and_posts() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/goals")
        .match_body(Matcher::Json(serde_json::json!({
            "title": "Read more",
            "description": "two books"
        })))
        .with_status(201)
        .with_body(r#"{"id": 7, "title": "Read more", "description": "two books", "created_at": "2025-06-03T09:00:00"}"#)
        .create();
    let dir = logged_in_dir();

    let out = run_dt(
        dir.path(),
        &server,
        &["goal", "add", "  Read more ", "-d", " two books "],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "created #7 Read more (2025-06-03)\n");
    mock.assert();
}

#[test]
fn tasks_listing_orders_open_first() {
    let mut server = Server::new();
    server
        .mock("GET", "/goals/4/tasks")
        .with_status(200)
        .with_body(
            r#"[
                {"id": 1, "goal_id": 4, "title": "Old open", "is_done": false, "created_at": "2025-06-01T10:00:00"},
                {"id": 2, "goal_id": 4, "title": "Finished", "is_done": true, "created_at": "2025-06-03T10:00:00"},
                {"id": 3, "goal_id": 4, "title": "New open", "is_done": false, "created_at": "2025-06-02T10:00:00"}
            ]"#,
        )
        .create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["tasks", "4"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "\
== goal #4 ==
[ ] #3 New open
[ ] #1 Old open
[x] #2 Finished
1/3 done
"
    );
}

#[test]
fn task_toggle_sends_flipped_flag() {
    let mut server = Server::new();
    server
        .mock("GET", "/goals/4/tasks")
        .with_status(200)
        .with_body(
            r#"[{"id": 9, "goal_id": 4, "title": "Write tests", "is_done": false, "created_at": "2025-06-01T10:00:00"}]"#,
        )
        .create();
    let toggle = server
        .mock("PUT", "/tasks/9")
        .match_body(Matcher::Json(serde_json::json!({ "is_done": true })))
        .with_status(200)
        .with_body(
            r#"{"id": 9, "goal_id": 4, "title": "Write tests", "is_done": true, "created_at": "2025-06-01T10:00:00"}"#,
        )
        .create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["task", "toggle", "4", "9"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "[x] #9 Write tests\n");
    toggle.assert();
}

#[test]
fn task_rm_unknown_task_fails_before_deleting() {
    let mut server = Server::new();
    server
        .mock("GET", "/goals/4/tasks")
        .with_status(200)
        .with_body("[]")
        .create();
    let delete = server.mock("DELETE", "/tasks/9").expect(0).create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["task", "rm", "4", "9", "--yes"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "error: task #9 not found in goal #4\n");
    delete.assert();
}

#[test]
fn unauthorized_response_clears_session() {
    let mut server = Server::new();
    server
        .mock("GET", "/goals")
        .with_status(401)
        .with_body(r#"{"detail":"Could not validate credentials"}"#)
        .create();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["goals"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Could not validate credentials"));
    assert!(!dir.path().join("session.json").exists());

    let out = run_dt(dir.path(), &server, &["whoami"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        stderr(&out),
        "error: not logged in (run `dt login <email>`)\n"
    );
}

#[test]
fn logout_removes_session_file() {
    let server = Server::new();
    let dir = logged_in_dir();

    let out = run_dt(dir.path(), &server, &["logout"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "logged out\n");
    assert!(!dir.path().join("session.json").exists());
}

#[test]
fn config_set_persists_and_show_reads_back() {
    let server = Server::new();
    let dir = TempDir::new().unwrap();

    let out = run_dt(dir.path(), &server, &["config", "set", "ui.show_key_hints", "false"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "ui.show_key_hints = false\n");

    let text = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(text.contains("show_key_hints = false"));

    let out = run_dt(dir.path(), &server, &["config", "show"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let shown = stdout(&out);
    assert!(shown.contains("ui.show_key_hints = false"));
    // --api-url wins over the file for this invocation
    assert!(shown.contains(&format!("api.base_url = {}", server.url())));
}

#[test]
fn config_set_rejects_unknown_key() {
    let server = Server::new();
    let dir = TempDir::new().unwrap();

    let out = run_dt(dir.path(), &server, &["config", "set", "ui.colour", "red"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown config key: ui.colour"));
    assert!(!dir.path().join("config.toml").exists());
}
