//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own temporary home directory, with
//! the backend pointed at a closed port so every command exercises the
//! offline fallbacks.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

const OFFLINE_BACKEND: &str = "http://127.0.0.1:9/api";

struct Cli {
    home: TempDir,
}

impl Cli {
    fn new() -> Self {
        let cli = Self {
            home: tempfile::tempdir().expect("temp home"),
        };
        cli.success(&["config", "set", "api.base_url", OFFLINE_BACKEND]);
        cli.success(&["config", "set", "api.timeout_secs", "2"]);
        cli.success(&["config", "set", "session.tick_interval_ms", "5"]);
        cli
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_acupress"))
            .args(args)
            .env("HOME", self.home.path())
            .env_remove("ACUPRESS_ENV")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        (stdout, stderr, code)
    }

    /// Run a command with `input` on stdin and return stdout.
    fn success_with_input(&self, args: &[&str], input: &str) -> String {
        let mut child = Command::new(env!("CARGO_BIN_EXE_acupress"))
            .args(args)
            .env("HOME", self.home.path())
            .env_remove("ACUPRESS_ENV")
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn CLI command");
        child
            .stdin
            .take()
            .expect("piped stdin")
            .write_all(input.as_bytes())
            .expect("write stdin");
        let output = child.wait_with_output().expect("wait for CLI command");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "{args:?} failed: {stderr}");
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "{args:?} failed: {stderr}");
        stdout
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }
}

#[test]
fn test_config_set_get() {
    let cli = Cli::new();
    cli.success(&["config", "set", "guidance.sound_enabled", "true"]);
    let out = cli.success(&["config", "get", "guidance.sound_enabled"]);
    assert_eq!(out.trim(), "true");

    let list = cli.json(&["config", "list"]);
    assert_eq!(list["api"]["base_url"], OFFLINE_BACKEND);
}

#[test]
fn test_config_unknown_key_fails() {
    let cli = Cli::new();
    let (_, stderr, code) = cli.run(&["config", "get", "api.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));

    let (_, _, code) = cli.run(&["config", "set", "session.tick_interval_ms", "fast"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_reset() {
    let cli = Cli::new();
    cli.success(&["config", "reset"]);
    let out = cli.success(&["config", "get", "api.base_url"]);
    assert_eq!(out.trim(), "http://localhost:8001/api");
}

#[test]
fn test_technique_list_offline() {
    let cli = Cli::new();
    let out = cli.success(&["technique", "list"]);
    assert!(out.contains("Hegu (LI4)"));
    assert!(out.contains("Headache - Scalp Point A"));

    let mtc = cli.json(&["technique", "list", "--category", "mtc", "--json"]);
    let list = mtc.as_array().unwrap();
    assert!(!list.is_empty());
    assert!(list.iter().all(|t| t["category"] == "mtc"));
}

#[test]
fn test_technique_show() {
    let cli = Cli::new();
    let out = cli.success(&["technique", "show", "6"]);
    assert!(out.contains("Shenmen (HE7)"));

    let (_, stderr, code) = cli.run(&["technique", "show", "999"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("999"));
}

#[test]
fn test_favorites_offline() {
    let cli = Cli::new();
    cli.success(&["favorite", "add", "4"]);
    let out = cli.success(&["favorite", "add", "4"]);
    assert!(out.contains("already"));

    let list = cli.json(&["favorite", "list", "--json"]);
    assert_eq!(list[0]["id"], "4");

    let out = cli.success(&["history", "sync"]);
    assert!(out.contains("0 favorite change(s), 1 pending"));

    cli.success(&["favorite", "remove", "4"]);
    let list = cli.json(&["favorite", "list", "--json"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_favorite_toggle() {
    let cli = Cli::new();
    let out = cli.success(&["favorite", "toggle", "6"]);
    assert!(out.contains("added"));
    let list = cli.json(&["favorite", "list", "--json"]);
    assert_eq!(list[0]["id"], "6");

    let out = cli.success(&["favorite", "toggle", "6"]);
    assert!(out.contains("removed"));
    let list = cli.json(&["favorite", "list", "--json"]);
    assert!(list.as_array().unwrap().is_empty());
}

fn event_types(out: &str) -> Vec<String> {
    out.lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_session_keys_reset_then_resume() {
    let cli = Cli::new();
    let out = cli.success_with_input(
        &["session", "run", "5", "--duration", "600", "--json"],
        "s\nr\np\nq\n",
    );
    let types: Vec<String> = event_types(&out)
        .into_iter()
        .filter(|t| t != "Tick")
        .collect();
    assert_eq!(
        types,
        vec!["SessionStarted", "StateSnapshot", "SessionReset", "SessionResumed"]
    );

    let history = cli.json(&["history", "list", "--json"]);
    assert!(history.as_array().unwrap().is_empty());
}

#[test]
fn test_session_run_records_history() {
    let cli = Cli::new();
    let out = cli.success(&[
        "session", "run", "5", "--duration", "3", "--rating", "5", "--comment", "warm", "--json",
    ]);

    let events: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).expect("JSON line"))
        .collect();
    assert_eq!(events[0]["type"], "SessionStarted");
    assert_eq!(events[3]["type"], "SessionCompleted");
    let entry = events.last().unwrap();
    assert_eq!(entry["rating"], 5);
    assert_eq!(entry["synced"], false);

    let history = cli.json(&["history", "list", "--json"]);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["technique_id"], "5");
    assert_eq!(history[0]["review_comment"], "warm");

    let stats = cli.json(&["stats", "--json"]);
    assert_eq!(stats["total_sessions"], 1);
    assert_eq!(stats["total_time_practiced"], 3);
    assert_eq!(stats["streak_days"], 1);

    let out = cli.success(&["history", "sync"]);
    assert!(out.contains("1 pending"));
}

#[test]
fn test_session_without_rating_uses_default() {
    let cli = Cli::new();
    cli.success(&["config", "set", "session.rating_prompt_delay_secs", "0"]);
    cli.success(&["session", "run", "4", "--duration", "2"]);

    let history = cli.json(&["history", "list", "--json"]);
    assert_eq!(history[0]["rating"], 4);
    assert!(history[0]["review_comment"].is_null());
}

#[test]
fn test_session_rejects_bad_input() {
    let cli = Cli::new();
    let (_, _, code) = cli.run(&["session", "run", "4", "--rating", "9"]);
    assert_ne!(code, 0);

    let (_, stderr, code) = cli.run(&["session", "run", "4", "--duration", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("duration"));
}

#[test]
fn test_remote_history_needs_backend() {
    let cli = Cli::new();
    let (_, stderr, code) = cli.run(&["history", "list", "--remote"]);
    assert_ne!(code, 0);
    assert!(stderr.starts_with("error:") || stderr.contains("\nerror:"));
}
