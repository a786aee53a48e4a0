// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end dispatch specs through the binary.
//!
//! Payloads are crafted so no host API round-trips are needed: schedule
//! ticks have no actor, and push payloads carry explicit whitelists and no
//! commits.

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;

fn relay() -> Command {
    Command::cargo_bin("relay").unwrap()
}

fn write_agent(root: &Path, name: &str, content: &str) {
    let agents = root.join(".a5c/agents");
    fs::create_dir_all(&agents).unwrap();
    fs::write(agents.join(name), content).unwrap();
}

fn write_payload(root: &Path, payload: &Value) -> std::path::PathBuf {
    let path = root.join("payload.json");
    fs::write(&path, serde_json::to_string(payload).unwrap()).unwrap();
    path
}

fn run_json(root: &Path, event: &str, payload: &Value) -> (bool, Value) {
    let payload_path = write_payload(root, payload);
    let output = relay()
        .args(["run", "--event", event, "--json", "--working-dir"])
        .arg(root)
        .arg("--payload")
        .arg(&payload_path)
        .output()
        .unwrap();
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|_| {
        panic!(
            "no summary json; stdout={} stderr={}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (output.status.success(), summary)
}

#[test]
fn scheduled_tick_runs_matching_cron_agent() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "nightly.agent.md",
        "---\nname: nightly\nschedule: \"0 3 * * *\"\ncli_command: \"echo swept\"\n---\nSweep.\n",
    );
    write_agent(
        dir.path(),
        "weekly.agent.md",
        "---\nname: weekly\nschedule: \"0 3 * * 0\"\ncli_command: \"echo never\"\n---\nWeekly.\n",
    );

    let (ok, summary) = run_json(
        dir.path(),
        "schedule",
        &serde_json::json!({"schedule": "0 3 * * *"}),
    );
    assert!(ok);
    assert_eq!(summary["agents_run"], 1);
    assert_eq!(summary["agent_results"][0]["agent_id"], "nightly");
    assert_eq!(
        summary["agent_results"][0]["stdout"].as_str().unwrap().trim(),
        "swept"
    );
}

#[test]
fn push_dispatch_orders_by_priority_and_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "low.agent.md",
        "---\nname: low\npriority: 10\nevents: [push]\nuser_whitelist: [octocat]\ncli_command: \"echo low\"\n---\nL.\n",
    );
    write_agent(
        dir.path(),
        "high.agent.md",
        "---\nname: high\npriority: 90\nevents: [push]\nuser_whitelist: [octocat]\ncli_command: \"echo high\"\n---\nH.\n",
    );

    let (ok, summary) = run_json(
        dir.path(),
        "push",
        &serde_json::json!({
            "ref": "refs/heads/main",
            "sender": {"login": "octocat"},
            "repository": {"full_name": "acme/site", "owner": {"type": "User"}},
            "commits": [],
        }),
    );
    assert!(ok);
    assert_eq!(summary["agents_run"], 2);
    assert_eq!(summary["agent_results"][0]["agent_id"], "high");
    assert_eq!(summary["agent_results"][1]["agent_id"], "low");
    assert_eq!(summary["success"], true);
}

#[test]
fn failing_agent_fails_the_dispatch_but_all_run() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "bad.agent.md",
        "---\nname: bad\npriority: 90\nevents: [push]\nuser_whitelist: [octocat]\ncli_command: \"exit 7\"\n---\nB.\n",
    );
    write_agent(
        dir.path(),
        "good.agent.md",
        "---\nname: good\npriority: 10\nevents: [push]\nuser_whitelist: [octocat]\ncli_command: \"echo fine\"\n---\nG.\n",
    );

    let (ok, summary) = run_json(
        dir.path(),
        "push",
        &serde_json::json!({
            "ref": "refs/heads/main",
            "sender": {"login": "octocat"},
            "repository": {"full_name": "acme/site", "owner": {"type": "User"}},
            "commits": [],
        }),
    );
    assert!(!ok, "dispatch with a failed agent exits non-zero");
    assert_eq!(summary["agents_run"], 2);
    assert_eq!(summary["agents_failed"], 1);
    assert_eq!(summary["agent_results"][0]["exit_code"], 7);
    assert_eq!(summary["agent_results"][1]["success"], true);
}

#[test]
fn prompt_template_renders_event_context_into_subprocess() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "templated.agent.md",
        "---\nname: templated\nevents: [push]\nuser_whitelist: [octocat]\ncli_command: \"cat {{prompt_path}}\"\n---\n{{event.kind}} on {{repo.full_name}} by {{event.actor}}\n",
    );

    let (ok, summary) = run_json(
        dir.path(),
        "push",
        &serde_json::json!({
            "ref": "refs/heads/main",
            "sender": {"login": "octocat"},
            "repository": {"full_name": "acme/site", "owner": {"type": "User"}},
            "commits": [],
        }),
    );
    assert!(ok);
    assert_eq!(
        summary["agent_results"][0]["stdout"].as_str().unwrap().trim(),
        "push on acme/site by octocat"
    );
}

#[test]
fn artifacts_directory_is_published_per_run() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "worker.agent.md",
        "---\nname: worker\nevents: [push]\nuser_whitelist: [octocat]\ncli_command: \"echo artifact-test\"\n---\nW.\n",
    );

    let (_, summary) = run_json(
        dir.path(),
        "push",
        &serde_json::json!({
            "ref": "refs/heads/main",
            "sender": {"login": "octocat"},
            "repository": {"full_name": "acme/site", "owner": {"type": "User"}},
            "commits": [],
        }),
    );
    let artifacts: Vec<String> = summary["agent_results"][0]["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(artifacts.iter().any(|a| a.ends_with("prompt.md")));
    assert!(artifacts.iter().any(|a| a.ends_with("command.txt")));
    assert!(artifacts.iter().any(|a| a.ends_with("stdout.log")));
    assert!(artifacts.iter().any(|a| a.ends_with("stderr.log")));
    let stdout_log = artifacts.iter().find(|a| a.ends_with("stdout.log")).unwrap();
    assert_eq!(fs::read_to_string(stdout_log).unwrap().trim(), "artifact-test");
}
