// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI surface specs: descriptor validation and registry listing.

use assert_cmd::Command;
use std::fs;

fn relay() -> Command {
    Command::cargo_bin("relay").unwrap()
}

#[test]
fn validate_accepts_a_wellformed_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("reviewer.agent.md");
    fs::write(
        &file,
        "---\nname: reviewer\nevents: [pull_request]\nmentions: [\"@reviewer\"]\n---\nReview carefully.\n",
    )
    .unwrap();

    relay()
        .args(["agents", "validate"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicates::str::contains("ok: reviewer"));
}

#[test]
fn validate_reports_every_violation() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.agent.md");
    fs::write(
        &file,
        "---\nname: broken\npriority: 500\nversion: \"1.2\"\nmentions: [oops]\n---\nbody\n",
    )
    .unwrap();

    let assert = relay()
        .args(["agents", "validate"])
        .arg(&file)
        .assert()
        .failure();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(output.contains("priority"), "{output}");
    assert!(output.contains("version"), "{output}");
    assert!(output.contains("mentions"), "{output}");
}

#[test]
fn validate_rejects_missing_front_matter() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.agent.md");
    fs::write(&file, "just a prompt, no header\n").unwrap();

    relay()
        .args(["agents", "validate"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicates::str::contains("front matter"));
}

#[test]
fn agents_list_shows_local_registry() {
    let dir = tempfile::tempdir().unwrap();
    let agents = dir.path().join(".a5c/agents");
    fs::create_dir_all(&agents).unwrap();
    fs::write(
        agents.join("nightly.agent.md"),
        "---\nname: nightly\nschedule: \"0 3 * * *\"\npriority: 70\n---\nTidy up.\n",
    )
    .unwrap();

    relay()
        .args(["agents", "list", "--working-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("nightly"))
        .stdout(predicates::str::contains("priority=70"));
}

#[test]
fn agents_list_handles_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    relay()
        .args(["agents", "list", "--working-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("no agents found"));
}
