// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs::OpenOptions;
use std::io::Write;

fn append(path: &Path, data: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(data.as_bytes()).unwrap();
}

fn channel() -> (BackChannel, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let channel = BackChannel::create(dir.path()).unwrap();
    (channel, dir)
}

#[test]
fn env_names_both_sinks() {
    let (channel, dir) = channel();
    let env = channel.env();
    assert_eq!(env[0].0, "AGENT_STATUS_FD");
    assert_eq!(env[1].0, "AGENT_LOG_FD");
    assert!(env[0].1.starts_with(dir.path().display().to_string().as_str()));
}

#[test]
fn collects_status_and_log_records() {
    let (channel, dir) = channel();
    append(
        &dir.path().join("status.ndjson"),
        "{\"agent_id\":\"a\",\"timestamp\":\"t1\",\"status\":\"started\"}\n\
         {\"agent_id\":\"a\",\"timestamp\":\"t2\",\"status\":\"completed\",\"data\":{\"cost_usd\":0.5}}\n",
    );
    append(
        &dir.path().join("log.ndjson"),
        "{\"agent_id\":\"a\",\"timestamp\":\"t1\",\"level\":\"info\",\"message\":\"working\"}\n",
    );

    let (reports, entries) = channel.drain();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].status, relay_core::ReportedStatus::Started);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "working");
}

#[test]
fn malformed_lines_are_dropped_not_fatal() {
    let (channel, dir) = channel();
    append(
        &dir.path().join("status.ndjson"),
        "not json at all\n\
         {\"agent_id\":\"a\",\"timestamp\":\"t\",\"status\":\"nonsense\"}\n\
         {\"agent_id\":\"a\",\"timestamp\":\"t\",\"status\":\"running\"}\n",
    );
    let (reports, _) = channel.drain();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, relay_core::ReportedStatus::Running);
}

#[test]
fn partial_write_is_held_until_completed() {
    let (channel, dir) = channel();
    let status = dir.path().join("status.ndjson");
    append(&status, "{\"agent_id\":\"a\",\"timestamp\":\"t\",");
    channel.poll();
    append(&status, "\"status\":\"progress\"}\n");

    let (reports, _) = channel.drain();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, relay_core::ReportedStatus::Progress);
}

#[test]
fn record_order_is_preserved_across_polls() {
    let (channel, dir) = channel();
    let log = dir.path().join("log.ndjson");
    append(&log, "{\"agent_id\":\"a\",\"timestamp\":\"t\",\"level\":\"info\",\"message\":\"one\"}\n");
    channel.poll();
    append(&log, "{\"agent_id\":\"a\",\"timestamp\":\"t\",\"level\":\"warn\",\"message\":\"two\"}\n");

    let (_, entries) = channel.drain();
    let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["one", "two"]);
}

#[test]
fn drain_takes_records_once() {
    let (channel, dir) = channel();
    append(
        &dir.path().join("log.ndjson"),
        "{\"agent_id\":\"a\",\"timestamp\":\"t\",\"level\":\"debug\",\"message\":\"m\"}\n",
    );
    let (_, first) = channel.drain();
    assert_eq!(first.len(), 1);
    let (_, second) = channel.drain();
    assert!(second.is_empty());
}

#[test]
fn extra_record_keys_are_tolerated() {
    let (channel, dir) = channel();
    append(
        &dir.path().join("status.ndjson"),
        "{\"agent_id\":\"a\",\"timestamp\":\"t\",\"status\":\"running\",\"custom\":123}\n",
    );
    let (reports, _) = channel.drain();
    assert_eq!(reports.len(), 1);
}
