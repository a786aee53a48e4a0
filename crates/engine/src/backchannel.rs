// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess back-channel.
//!
//! Two append-only NDJSON sinks per run. The subprocess learns their paths
//! from `AGENT_STATUS_FD` and `AGENT_LOG_FD`; the orchestrator polls for
//! appended lines while the child runs. Malformed or partial lines are
//! logged and dropped, never fatal.

use parking_lot::Mutex;
use relay_core::{LogEntry, ReportedLevel, ReportedStatus, StatusReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable pointing at the status sink.
pub const ENV_STATUS_SINK: &str = "AGENT_STATUS_FD";
/// Environment variable pointing at the log sink.
pub const ENV_LOG_SINK: &str = "AGENT_LOG_FD";

#[derive(Default)]
struct SinkState {
    /// Byte offset of the first unconsumed line.
    offset: usize,
    /// Trailing partial line carried until its newline arrives.
    partial: String,
}

/// One run's pair of back-channel sinks.
#[derive(Clone)]
pub struct BackChannel {
    status_path: PathBuf,
    log_path: PathBuf,
    status_state: Arc<Mutex<SinkState>>,
    log_state: Arc<Mutex<SinkState>>,
    status_reports: Arc<Mutex<Vec<StatusReport>>>,
    log_entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl BackChannel {
    /// Create empty sink files inside the run directory.
    pub fn create(run_dir: &Path) -> std::io::Result<Self> {
        let status_path = run_dir.join("status.ndjson");
        let log_path = run_dir.join("log.ndjson");
        std::fs::write(&status_path, "")?;
        std::fs::write(&log_path, "")?;
        Ok(Self {
            status_path,
            log_path,
            status_state: Arc::new(Mutex::new(SinkState::default())),
            log_state: Arc::new(Mutex::new(SinkState::default())),
            status_reports: Arc::new(Mutex::new(Vec::new())),
            log_entries: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Environment entries handed to the subprocess.
    pub fn env(&self) -> Vec<(String, String)> {
        vec![
            (
                ENV_STATUS_SINK.to_string(),
                self.status_path.display().to_string(),
            ),
            (ENV_LOG_SINK.to_string(), self.log_path.display().to_string()),
        ]
    }

    /// Consume newly appended lines from both sinks, forwarding each
    /// record to the orchestrator log.
    pub fn poll(&self) {
        for line in read_new_lines(&self.status_path, &self.status_state) {
            match serde_json::from_str::<StatusReport>(&line) {
                Ok(report) => {
                    log_status(&report);
                    self.status_reports.lock().push(report);
                }
                Err(e) => {
                    tracing::warn!(error = %e, line, "discarding malformed status record");
                }
            }
        }
        for line in read_new_lines(&self.log_path, &self.log_state) {
            match serde_json::from_str::<LogEntry>(&line) {
                Ok(entry) => {
                    log_entry(&entry);
                    self.log_entries.lock().push(entry);
                }
                Err(e) => {
                    tracing::warn!(error = %e, line, "discarding malformed log record");
                }
            }
        }
    }

    /// Final poll and take of everything received.
    pub fn drain(&self) -> (Vec<StatusReport>, Vec<LogEntry>) {
        self.poll();
        (
            std::mem::take(&mut *self.status_reports.lock()),
            std::mem::take(&mut *self.log_entries.lock()),
        )
    }
}

/// Read complete lines appended since the last call. A trailing fragment
/// without a newline stays buffered until the writer finishes it.
fn read_new_lines(path: &Path, state: &Mutex<SinkState>) -> Vec<String> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    let mut state = state.lock();
    if state.offset > content.len() {
        // sink was truncated; start over rather than panic on slicing
        state.offset = 0;
        state.partial.clear();
    }
    let fresh = String::from_utf8_lossy(&content[state.offset..]).into_owned();
    state.offset = content.len();

    let combined = format!("{}{}", state.partial, fresh);
    state.partial.clear();

    let mut lines = Vec::new();
    let mut rest = combined.as_str();
    while let Some(newline) = rest.find('\n') {
        let line = rest[..newline].trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
        rest = &rest[newline + 1..];
    }
    state.partial = rest.to_string();
    lines
}

fn log_status(report: &StatusReport) {
    match report.status {
        ReportedStatus::Failed => {
            tracing::warn!(agent = %report.agent_id, status = ?report.status, "agent status");
        }
        _ => {
            tracing::info!(agent = %report.agent_id, status = ?report.status, "agent status");
        }
    }
}

fn log_entry(entry: &LogEntry) {
    match entry.level {
        ReportedLevel::Debug => {
            tracing::debug!(agent = %entry.agent_id, "{}", entry.message);
        }
        ReportedLevel::Info => {
            tracing::info!(agent = %entry.agent_id, "{}", entry.message);
        }
        ReportedLevel::Warn => {
            tracing::warn!(agent = %entry.agent_id, "{}", entry.message);
        }
        ReportedLevel::Error => {
            tracing::error!(agent = %entry.agent_id, "{}", entry.message);
        }
    }
}

#[cfg(test)]
#[path = "backchannel_tests.rs"]
mod tests;
