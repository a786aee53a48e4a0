// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run results, back-channel records, and dispatch summaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::id::AgentId;

/// Status value a subprocess may report on its status sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportedStatus {
    Started,
    Running,
    Progress,
    Completed,
    Failed,
}

/// Severity of a subprocess log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportedLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One status record from the subprocess status sink.
///
/// Records arrive as newline-delimited JSON. Unknown extra keys are ignored;
/// `data` carries any structured payload the subprocess attaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub agent_id: String,
    pub timestamp: String,
    pub status: ReportedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One log record from the subprocess log sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub agent_id: String,
    pub timestamp: String,
    pub level: ReportedLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Outcome of executing one agent against one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub agent_id: AgentId,
    /// Human-readable activation reasons, e.g. `Mention: @reviewer`.
    pub triggered_by: Vec<String>,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub status_reports: Vec<StatusReport>,
    pub log_entries: Vec<LogEntry>,
    /// Files published for this run, stdout/stderr/command/prompt at minimum.
    pub artifacts: Vec<PathBuf>,
    pub cost_usd: Option<f64>,
    pub duration_ms: u64,
    /// Failure description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// A failed result that never reached the subprocess.
    pub fn failed(agent_id: AgentId, triggered_by: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            agent_id,
            triggered_by,
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            status_reports: Vec::new(),
            log_entries: Vec::new(),
            artifacts: Vec::new(),
            cost_usd: None,
            duration_ms: 0,
            error: Some(error.into()),
        }
    }

    /// Sum the cost fields found in status and log records.
    ///
    /// Recognized keys: `cost_usd`, `cost`, `usage.total_cost`,
    /// `usage.cost_usd`, searched in both `data` and `context` payloads.
    pub fn accumulate_cost(&mut self) {
        let mut total = 0.0;
        let mut seen = false;
        let payloads = self
            .status_reports
            .iter()
            .filter_map(|r| r.data.as_ref())
            .chain(self.log_entries.iter().filter_map(|l| l.context.as_ref()));
        for payload in payloads {
            if let Some(cost) = extract_cost(payload) {
                total += cost;
                seen = true;
            }
        }
        if seen {
            self.cost_usd = Some(total);
        }
    }
}

fn extract_cost(payload: &Value) -> Option<f64> {
    for path in [
        &["cost_usd"][..],
        &["cost"][..],
        &["usage", "total_cost"][..],
        &["usage", "cost_usd"][..],
    ] {
        let mut cur = payload;
        let mut found = true;
        for key in path {
            match cur.get(key) {
                Some(v) => cur = v,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            if let Some(n) = cur.as_f64() {
                return Some(n);
            }
        }
    }
    None
}

/// Aggregated outcome of one dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub success: bool,
    pub agents_run: usize,
    pub agents_successful: usize,
    pub agents_failed: usize,
    pub agent_results: Vec<RunResult>,
    pub summary_text: String,
}

impl DispatchSummary {
    /// Aggregate per-agent results; success is the conjunction of per-agent
    /// success flags (vacuously true when nothing ran).
    pub fn from_results(results: Vec<RunResult>) -> Self {
        let agents_run = results.len();
        let agents_successful = results.iter().filter(|r| r.success).count();
        let agents_failed = agents_run - agents_successful;
        let summary_text = if agents_run == 0 {
            "no agents matched".to_string()
        } else {
            let names: Vec<&str> = results.iter().map(|r| r.agent_id.as_str()).collect();
            format!(
                "{}/{} agents succeeded: {}",
                agents_successful,
                agents_run,
                names.join(", ")
            )
        };
        Self {
            success: agents_failed == 0,
            agents_run,
            agents_successful,
            agents_failed,
            agent_results: results,
            summary_text,
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
