// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository event model.
//!
//! An [`EventContext`] is the read-only record one dispatch operates on. It
//! wraps the raw webhook payload and exposes the typed accessors the trigger
//! matchers and prompt assembly need; nothing here mutates the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of repository event being dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Push,
    PullRequest,
    Issues,
    IssueComment,
    PullRequestReview,
    PullRequestReviewComment,
    /// Scheduled tick; carries its cron line in the event context.
    Schedule,
    /// Manual invocation.
    WorkflowDispatch,
    WorkflowRun,
    /// Forward-compatible catch-all for event names we don't model.
    Other(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            "issues" => Self::Issues,
            "issue_comment" => Self::IssueComment,
            "pull_request_review" => Self::PullRequestReview,
            "pull_request_review_comment" => Self::PullRequestReviewComment,
            "schedule" => Self::Schedule,
            "workflow_dispatch" => Self::WorkflowDispatch,
            "workflow_run" => Self::WorkflowRun,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Issues => "issues",
            Self::IssueComment => "issue_comment",
            Self::PullRequestReview => "pull_request_review",
            Self::PullRequestReviewComment => "pull_request_review_comment",
            Self::Schedule => "schedule",
            Self::WorkflowDispatch => "workflow_dispatch",
            Self::WorkflowRun => "workflow_run",
            Self::Other(name) => name,
        }
    }

    /// True for events that carry a comment or review body.
    pub fn is_comment_like(&self) -> bool {
        matches!(
            self,
            Self::IssueComment | Self::PullRequestReview | Self::PullRequestReviewComment
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// A commit as it appears in a push payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

impl CommitRef {
    /// Union of added, modified, and removed paths, in payload order.
    pub fn touched_files(&self) -> Vec<String> {
        let mut files =
            Vec::with_capacity(self.added.len() + self.modified.len() + self.removed.len());
        files.extend(self.added.iter().cloned());
        files.extend(self.modified.iter().cloned());
        files.extend(self.removed.iter().cloned());
        files
    }
}

/// Read-only context for one dispatched event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub kind: EventKind,
    pub action: Option<String>,
    pub actor: String,
    pub repo_full_name: String,
    pub branch: Option<String>,
    pub sha: Option<String>,
    /// Cron line of the tick, present only for schedule events.
    pub cron_expression: Option<String>,
    pub payload: Value,
}

impl EventContext {
    /// Build a context from an event name and its raw webhook payload.
    pub fn from_payload(kind: EventKind, payload: Value) -> Self {
        let action = str_at(&payload, &["action"]);
        let actor = str_at(&payload, &["sender", "login"]).unwrap_or_default();
        let repo_full_name = str_at(&payload, &["repository", "full_name"]).unwrap_or_default();

        let branch = match kind {
            EventKind::Push => {
                str_at(&payload, &["ref"]).map(|r| {
                    r.strip_prefix("refs/heads/").map(str::to_string).unwrap_or(r)
                })
            }
            EventKind::PullRequest
            | EventKind::PullRequestReview
            | EventKind::PullRequestReviewComment => {
                str_at(&payload, &["pull_request", "head", "ref"])
            }
            _ => str_at(&payload, &["repository", "default_branch"]),
        };

        let sha = match kind {
            EventKind::Push => str_at(&payload, &["after"]),
            EventKind::PullRequest => str_at(&payload, &["pull_request", "head", "sha"]),
            EventKind::WorkflowRun => str_at(&payload, &["workflow_run", "head_sha"]),
            _ => None,
        };

        let cron_expression = match kind {
            EventKind::Schedule => str_at(&payload, &["schedule"]),
            _ => None,
        };

        Self {
            kind,
            action,
            actor,
            repo_full_name,
            branch,
            sha,
            cron_expression,
            payload,
        }
    }

    /// Repository owner (the part before the slash).
    pub fn owner(&self) -> &str {
        self.repo_full_name.split('/').next().unwrap_or_default()
    }

    /// Repository name (the part after the slash).
    pub fn repo_name(&self) -> &str {
        self.repo_full_name.split('/').nth(1).unwrap_or_default()
    }

    /// Whether the repository owner is an organization.
    pub fn owner_is_org(&self) -> bool {
        str_at(&self.payload, &["repository", "owner", "type"]).as_deref() == Some("Organization")
    }

    /// Labels attached to the event's issue or pull request.
    ///
    /// Labeling actions carry the single label being applied; PR and issue
    /// payloads carry the full label list.
    pub fn labels(&self) -> Vec<String> {
        if let Some(label) = str_at(&self.payload, &["label", "name"]) {
            return vec![label];
        }
        for container in ["pull_request", "issue"] {
            if let Some(items) = self.payload.get(container).and_then(|v| v.get("labels")) {
                if let Some(arr) = items.as_array() {
                    return arr
                        .iter()
                        .filter_map(|l| l.get("name").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect();
                }
            }
        }
        Vec::new()
    }

    /// Number of the pull request or issue this event refers to, if any.
    pub fn item_number(&self) -> Option<u64> {
        for path in [
            &["pull_request", "number"][..],
            &["issue", "number"][..],
            &["number"][..],
        ] {
            if let Some(n) = num_at(&self.payload, path) {
                return Some(n);
            }
        }
        None
    }

    /// Title of the issue or pull request, if present.
    pub fn item_title(&self) -> Option<String> {
        str_at(&self.payload, &["pull_request", "title"])
            .or_else(|| str_at(&self.payload, &["issue", "title"]))
    }

    /// Body of the issue or pull request, if present.
    pub fn item_body(&self) -> Option<String> {
        str_at(&self.payload, &["pull_request", "body"])
            .or_else(|| str_at(&self.payload, &["issue", "body"]))
    }

    /// Body of the comment or review that produced this event.
    pub fn comment_body(&self) -> Option<String> {
        str_at(&self.payload, &["comment", "body"])
            .or_else(|| str_at(&self.payload, &["review", "body"]))
    }

    /// Commits carried by a push payload, in payload order.
    pub fn commits(&self) -> Vec<CommitRef> {
        self.payload
            .get("commits")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|c| serde_json::from_value(c.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The head commit of a push payload.
    pub fn head_commit(&self) -> Option<CommitRef> {
        self.payload
            .get("head_commit")
            .cloned()
            .and_then(|c| serde_json::from_value(c).ok())
    }

    /// Name of the workflow for workflow_run events.
    pub fn workflow_name(&self) -> Option<String> {
        str_at(&self.payload, &["workflow_run", "name"])
    }
}

fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str().map(str::to_string)
}

fn num_at(value: &Value, path: &[&str]) -> Option<u64> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_u64()
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
