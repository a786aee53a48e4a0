// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mention-content assembly.
//!
//! Builds the text the mention pass searches: comment bodies, item titles
//! and bodies, commit messages, and for pushes the diffs of the most
//! recent commits.

use relay_core::{EventContext, EventKind};
use relay_github::HostApi;
use std::sync::Arc;

/// How many trailing commits contribute their diffs on a push.
pub const DIFF_COMMIT_BUDGET: usize = 3;

/// Marker injected for workflow_run events, which carry no searchable body.
pub const WORKFLOW_RUN_MARKER: &str = "Event Type: workflow_run";

/// Assemble the searchable content for the mention pass.
pub async fn mention_content(ctx: &EventContext, host: &Arc<dyn HostApi>) -> String {
    let mut parts: Vec<String> = Vec::new();

    if ctx.kind.is_comment_like() {
        if let Some(body) = ctx.comment_body() {
            parts.push(body);
        }
        if let Some(title) = ctx.item_title() {
            parts.push(title);
        }
        if let Some(body) = ctx.item_body() {
            parts.push(body);
        }
    }

    match ctx.kind {
        EventKind::Push => {
            let commits = ctx.commits();
            for commit in &commits {
                parts.push(commit.message.clone());
            }
            let start = commits.len().saturating_sub(DIFF_COMMIT_BUDGET);
            if start > 0 {
                tracing::debug!(
                    skipped = start,
                    "push exceeds diff budget, older commit diffs omitted"
                );
            }
            for commit in &commits[start..] {
                match host.commit(&ctx.repo_full_name, &commit.id).await {
                    Ok(detail) => {
                        for file in detail.files {
                            if let Some(patch) = file.patch {
                                parts.push(patch);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(sha = %commit.id, error = %e, "commit diff fetch failed");
                    }
                }
            }
        }
        EventKind::PullRequest | EventKind::Issues => {
            if let Some(title) = ctx.item_title() {
                parts.push(title);
            }
            if let Some(body) = ctx.item_body() {
                parts.push(body);
            }
        }
        EventKind::WorkflowRun => {
            parts.push(WORKFLOW_RUN_MARKER.to_string());
            if let Some(name) = ctx.workflow_name() {
                parts.push(format!("Workflow: {name}"));
            }
        }
        _ => {}
    }

    parts.join("\n")
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
