// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger engine
//!
//! Two independent passes over the registry: the mention pass (ordered by
//! first occurrence in the content) and the event pass (ordered by
//! priority). The dispatcher runs mention-pass matches first and does not
//! deduplicate a descriptor matched by both.

pub mod content;
pub mod files;
pub mod matchers;

pub use content::{mention_content, DIFF_COMMIT_BUDGET, WORKFLOW_RUN_MARKER};
pub use files::{merged_pr_number, ChangedFiles, PR_FILES_TTL};

use relay_core::{Clock, EventContext, EventKind};
use relay_descriptor::Descriptor;

/// A descriptor admitted by one of the passes.
#[derive(Debug, Clone)]
pub struct TriggerMatch {
    pub descriptor: Descriptor,
    /// Human-readable activation reasons, e.g. `Path: docs/**/*.md`.
    pub reasons: Vec<String>,
    /// First-occurrence index for mention-pass ordering.
    pub mention_order: usize,
}

/// Event-trigger pass: priority-ordered matches for this event.
///
/// Mention-driven descriptors are gated out; they only participate in
/// [`agents_for_mentions`].
pub async fn agents_for_event<C: Clock>(
    descriptors: &[Descriptor],
    ctx: &EventContext,
    files: &ChangedFiles<C>,
) -> Vec<TriggerMatch> {
    let event_labels = ctx.labels();
    let mut matches = Vec::new();

    for descriptor in descriptors {
        if skipped_by_event_filter(descriptor, &ctx.kind) {
            continue;
        }
        if !descriptor.mentions.is_empty() {
            continue;
        }

        let mut reasons = Vec::new();
        let mut any_matcher = false;

        if descriptor.schedule.is_some() {
            any_matcher = true;
            if let Some(reason) = matchers::schedule_match(descriptor.schedule.as_deref(), ctx) {
                reasons.push(reason);
            }
        }
        if !descriptor.labels.is_empty() {
            any_matcher = true;
            if let Some(reason) = matchers::label_match(&descriptor.labels, &event_labels) {
                reasons.push(reason);
            }
        }
        if !descriptor.branches.is_empty() {
            any_matcher = true;
            if let Some(reason) =
                matchers::branch_match(&descriptor.branches, ctx.branch.as_deref())
            {
                reasons.push(reason);
            }
        }
        if !descriptor.paths.is_empty() {
            any_matcher = true;
            let changed = files.for_event(ctx).await;
            if let Some(reason) = matchers::path_match(&descriptor.paths, &changed) {
                reasons.push(reason);
            }
        }

        if !any_matcher {
            // nothing narrower configured: the event filter alone decides
            reasons.push(format!("Event: {}", ctx.kind));
        }
        if !reasons.is_empty() {
            matches.push(TriggerMatch {
                descriptor: descriptor.clone(),
                reasons,
                mention_order: 0,
            });
        }
    }

    // stable: equal priorities keep registry insertion order
    matches.sort_by(|a, b| b.descriptor.priority().cmp(&a.descriptor.priority()));
    matches
}

/// Mention pass: matches ordered by first occurrence in `content`.
pub fn agents_for_mentions(
    descriptors: &[Descriptor],
    content: &str,
    kind: &EventKind,
) -> Vec<TriggerMatch> {
    let mut matches = Vec::new();

    for descriptor in descriptors {
        if skipped_by_event_filter(descriptor, kind) {
            continue;
        }
        if descriptor.mentions.is_empty() {
            continue;
        }

        // workflow_run payloads have no searchable body; mention-driven
        // descriptors subscribed to them are admitted outright
        if *kind == EventKind::WorkflowRun {
            let token = descriptor.mentions[0].clone();
            matches.push(TriggerMatch {
                descriptor: descriptor.clone(),
                reasons: vec![format!("Mention: {token}")],
                mention_order: 0,
            });
            continue;
        }

        let mut first: Option<(usize, &str)> = None;
        for token in &descriptor.mentions {
            if let Some(index) = content.find(token.as_str()) {
                if first.map_or(true, |(best, _)| index < best) {
                    first = Some((index, token));
                }
            }
        }
        if let Some((index, token)) = first {
            matches.push(TriggerMatch {
                descriptor: descriptor.clone(),
                reasons: vec![format!("Mention: {token}")],
                mention_order: index,
            });
        }
    }

    matches.sort_by_key(|m| m.mention_order);
    matches
}

fn skipped_by_event_filter(descriptor: &Descriptor, kind: &EventKind) -> bool {
    !descriptor.events.is_empty() && !descriptor.events.iter().any(|e| e == kind.as_str())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
