// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sub-matchers for the event-trigger pass.
//!
//! Branch and path patterns are globs, never regexes: `*` and `?` stop at
//! `/`, `**` crosses directories. Schedule matching is exact cron-string
//! equality, not arithmetic intersection.

use globset::GlobBuilder;
use relay_core::{EventContext, EventKind};

/// Compile one pattern with `/`-aware wildcards.
fn glob(pattern: &str) -> Option<globset::GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .ok()
}

/// Schedule matcher: fires only on scheduled ticks whose cron line equals
/// the descriptor's, after whitespace trim.
pub fn schedule_match(schedule: Option<&str>, ctx: &EventContext) -> Option<String> {
    let schedule = schedule?;
    if ctx.kind != EventKind::Schedule {
        return None;
    }
    let tick = ctx.cron_expression.as_deref()?;
    if schedule.trim() == tick.trim() {
        Some(format!("Schedule: {}", schedule.trim()))
    } else {
        None
    }
}

/// Label matcher: any descriptor label present on the event.
pub fn label_match(labels: &[String], event_labels: &[String]) -> Option<String> {
    labels
        .iter()
        .find(|label| event_labels.iter().any(|have| have == *label))
        .map(|label| format!("Label: {label}"))
}

/// Branch matcher: glob semantics over the event branch.
pub fn branch_match(patterns: &[String], branch: Option<&str>) -> Option<String> {
    let branch = branch?;
    patterns
        .iter()
        .find(|pattern| matches_branch(pattern, branch))
        .map(|pattern| format!("Branch: {pattern}"))
}

fn matches_branch(pattern: &str, branch: &str) -> bool {
    if !pattern.contains('*') && !pattern.contains('?') {
        return pattern == branch;
    }
    glob(pattern).is_some_and(|matcher| matcher.is_match(branch))
}

/// Path matcher: any pattern hitting any changed file.
pub fn path_match(patterns: &[String], files: &[String]) -> Option<String> {
    for pattern in patterns {
        let Some(matcher) = glob(pattern) else {
            tracing::warn!(pattern, "ignoring invalid path pattern");
            continue;
        };
        if files.iter().any(|file| matcher.is_match(file)) {
            return Some(format!("Path: {pattern}"));
        }
    }
    None
}

#[cfg(test)]
#[path = "matchers_tests.rs"]
mod tests;
