// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deep-merge of a resolved base descriptor into its child.
//!
//! Scalars: child wins when set. List fields: union with dedup, first-seen
//! order across the whole chain. `envs`: per-key, child wins. The child's
//! identity and source always survive.

use crate::types::{AgentDiscovery, Descriptor};

/// Exact token replaced by the base prompt during inheritance. No other
/// template expression is touched here.
pub const BASE_PROMPT_TOKEN: &str = "{{base-prompt}}";

/// Merge `base` under `child`, returning the resolved child.
pub fn merge(base: Descriptor, child: Descriptor) -> Descriptor {
    let prompt_body = merge_bodies(&base.prompt_body, &child.prompt_body);

    let mut envs = base.envs;
    for (key, value) in child.envs {
        envs.insert(key, value);
    }

    Descriptor {
        id: child.id,
        name: child.name,
        description: child.description.or(base.description),
        category: child.category.or(base.category),
        version: child.version.or(base.version),
        usage_context: child.usage_context.or(base.usage_context),
        invocation_context: child.invocation_context.or(base.invocation_context),
        source: child.source,
        events: union(base.events, child.events),
        mentions: override_list(base.mentions, child.mentions),
        labels: union(base.labels, child.labels),
        branches: union(base.branches, child.branches),
        paths: union(base.paths, child.paths),
        schedule: child.schedule.or(base.schedule),
        priority: child.priority.or(base.priority),
        user_whitelist: override_list(base.user_whitelist, child.user_whitelist),
        mcp_servers: union(base.mcp_servers, child.mcp_servers),
        cli_command: child.cli_command.or(base.cli_command),
        cli_agent: child.cli_agent.or(base.cli_agent),
        model: child.model.or(base.model),
        max_turns: child.max_turns.or(base.max_turns),
        timeout_minutes: child.timeout_minutes.or(base.timeout_minutes),
        verbose: child.verbose.or(base.verbose),
        envs,
        inject_prompt_to_stdin: child.inject_prompt_to_stdin.or(base.inject_prompt_to_stdin),
        inject_envs_to_prompt: child.inject_envs_to_prompt.or(base.inject_envs_to_prompt),
        prompt_uri: child.prompt_uri.or(base.prompt_uri),
        prompt_body,
        from: None,
        agent_discovery: override_discovery(base.agent_discovery, child.agent_discovery),
    }
}

/// Union with dedup, base items first, insertion order preserved.
fn union(base: Vec<String>, child: Vec<String>) -> Vec<String> {
    let mut merged = base;
    for item in child {
        if !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged
}

/// Whole-list override: the child's list replaces the base's when set.
fn override_list(base: Vec<String>, child: Vec<String>) -> Vec<String> {
    if child.is_empty() {
        base
    } else {
        child
    }
}

/// `agent_discovery` is an overridable value, not a union: any child
/// setting replaces the base block wholesale.
fn override_discovery(base: AgentDiscovery, child: AgentDiscovery) -> AgentDiscovery {
    if child == AgentDiscovery::default() {
        base
    } else {
        child
    }
}

/// Body merge: a child body containing the base-prompt token gets the base
/// body substituted in place; otherwise a non-empty child body wins.
fn merge_bodies(base: &str, child: &str) -> String {
    if child.contains(BASE_PROMPT_TOKEN) {
        child.replace(BASE_PROMPT_TOKEN, base)
    } else if child.is_empty() {
        base.to_string()
    } else {
        child.to_string()
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
