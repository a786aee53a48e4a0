// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt context assembly.
//!
//! Builds the JSON context a descriptor body is compiled against: the
//! event, the repository, the agent's own metadata, the changed files, the
//! activation reasons, and the peer discovery summaries.

use relay_core::{Clock, EventContext};
use relay_descriptor::{AgentSummary, Descriptor, TemplateEngine};
use relay_resource::ResourceLoader;
use serde_json::{json, Value};

/// Build the template context for one agent activation.
pub fn build_context(
    descriptor: &Descriptor,
    ctx: &EventContext,
    changed_files: &[String],
    reasons: &[String],
    peers: &[AgentSummary],
) -> Value {
    json!({
        "event": {
            "kind": ctx.kind.as_str(),
            "action": ctx.action,
            "actor": ctx.actor,
            "branch": ctx.branch,
            "sha": ctx.sha,
            "labels": ctx.labels(),
            "cron": ctx.cron_expression,
            "payload": ctx.payload,
        },
        "repo": {
            "full_name": ctx.repo_full_name,
            "owner": ctx.owner(),
            "name": ctx.repo_name(),
        },
        "agent": {
            "id": descriptor.id.as_str(),
            "name": descriptor.name,
            "category": descriptor.category,
            "description": descriptor.description,
            "model": descriptor.model,
            "mentions": descriptor.mentions,
        },
        "files": changed_files,
        "activation": {
            "reasons": reasons,
            "triggered_by": reasons.join(", "),
        },
        "peers": peers,
    })
}

/// Compile the descriptor body against the context, resolving includes
/// relative to the descriptor's own source.
pub async fn assemble_prompt<C: Clock>(
    loader: &ResourceLoader<C>,
    descriptor: &Descriptor,
    context: &Value,
) -> String {
    let engine = TemplateEngine::new(loader);
    engine
        .compile(&descriptor.prompt_body, context, &descriptor.source.base_uri())
        .await
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
