// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor file parsing and serialization.
//!
//! A descriptor file is a front-matter header between `---` lines followed
//! by the free-form prompt body. A file without a header block is not a
//! descriptor.

use indexmap::IndexMap;
use relay_core::AgentId;
use serde::Deserialize;
use std::path::Path;

use crate::error::DescriptorError;
use crate::list::string_or_seq;
use crate::types::{AgentDiscovery, Descriptor, DescriptorSource, DESCRIPTOR_SUFFIX};

#[derive(Default, Deserialize)]
#[serde(default)]
struct Header {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    version: Option<String>,
    usage_context: Option<String>,
    invocation_context: Option<String>,
    #[serde(deserialize_with = "string_or_seq")]
    events: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    mentions: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    labels: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    branches: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    paths: Vec<String>,
    schedule: Option<String>,
    priority: Option<i64>,
    #[serde(deserialize_with = "string_or_seq")]
    user_whitelist: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    mcp_servers: Vec<String>,
    cli_command: Option<String>,
    cli_agent: Option<String>,
    model: Option<String>,
    max_turns: Option<u32>,
    timeout_minutes: Option<u64>,
    verbose: Option<bool>,
    envs: IndexMap<String, String>,
    inject_prompt_to_stdin: Option<bool>,
    inject_envs_to_prompt: Option<bool>,
    prompt_uri: Option<String>,
    from: Option<String>,
    agent_discovery: AgentDiscovery,
}

/// Split content into the raw header block and the body.
fn split_front_matter(content: &str) -> Result<(&str, &str), DescriptorError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---")
        .ok_or_else(|| DescriptorError::invalid("missing front matter header"))?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .ok_or_else(|| DescriptorError::invalid("missing front matter header"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((header, body));
        }
        offset += line.len();
    }
    Err(DescriptorError::invalid("unterminated front matter header"))
}

/// Parse descriptor content.
///
/// `fallback_id` is used when the header carries no `id`, typically the
/// file stem or the configured source alias.
pub fn parse(
    content: &str,
    fallback_id: &str,
    source: DescriptorSource,
) -> Result<Descriptor, DescriptorError> {
    let (header_raw, body) = split_front_matter(content)?;
    let header: Header = serde_yaml::from_str(header_raw)
        .map_err(|e| DescriptorError::invalid(format!("front matter: {e}")))?;

    let id = header
        .id
        .clone()
        .or_else(|| header.name.clone().map(|n| n.to_lowercase()))
        .unwrap_or_else(|| fallback_id.to_string());
    let name = header.name.unwrap_or_else(|| id.clone());

    Ok(Descriptor {
        id: AgentId::new(id),
        name,
        description: header.description,
        category: header.category,
        version: header.version,
        usage_context: header.usage_context,
        invocation_context: header.invocation_context,
        source,
        events: header.events,
        mentions: header.mentions,
        labels: header.labels,
        branches: header.branches,
        paths: header.paths,
        schedule: header.schedule,
        priority: header.priority,
        user_whitelist: header.user_whitelist,
        mcp_servers: header.mcp_servers,
        cli_command: header.cli_command,
        cli_agent: header.cli_agent,
        model: header.model,
        max_turns: header.max_turns,
        timeout_minutes: header.timeout_minutes,
        verbose: header.verbose,
        envs: header.envs,
        inject_prompt_to_stdin: header.inject_prompt_to_stdin,
        inject_envs_to_prompt: header.inject_envs_to_prompt,
        prompt_uri: header.prompt_uri,
        prompt_body: body.trim_start_matches('\n').to_string(),
        from: header.from,
        agent_discovery: header.agent_discovery,
    })
}

/// Parse a descriptor file, deriving the fallback id from the file stem.
pub fn parse_file(path: &Path, content: &str) -> Result<Descriptor, DescriptorError> {
    let stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.strip_suffix(DESCRIPTOR_SUFFIX).unwrap_or(n))
        .unwrap_or_default()
        .to_lowercase();
    parse(
        content,
        &stem,
        DescriptorSource::Local {
            path: path.to_path_buf(),
        },
    )
}

/// Serialize a descriptor back to front matter + body.
///
/// Unset optional fields are omitted, so `parse(serialize(d))` reproduces
/// `d` for any parsed descriptor.
pub fn serialize(descriptor: &Descriptor) -> String {
    use serde_yaml::{Mapping, Value};

    let mut map = Mapping::new();
    let mut put = |key: &str, value: Value| {
        map.insert(Value::String(key.to_string()), value);
    };
    let str_val = |s: &String| Value::String(s.clone());
    let list_val =
        |items: &Vec<String>| Value::Sequence(items.iter().map(|i| Value::String(i.clone())).collect());

    put("id", Value::String(descriptor.id.to_string()));
    put("name", str_val(&descriptor.name));
    if let Some(v) = &descriptor.description {
        put("description", str_val(v));
    }
    if let Some(v) = &descriptor.category {
        put("category", str_val(v));
    }
    if let Some(v) = &descriptor.version {
        put("version", str_val(v));
    }
    if let Some(v) = &descriptor.usage_context {
        put("usage_context", str_val(v));
    }
    if let Some(v) = &descriptor.invocation_context {
        put("invocation_context", str_val(v));
    }
    if !descriptor.events.is_empty() {
        put("events", list_val(&descriptor.events));
    }
    if !descriptor.mentions.is_empty() {
        put("mentions", list_val(&descriptor.mentions));
    }
    if !descriptor.labels.is_empty() {
        put("labels", list_val(&descriptor.labels));
    }
    if !descriptor.branches.is_empty() {
        put("branches", list_val(&descriptor.branches));
    }
    if !descriptor.paths.is_empty() {
        put("paths", list_val(&descriptor.paths));
    }
    if let Some(v) = &descriptor.schedule {
        put("schedule", str_val(v));
    }
    if let Some(v) = descriptor.priority {
        put("priority", Value::Number(v.into()));
    }
    if !descriptor.user_whitelist.is_empty() {
        put("user_whitelist", list_val(&descriptor.user_whitelist));
    }
    if !descriptor.mcp_servers.is_empty() {
        put("mcp_servers", list_val(&descriptor.mcp_servers));
    }
    if let Some(v) = &descriptor.cli_command {
        put("cli_command", str_val(v));
    }
    if let Some(v) = &descriptor.cli_agent {
        put("cli_agent", str_val(v));
    }
    if let Some(v) = &descriptor.model {
        put("model", str_val(v));
    }
    if let Some(v) = descriptor.max_turns {
        put("max_turns", Value::Number(v.into()));
    }
    if let Some(v) = descriptor.timeout_minutes {
        put("timeout_minutes", Value::Number(v.into()));
    }
    if let Some(v) = descriptor.verbose {
        put("verbose", Value::Bool(v));
    }
    if !descriptor.envs.is_empty() {
        let envs: Mapping = descriptor
            .envs
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), Value::String(v.clone())))
            .collect();
        put("envs", Value::Mapping(envs));
    }
    if let Some(v) = descriptor.inject_prompt_to_stdin {
        put("inject_prompt_to_stdin", Value::Bool(v));
    }
    if let Some(v) = descriptor.inject_envs_to_prompt {
        put("inject_envs_to_prompt", Value::Bool(v));
    }
    if let Some(v) = &descriptor.prompt_uri {
        put("prompt_uri", str_val(v));
    }
    if let Some(v) = &descriptor.from {
        put("from", str_val(v));
    }
    let discovery = &descriptor.agent_discovery;
    if *discovery != crate::types::AgentDiscovery::default() {
        let mut d = Mapping::new();
        if let Some(v) = discovery.enabled {
            d.insert(Value::String("enabled".to_string()), Value::Bool(v));
        }
        if let Some(v) = discovery.include_same_directory {
            d.insert(
                Value::String("include_same_directory".to_string()),
                Value::Bool(v),
            );
        }
        if !discovery.include_external.is_empty() {
            d.insert(
                Value::String("include_external".to_string()),
                list_val(&discovery.include_external),
            );
        }
        if let Some(v) = discovery.max_in_context {
            d.insert(
                Value::String("max_in_context".to_string()),
                Value::Number(v.into()),
            );
        }
        put("agent_discovery", Value::Mapping(d));
    }

    let header = serde_yaml::to_string(&Value::Mapping(map)).unwrap_or_default();
    format!("---\n{}---\n{}", header, descriptor.prompt_body)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
