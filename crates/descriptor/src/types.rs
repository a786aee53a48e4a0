// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor data model.
//!
//! A descriptor is parsed from a front-matter header plus prompt body.
//! Optional fields stay `Option` until inheritance resolution so the merge
//! can tell "unset" from "set to the default"; accessor methods apply the
//! defaults consumers care about.

use indexmap::IndexMap;
use relay_core::AgentId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default priority when a descriptor sets none.
pub const DEFAULT_PRIORITY: u8 = 50;

/// Reserved filename suffix for descriptor files.
pub const DESCRIPTOR_SUFFIX: &str = ".agent.md";

/// Where a descriptor was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptorSource {
    Local { path: PathBuf },
    Remote { uri: String },
}

impl DescriptorSource {
    /// URI-ish string used for relative reference resolution.
    pub fn base_uri(&self) -> String {
        match self {
            Self::Local { path } => path.display().to_string(),
            Self::Remote { uri } => uri.clone(),
        }
    }

    /// Grouping key for same-directory peer discovery.
    pub fn directory(&self) -> String {
        match self {
            Self::Local { path } => path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            Self::Remote { uri } => uri.rsplit_once('/').map(|(dir, _)| dir.to_string()).unwrap_or_default(),
        }
    }
}

/// Peer-discovery options carried on a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDiscovery {
    pub enabled: Option<bool>,
    pub include_same_directory: Option<bool>,
    #[serde(deserialize_with = "crate::list::string_or_seq")]
    pub include_external: Vec<String>,
    pub max_in_context: Option<usize>,
}

/// A parsed agent descriptor.
///
/// `from` is consumed by inheritance resolution and is `None` on every
/// descriptor the engine executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: AgentId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
    pub usage_context: Option<String>,
    pub invocation_context: Option<String>,
    pub source: DescriptorSource,
    pub events: Vec<String>,
    pub mentions: Vec<String>,
    pub labels: Vec<String>,
    pub branches: Vec<String>,
    pub paths: Vec<String>,
    pub schedule: Option<String>,
    /// Raw priority as written; range-checked by validation, clamped by the
    /// accessor.
    pub priority: Option<i64>,
    pub user_whitelist: Vec<String>,
    pub mcp_servers: Vec<String>,
    pub cli_command: Option<String>,
    pub cli_agent: Option<String>,
    pub model: Option<String>,
    pub max_turns: Option<u32>,
    pub timeout_minutes: Option<u64>,
    pub verbose: Option<bool>,
    pub envs: IndexMap<String, String>,
    pub inject_prompt_to_stdin: Option<bool>,
    pub inject_envs_to_prompt: Option<bool>,
    pub prompt_uri: Option<String>,
    pub prompt_body: String,
    pub from: Option<String>,
    pub agent_discovery: AgentDiscovery,
}

impl Descriptor {
    /// Effective priority, defaulting to 50.
    pub fn priority(&self) -> u8 {
        self.priority
            .unwrap_or(DEFAULT_PRIORITY as i64)
            .clamp(0, 100) as u8
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn inject_prompt_to_stdin(&self) -> bool {
        self.inject_prompt_to_stdin.unwrap_or(false)
    }

    pub fn inject_envs_to_prompt(&self) -> bool {
        self.inject_envs_to_prompt.unwrap_or(false)
    }

    /// True once inheritance has been applied.
    pub fn is_resolved(&self) -> bool {
        self.from.is_none()
    }
}

/// Compact peer view exposed to prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub usage_context: Option<String>,
    pub invocation_context: Option<String>,
    pub mentions: Vec<String>,
    pub events: Vec<String>,
    pub labels: Vec<String>,
    pub paths: Vec<String>,
}

impl AgentSummary {
    pub fn of(descriptor: &Descriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            category: descriptor.category.clone(),
            description: descriptor.description.clone(),
            usage_context: descriptor.usage_context.clone(),
            invocation_context: descriptor.invocation_context.clone(),
            mentions: descriptor.mentions.clone(),
            events: descriptor.events.clone(),
            labels: descriptor.labels.clone(),
            paths: descriptor.paths.clone(),
        }
    }
}
