// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher configuration.
//!
//! Three layers, deep-merged with later layers winning: embedded defaults,
//! the local TOML file, and an optional remote override document. Tables
//! merge key-by-key; scalars and arrays are replaced wholesale.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Default TTL for cached remote resources, in minutes.
pub const DEFAULT_CACHE_TIMEOUT_MIN: u64 = 60;
/// Default number of fetch attempts.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default delay between fetch attempts, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
/// Default per-agent timeout, in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config encode failed: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Global defaults applied when a descriptor leaves a field unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u64>,
    pub verbose: bool,
    pub user_whitelist: Vec<String>,
}

/// One remote source yielding exactly one descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndividualSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// One remote repository enumerated for descriptors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositorySource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSources {
    pub individual: Vec<IndividualSource>,
    pub repositories: Vec<RepositorySource>,
}

/// Remote descriptor loading policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteAgents {
    pub enabled: bool,
    pub cache_timeout_min: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub sources: RemoteSources,
}

impl Default for RemoteAgents {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_timeout_min: DEFAULT_CACHE_TIMEOUT_MIN,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            sources: RemoteSources::default(),
        }
    }
}

/// Changed-file handling limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileProcessing {
    pub max_file_size: u64,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for FileProcessing {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Peer-discovery defaults; descriptors may override per agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryDefaults {
    pub enabled: bool,
    pub max_agents_in_context: usize,
    pub include_same_directory: bool,
}

impl Default for DiscoveryDefaults {
    fn default() -> Self {
        Self {
            enabled: true,
            max_agents_in_context: 10,
            include_same_directory: true,
        }
    }
}

/// Fetch policy for prompt URIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchPolicy {
    pub cache_timeout_min: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            cache_timeout_min: DEFAULT_CACHE_TIMEOUT_MIN,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// A named CLI template from the `cli_agents` mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliAgentTemplate {
    pub cli_command: String,
    pub envs: IndexMap<String, String>,
    pub inject_prompt_to_stdin: bool,
    pub inject_envs_to_prompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Full dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp_config_path: Option<PathBuf>,
    pub remote_agents: RemoteAgents,
    pub file_processing: FileProcessing,
    pub agent_discovery: DiscoveryDefaults,
    pub prompt_uri: FetchPolicy,
    pub cli_agents: IndexMap<String, CliAgentTemplate>,
    /// Sandbox root for file and relative URI access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Hostnames remote fetches may target.
    pub allowed_hosts: Vec<String>,
    /// Root of the local descriptor scan, relative to the working dir.
    pub agents_dir: PathBuf,
    /// Root for per-run artifact directories.
    pub artifacts_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            mcp_config_path: None,
            remote_agents: RemoteAgents::default(),
            file_processing: FileProcessing::default(),
            agent_discovery: DiscoveryDefaults::default(),
            prompt_uri: FetchPolicy::default(),
            cli_agents: IndexMap::new(),
            working_dir: None,
            allowed_hosts: vec![
                "github.com".to_string(),
                "raw.githubusercontent.com".to_string(),
                "api.github.com".to_string(),
            ],
            agents_dir: PathBuf::from(".a5c/agents"),
            artifacts_dir: PathBuf::from(".a5c/runs"),
        }
    }
}

impl Config {
    /// Parse a single TOML document merged over the embedded defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::from_layers(Some(content), None)
    }

    /// Merge defaults ← local file ← remote override, later layers winning.
    pub fn from_layers(
        local: Option<&str>,
        remote: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::try_from(Config::default())?;
        for layer in [local, remote].into_iter().flatten() {
            let value: toml::Value = toml::from_str(layer)?;
            merge_value(&mut merged, value);
        }
        Ok(merged.try_into()?)
    }

    /// Effective per-agent timeout in minutes when a descriptor has none.
    pub fn default_timeout_minutes(&self) -> u64 {
        self.defaults.timeout_minutes.unwrap_or(DEFAULT_TIMEOUT_MINUTES)
    }
}

/// Deep-merge `over` into `base`: tables merge per key, everything else is
/// replaced by the overriding value.
fn merge_value(base: &mut toml::Value, over: toml::Value) {
    match (base, over) {
        (toml::Value::Table(base_table), toml::Value::Table(over_table)) => {
            for (key, over_val) in over_table {
                match base_table.get_mut(&key) {
                    Some(base_val) => merge_value(base_val, over_val),
                    None => {
                        base_table.insert(key, over_val);
                    }
                }
            }
        }
        (base_slot, over_val) => *base_slot = over_val,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
