// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command selection and composition.
//!
//! Selection walks the override hierarchy (descriptor command, global
//! default, named template, environment override) and composition folds in
//! env prefixes and stdin/printenv plumbing before template expansion.

use indexmap::IndexMap;
use relay_core::{CliAgentTemplate, Config};
use relay_descriptor::{render_vars, Descriptor};
use serde_json::{json, Value};
use std::path::Path;

use crate::error::EngineError;

/// Environment variable naming a `cli_agents` template key.
pub const ENV_CLI_AGENT: &str = "RELAY_CLI_AGENT";
/// Environment variable carrying a raw command override.
pub const ENV_CLI_COMMAND: &str = "RELAY_CLI_COMMAND";
/// Set when an Azure OpenAI project is configured.
pub const ENV_AZURE_PROJECT: &str = "AZURE_OPENAI_PROJECT";

/// Snapshot of the environment overrides, injected for testability.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub cli_agent: Option<String>,
    pub cli_command: Option<String>,
    pub azure_project: bool,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            cli_agent: std::env::var(ENV_CLI_AGENT).ok().filter(|v| !v.is_empty()),
            cli_command: std::env::var(ENV_CLI_COMMAND).ok().filter(|v| !v.is_empty()),
            azure_project: std::env::var(ENV_AZURE_PROJECT).is_ok(),
        }
    }
}

/// A selected command template before composition.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCommand {
    pub template: String,
    pub envs: IndexMap<String, String>,
    pub inject_prompt_to_stdin: bool,
    pub inject_envs_to_prompt: bool,
    pub model: Option<String>,
}

impl SelectedCommand {
    fn raw(template: String, descriptor: &Descriptor, config: &Config) -> Self {
        Self {
            template,
            envs: IndexMap::new(),
            inject_prompt_to_stdin: descriptor.inject_prompt_to_stdin(),
            inject_envs_to_prompt: descriptor.inject_envs_to_prompt(),
            model: descriptor.model.clone().or_else(|| config.defaults.model.clone()),
        }
    }

    fn from_template(
        template: &CliAgentTemplate,
        descriptor: &Descriptor,
        config: &Config,
    ) -> Self {
        Self {
            template: template.cli_command.clone(),
            envs: template.envs.clone(),
            inject_prompt_to_stdin: descriptor
                .inject_prompt_to_stdin
                .unwrap_or(template.inject_prompt_to_stdin),
            inject_envs_to_prompt: descriptor
                .inject_envs_to_prompt
                .unwrap_or(template.inject_envs_to_prompt),
            model: descriptor
                .model
                .clone()
                .or_else(|| template.model.clone())
                .or_else(|| config.defaults.model.clone()),
        }
    }
}

/// Select the CLI command for a descriptor; first match wins.
pub fn select_command(
    descriptor: &Descriptor,
    config: &Config,
    env: &EnvOverrides,
) -> Result<SelectedCommand, EngineError> {
    if let Some(command) = &descriptor.cli_command {
        return Ok(SelectedCommand::raw(command.clone(), descriptor, config));
    }
    if let Some(command) = &config.defaults.cli_command {
        return Ok(SelectedCommand::raw(command.clone(), descriptor, config));
    }
    if let Some(template) = select_template(descriptor, config, env) {
        return Ok(SelectedCommand::from_template(template, descriptor, config));
    }
    if let Some(command) = &env.cli_command {
        return Ok(SelectedCommand::raw(command.clone(), descriptor, config));
    }
    Err(EngineError::NoCliConfigured {
        agent: descriptor.id.to_string(),
    })
}

/// Pick a template from the `cli_agents` mapping.
fn select_template<'c>(
    descriptor: &Descriptor,
    config: &'c Config,
    env: &EnvOverrides,
) -> Option<&'c CliAgentTemplate> {
    let mapping = &config.cli_agents;
    if mapping.is_empty() {
        return None;
    }
    for key in [
        descriptor.cli_agent.as_deref(),
        config.defaults.cli_agent.as_deref(),
        env.cli_agent.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(template) = mapping.get(key) {
            return Some(template);
        }
    }

    let model = descriptor
        .model
        .as_deref()
        .or(config.defaults.model.as_deref())
        .unwrap_or_default()
        .to_lowercase();
    if let Some(key) = auto_select_key(&model, env.azure_project, mapping) {
        return mapping.get(key);
    }
    mapping.values().next()
}

/// Auto-selection by model-name substring.
fn auto_select_key<'k>(
    model: &str,
    azure_project: bool,
    mapping: &'k IndexMap<String, CliAgentTemplate>,
) -> Option<&'k str> {
    let candidate = if ["claude", "sonnet", "haiku", "opus"]
        .iter()
        .any(|m| model.contains(m))
    {
        "claude"
    } else if ["gpt", "o1", "o4"].iter().any(|m| model.contains(m)) {
        if azure_project && mapping.contains_key("azure_codex") {
            "azure_codex"
        } else {
            "codex"
        }
    } else if model.contains("gemini") {
        "gemini"
    } else {
        return None;
    };
    mapping.contains_key(candidate).then_some(candidate)
}

/// Inputs for command template expansion.
pub struct CommandContext<'a> {
    pub prompt_path: &'a Path,
    pub mcp_config_path: Option<&'a Path>,
    pub max_turns: Option<u32>,
    pub verbose: bool,
    pub files: &'a [String],
    pub config: &'a Config,
    pub envs: &'a IndexMap<String, String>,
}

/// Compose and expand the final shell command line.
pub fn compose_command(selected: &SelectedCommand, ctx: &CommandContext<'_>) -> String {
    let mut command = selected.template.clone();

    if !selected.envs.is_empty() {
        let prefix: Vec<String> = selected
            .envs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        command = format!("{} {}", prefix.join(" "), command);
    }
    if selected.inject_prompt_to_stdin {
        command = format!("cat {{{{prompt_path}}}} | {command}");
    }
    if selected.inject_envs_to_prompt {
        if selected.inject_prompt_to_stdin {
            command = command.replace(
                "cat {{prompt_path}}",
                "printenv | cat - {{prompt_path}}",
            );
        } else {
            command = format!("printenv | {command}");
        }
    }

    let template_ctx = json!({
        "prompt_path": ctx.prompt_path.display().to_string(),
        "mcp_config_path": ctx
            .mcp_config_path
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        "model": selected.model.clone().unwrap_or_default(),
        "max_turns": ctx.max_turns,
        "verbose": ctx.verbose,
        "files": ctx.files,
        "config": serde_json::to_value(ctx.config).unwrap_or(Value::Null),
        "globalConfig": serde_json::to_value(&ctx.config.defaults).unwrap_or(Value::Null),
        "envs": ctx.envs,
    });
    render_vars(&command, &template_ctx)
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
