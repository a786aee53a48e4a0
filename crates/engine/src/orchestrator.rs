// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent execution orchestrator.
//!
//! Takes a resolved descriptor plus its compiled prompt and drives one
//! subprocess: artifact directory, back-channel, command selection, spawn,
//! timeout, and result assembly. Every failure path still returns a
//! `RunResult` so the dispatcher can keep going.

use relay_core::{Clock, Config, RunId, RunResult};
use relay_descriptor::Descriptor;
use relay_resource::ResourceLoader;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::artifacts::{RunDir, COMMAND_FILE, PROMPT_FILE, STDERR_FILE, STDOUT_FILE};
use crate::backchannel::BackChannel;
use crate::command::{compose_command, select_command, CommandContext, EnvOverrides};
use crate::error::EngineError;
use crate::spawn::{run_shell, SpawnOutcome, SpawnSpec};

/// Executes one agent per call; owned by the dispatcher.
pub struct Orchestrator<'a, C: Clock> {
    config: &'a Config,
    loader: &'a ResourceLoader<C>,
    env: EnvOverrides,
}

impl<'a, C: Clock> Orchestrator<'a, C> {
    pub fn new(config: &'a Config, loader: &'a ResourceLoader<C>, env: EnvOverrides) -> Self {
        Self {
            config,
            loader,
            env,
        }
    }

    fn artifact_root(&self) -> PathBuf {
        self.loader
            .policy()
            .working_dir()
            .join(&self.config.artifacts_dir)
    }

    /// Run one resolved descriptor with its compiled prompt.
    pub async fn run_agent(
        &self,
        descriptor: &Descriptor,
        prompt: &str,
        reasons: Vec<String>,
        changed_files: &[String],
        cancel: &CancellationToken,
    ) -> RunResult {
        match self
            .try_run(descriptor, prompt, &reasons, changed_files, cancel)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(agent = %descriptor.id, error = %e, "agent run failed");
                RunResult::failed(descriptor.id.clone(), reasons, e.to_string())
            }
        }
    }

    async fn try_run(
        &self,
        descriptor: &Descriptor,
        prompt: &str,
        reasons: &[String],
        changed_files: &[String],
        cancel: &CancellationToken,
    ) -> Result<RunResult, EngineError> {
        let run_id = RunId::generate(&descriptor.id);
        let mut run_dir = RunDir::create(&self.artifact_root(), &run_id)?;

        let prompt_path = run_dir.write(PROMPT_FILE, prompt)?;
        let mcp_config_path = run_dir.write_mcp_config(
            &descriptor.mcp_servers,
            self.config.mcp_config_path.as_deref(),
        )?;

        let selected = select_command(descriptor, self.config, &self.env)?;
        let max_turns = descriptor.max_turns.or(self.config.defaults.max_turns);
        let verbose = descriptor.verbose.unwrap_or(self.config.defaults.verbose);
        let command = compose_command(
            &selected,
            &CommandContext {
                prompt_path: &prompt_path,
                mcp_config_path: mcp_config_path.as_deref(),
                max_turns,
                verbose,
                files: changed_files,
                config: self.config,
                envs: &descriptor.envs,
            },
        );
        run_dir.write(COMMAND_FILE, &command)?;

        let backchannel = BackChannel::create(run_dir.path())?;
        let mut env: Vec<(String, String)> = descriptor
            .envs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env.extend(backchannel.env());

        let timeout_minutes = descriptor
            .timeout_minutes
            .unwrap_or_else(|| self.config.default_timeout_minutes());

        tracing::info!(
            agent = %descriptor.id,
            run = %run_id,
            timeout_minutes,
            "spawning agent command={command}"
        );
        let outcome = run_shell(
            SpawnSpec {
                command: &command,
                env,
                cwd: self.loader.policy().working_dir(),
                timeout: Duration::from_secs(timeout_minutes * 60),
            },
            &backchannel,
            cancel,
        )
        .await?;

        // publish captured output even for failed or terminated runs
        run_dir.write(STDOUT_FILE, &outcome.stdout)?;
        run_dir.write(STDERR_FILE, &outcome.stderr)?;

        let (status_reports, log_entries) = backchannel.drain();
        let error = run_error(descriptor, timeout_minutes, &outcome);

        let mut result = RunResult {
            agent_id: descriptor.id.clone(),
            triggered_by: reasons.to_vec(),
            success: outcome.succeeded(),
            exit_code: outcome.exit_code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            status_reports,
            log_entries,
            artifacts: run_dir.artifacts(),
            cost_usd: None,
            duration_ms: outcome.duration_ms,
            error,
        };
        result.accumulate_cost();
        Ok(result)
    }
}

fn run_error(
    descriptor: &Descriptor,
    timeout_minutes: u64,
    outcome: &SpawnOutcome,
) -> Option<String> {
    if outcome.timed_out {
        return Some(
            EngineError::TimeoutExceeded {
                agent: descriptor.id.to_string(),
                minutes: timeout_minutes,
            }
            .to_string(),
        );
    }
    if outcome.cancelled {
        return Some(EngineError::Cancelled.to_string());
    }
    match outcome.exit_code {
        Some(0) => None,
        Some(code) => Some(
            EngineError::SubprocessExit {
                code,
                stderr: outcome.stderr.trim().to_string(),
            }
            .to_string(),
        ),
        None => Some("subprocess terminated by signal".to_string()),
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
