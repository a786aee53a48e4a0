// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay agents`: registry inspection and descriptor validation.

use anyhow::{Context, Result};
use clap::Subcommand;
use relay_core::SystemClock;
use relay_engine::Registry;
use relay_github::GithubClient;
use relay_resource::{RateLimiter, ResourceCache};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use super::Globals;

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List every descriptor the registry would load
    List,
    /// Parse and validate a single descriptor file
    Validate {
        /// Descriptor file path
        file: PathBuf,
    },
}

pub async fn run(globals: &Globals, command: AgentsCommand) -> Result<ExitCode> {
    match command {
        AgentsCommand::List => list(globals).await,
        AgentsCommand::Validate { file } => validate(&file),
    }
}

async fn list(globals: &Globals) -> Result<ExitCode> {
    let config = globals.load_config().await?;
    let working_dir = globals.working_dir()?;
    let loader = super::make_loader(&config, &working_dir);
    let host = GithubClient::new(super::github_token(), RateLimiter::new(SystemClock));
    let listing_cache = ResourceCache::new(
        Duration::from_secs(config.remote_agents.cache_timeout_min * 60),
        SystemClock,
    );

    let registry = Registry::load(&config, &loader, &host, &listing_cache).await;
    if registry.is_empty() {
        println!("no agents found");
        return Ok(ExitCode::SUCCESS);
    }
    for descriptor in registry.all() {
        let events = if descriptor.events.is_empty() {
            "*".to_string()
        } else {
            descriptor.events.join(",")
        };
        let mentions = if descriptor.mentions.is_empty() {
            String::new()
        } else {
            format!(" mentions={}", descriptor.mentions.join(","))
        };
        println!(
            "{:<24} priority={:<3} events={}{}",
            descriptor.id,
            descriptor.priority(),
            events,
            mentions,
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn validate(file: &PathBuf) -> Result<ExitCode> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let descriptor = match relay_descriptor::parse_file(file, &content) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            println!("invalid: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    match relay_descriptor::validate(&descriptor) {
        Ok(()) => {
            println!("ok: {}", descriptor.id);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("invalid: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
