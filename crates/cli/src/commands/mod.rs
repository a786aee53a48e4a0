// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.

pub mod agents;
pub mod run;

use anyhow::{Context, Result};
use relay_core::{Config, SystemClock};
use relay_resource::{RateLimiter, ResourceCache, ResourceLoader, UriPolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Options shared by every subcommand.
pub struct Globals {
    pub config: Option<PathBuf>,
    pub config_url: Option<String>,
    pub working_dir: Option<PathBuf>,
}

const DEFAULT_CONFIG_PATH: &str = ".a5c/config.toml";

impl Globals {
    pub fn working_dir(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("cannot determine working directory"),
        }
    }

    /// Load configuration: defaults, local file, then remote override.
    pub async fn load_config(&self) -> Result<Config> {
        let working_dir = self.working_dir()?;

        let local_path = self
            .config
            .clone()
            .unwrap_or_else(|| working_dir.join(DEFAULT_CONFIG_PATH));
        let local = match std::fs::read_to_string(&local_path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).context(format!("reading config {}", local_path.display()))
            }
        };

        let remote = match &self.config_url {
            Some(url) => {
                let bootstrap = make_loader(&Config::default(), &working_dir);
                bootstrap
                    .load_utf8(url)
                    .await
                    .with_context(|| format!("fetching remote config {url}"))?
            }
            None => None,
        };

        let mut config = Config::from_layers(local.as_deref(), remote.as_deref())
            .context("parsing configuration")?;
        config.working_dir = Some(working_dir);
        Ok(config)
    }
}

/// Build the shared resource loader for a dispatch.
pub fn make_loader(config: &Config, working_dir: &std::path::Path) -> ResourceLoader<SystemClock> {
    let clock = SystemClock;
    let ttl = Duration::from_secs(config.prompt_uri.cache_timeout_min * 60);
    ResourceLoader::new(
        UriPolicy::new(config.allowed_hosts.clone(), working_dir),
        ResourceCache::new(ttl, clock.clone()),
        RateLimiter::new(clock),
        github_token(),
        config.prompt_uri.clone(),
        Duration::from_secs(30),
    )
}

/// Token for GitHub API and raw-content access.
pub fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
}
