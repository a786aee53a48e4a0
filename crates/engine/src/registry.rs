// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor registry
//!
//! Populated per dispatch from the local scan plus configured remote
//! sources. Descriptors are stored unresolved; inheritance runs when an
//! agent is actually selected, so unused descriptors never trigger
//! remote fetches beyond listing.

use globset::Glob;
use relay_core::{Clock, Config, DiscoveryDefaults};
use relay_descriptor::{parse, parse_file, stem_of, validate, AgentSummary, Descriptor, DescriptorSource, DESCRIPTOR_SUFFIX};
use relay_github::HostApi;
use relay_resource::{ResourceCache, ResourceLoader};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// In-memory keyed store of descriptors for one dispatch.
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
}

impl Registry {
    /// Populate from the local scan and, when enabled, remote sources.
    pub async fn load<C: Clock>(
        config: &Config,
        loader: &ResourceLoader<C>,
        host: &dyn HostApi,
        listing_cache: &ResourceCache<C>,
    ) -> Self {
        let mut registry = Self::default();
        registry.scan_local(config, loader.policy().working_dir());

        if config.remote_agents.enabled {
            // remote descriptor fetches follow their own retry settings
            let remote_loader = loader.with_retry(relay_core::FetchPolicy {
                cache_timeout_min: config.remote_agents.cache_timeout_min,
                retry_attempts: config.remote_agents.retry_attempts,
                retry_delay_ms: config.remote_agents.retry_delay_ms,
            });
            registry.load_individual_sources(config, &remote_loader).await;
            registry
                .load_repository_sources(config, &remote_loader, host, listing_cache)
                .await;
        }

        tracing::info!(count = registry.len(), "registry loaded");
        registry
    }

    /// Add a descriptor, rejecting duplicate ids.
    pub fn insert(&mut self, descriptor: Descriptor) -> bool {
        if self.get(descriptor.id.as_str()).is_some() {
            tracing::warn!(id = %descriptor.id, "duplicate agent id rejected");
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    pub fn all(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn get(&self, id: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Peer discovery for one descriptor (§ agent context assembly).
    ///
    /// Same-directory selection admits peers sharing a category or a source
    /// directory; `include_external` adds explicitly named ids. Self is
    /// excluded, the result capped at the configured maximum.
    pub fn discover(
        &self,
        current: &Descriptor,
        defaults: &DiscoveryDefaults,
    ) -> Vec<AgentSummary> {
        let discovery = &current.agent_discovery;
        if !discovery.enabled.unwrap_or(defaults.enabled) {
            return Vec::new();
        }
        let max = discovery
            .max_in_context
            .unwrap_or(defaults.max_agents_in_context);
        let same_directory = discovery
            .include_same_directory
            .unwrap_or(defaults.include_same_directory);

        let mut seen: HashSet<String> = HashSet::new();
        let mut peers = Vec::new();
        let mut push = |descriptor: &Descriptor| {
            if descriptor.id == current.id {
                return;
            }
            if seen.insert(descriptor.id.to_string()) {
                peers.push(AgentSummary::of(descriptor));
            }
        };

        if same_directory {
            let current_dir = current.source.directory();
            for descriptor in &self.descriptors {
                let same_category = descriptor.category.is_some()
                    && descriptor.category == current.category;
                if same_category || descriptor.source.directory() == current_dir {
                    push(descriptor);
                }
            }
        }
        for id in &discovery.include_external {
            if let Some(descriptor) = self.get(id) {
                push(descriptor);
            }
        }

        peers.truncate(max);
        peers
    }

    fn scan_local(&mut self, config: &Config, working_dir: &Path) {
        let root = working_dir.join(&config.agents_dir);
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "no local agents directory");
            return;
        }
        let mut files = Vec::new();
        collect_descriptor_files(&root, &mut files);
        // deterministic registry order regardless of filesystem iteration
        files.sort();

        for path in files {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable descriptor");
                    continue;
                }
            };
            match parse_file(&path, &content).and_then(|d| {
                validate(&d)?;
                Ok(d)
            }) {
                Ok(descriptor) => {
                    self.insert(descriptor);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping descriptor");
                }
            }
        }
    }

    async fn load_individual_sources<C: Clock>(
        &mut self,
        config: &Config,
        loader: &ResourceLoader<C>,
    ) {
        for source in &config.remote_agents.sources.individual {
            let fallback_id = source
                .alias
                .clone()
                .unwrap_or_else(|| stem_of(&source.uri));
            let content = match loader.load_utf8(&source.uri).await {
                Ok(Some(content)) => content,
                Ok(None) => {
                    tracing::warn!(uri = %source.uri, "remote agent source absent");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(uri = %source.uri, error = %e, "remote agent source failed");
                    continue;
                }
            };
            let source_kind = DescriptorSource::Remote {
                uri: source.uri.clone(),
            };
            match parse(&content, &fallback_id, source_kind).and_then(|d| {
                validate(&d)?;
                Ok(d)
            }) {
                Ok(descriptor) => {
                    self.insert(descriptor);
                }
                Err(e) => {
                    tracing::warn!(uri = %source.uri, error = %e, "skipping remote descriptor");
                }
            }
        }
    }

    async fn load_repository_sources<C: Clock>(
        &mut self,
        config: &Config,
        loader: &ResourceLoader<C>,
        host: &dyn HostApi,
        listing_cache: &ResourceCache<C>,
    ) {
        for source in &config.remote_agents.sources.repositories {
            let Some((owner, repo)) = parse_repo_uri(&source.uri) else {
                tracing::warn!(uri = %source.uri, "unrecognized repository source uri");
                continue;
            };
            let branch = source.branch.as_deref().unwrap_or("main");

            let paths = match self
                .repo_listing(host, listing_cache, &owner, &repo, branch)
                .await
            {
                Ok(paths) => paths,
                Err(e) => {
                    // degraded scan: warn and yield nothing for this source
                    tracing::warn!(uri = %source.uri, error = %e, "repository enumeration failed");
                    continue;
                }
            };

            let pattern = source.pattern.as_deref().and_then(|p| {
                Glob::new(p).ok().map(|g| g.compile_matcher())
            });
            for path in paths {
                if let Some(matcher) = &pattern {
                    if !matcher.is_match(&path) {
                        continue;
                    }
                }
                let uri = format!(
                    "https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}"
                );
                match loader.load_utf8(&uri).await {
                    Ok(Some(content)) => {
                        let source_kind = DescriptorSource::Remote { uri: uri.clone() };
                        match parse(&content, &stem_of(&path), source_kind).and_then(|d| {
                            validate(&d)?;
                            Ok(d)
                        }) {
                            Ok(descriptor) => {
                                self.insert(descriptor);
                            }
                            Err(e) => {
                                tracing::warn!(uri = %uri, error = %e, "skipping remote descriptor");
                            }
                        }
                    }
                    Ok(None) => {
                        tracing::warn!(uri = %uri, "listed blob missing");
                    }
                    Err(e) => {
                        tracing::warn!(uri = %uri, error = %e, "blob fetch failed");
                    }
                }
            }
        }
    }

    /// Descriptor paths of a repo branch, cached per owner/repo/branch.
    async fn repo_listing<C: Clock>(
        &self,
        host: &dyn HostApi,
        cache: &ResourceCache<C>,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Vec<String>, relay_github::HostError> {
        let key = format!("repo-listing:{owner}/{repo}/{branch}");
        if let Some(bytes) = cache.get(&key) {
            if let Ok(paths) = serde_json::from_slice(&bytes) {
                return Ok(paths);
            }
        }

        let repo_full = format!("{owner}/{repo}");
        let sha = host.ref_sha(&repo_full, branch).await?;
        let tree = host.tree_recursive(&repo_full, &sha).await?;
        let paths: Vec<String> = tree
            .into_iter()
            .filter(|entry| entry.is_blob() && entry.path.ends_with(DESCRIPTOR_SUFFIX))
            .map(|entry| entry.path)
            .collect();

        if let Ok(bytes) = serde_json::to_vec(&paths) {
            cache.insert(key, bytes);
        }
        Ok(paths)
    }
}

fn collect_descriptor_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_descriptor_files(&path, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(DESCRIPTOR_SUFFIX))
        {
            out.push(path);
        }
    }
}

/// `https://github.com/{owner}/{repo}` (optionally `.git`) → owner/repo.
fn parse_repo_uri(uri: &str) -> Option<(String, String)> {
    let rest = uri
        .strip_prefix("https://github.com/")
        .or_else(|| uri.strip_prefix("http://github.com/"))?;
    let rest = rest.trim_end_matches('/').trim_end_matches(".git");
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
