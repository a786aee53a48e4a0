// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher
//!
//! Top-level entry for one event: populate the registry, run the mention
//! pass then the event pass, filter by actor authorization, and execute
//! the surviving candidates sequentially. A descriptor matched by both
//! passes runs once per pass; the passes are not deduplicated against each
//! other.

use relay_core::{Clock, Config, DispatchSummary, EventContext, RunResult};
use relay_descriptor::{validate, Descriptor, InheritanceResolver};
use relay_github::HostApi;
use relay_resource::{ResourceCache, ResourceLoader};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::command::EnvOverrides;
use crate::orchestrator::Orchestrator;
use crate::registry::Registry;
use crate::trigger::{
    agents_for_event, agents_for_mentions, mention_content, ChangedFiles, TriggerMatch,
};

/// Drives one event through trigger matching and agent execution.
pub struct Dispatcher<C: Clock> {
    config: Config,
    loader: ResourceLoader<C>,
    host: Arc<dyn HostApi>,
    clock: C,
    env: EnvOverrides,
    cancel: CancellationToken,
    listing_cache: ResourceCache<C>,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(
        config: Config,
        loader: ResourceLoader<C>,
        host: Arc<dyn HostApi>,
        clock: C,
    ) -> Self {
        let listing_ttl = Duration::from_secs(config.remote_agents.cache_timeout_min * 60);
        Self {
            listing_cache: ResourceCache::new(listing_ttl, clock.clone()),
            config,
            loader,
            host,
            clock,
            env: EnvOverrides::from_env(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the environment overrides (tests inject fixed values).
    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    /// Token cancelling in-flight subprocesses and pending candidates.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one event end to end.
    pub async fn dispatch(&self, ctx: &EventContext) -> DispatchSummary {
        let registry =
            Registry::load(&self.config, &self.loader, self.host.as_ref(), &self.listing_cache)
                .await;
        let files = ChangedFiles::new(self.host.clone(), self.clock.clone());

        let content = mention_content(ctx, &self.host).await;
        let mention_matches = agents_for_mentions(registry.all(), &content, &ctx.kind);
        let event_matches = agents_for_event(registry.all(), ctx, &files).await;
        tracing::info!(
            mention = mention_matches.len(),
            event = event_matches.len(),
            kind = %ctx.kind,
            "trigger passes complete"
        );

        let orchestrator = Orchestrator::new(&self.config, &self.loader, self.env.clone());
        let mut results: Vec<RunResult> = Vec::new();
        let mut collaborators: Option<Vec<String>> = None;

        for candidate in mention_matches.into_iter().chain(event_matches) {
            if self.cancel.is_cancelled() {
                tracing::warn!(agent = %candidate.descriptor.id, "dispatch cancelled, skipping");
                continue;
            }
            if !self.authorized(&candidate.descriptor, ctx, &mut collaborators).await {
                tracing::warn!(
                    agent = %candidate.descriptor.id,
                    actor = %ctx.actor,
                    "actor not authorized, skipping"
                );
                continue;
            }
            results.push(self.execute(&orchestrator, candidate, ctx, &registry, &files).await);
        }

        let summary = DispatchSummary::from_results(results);
        tracing::info!(
            success = summary.success,
            run = summary.agents_run,
            failed = summary.agents_failed,
            "dispatch complete"
        );
        summary
    }

    async fn execute(
        &self,
        orchestrator: &Orchestrator<'_, C>,
        candidate: TriggerMatch,
        ctx: &EventContext,
        registry: &Registry,
        files: &ChangedFiles<C>,
    ) -> RunResult {
        let TriggerMatch {
            descriptor, reasons, ..
        } = candidate;

        // inheritance is deferred until an agent is actually selected
        let agent_id = descriptor.id.clone();
        let resolver = InheritanceResolver::new(&self.loader, self.host.as_ref());
        let resolved = match resolver.resolve(descriptor).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(agent = %agent_id, error = %e, "inheritance resolution failed");
                return RunResult::failed(agent_id, reasons, e.to_string());
            }
        };
        if let Err(e) = validate(&resolved) {
            tracing::warn!(agent = %resolved.id, error = %e, "resolved descriptor invalid");
            return RunResult::failed(resolved.id.clone(), reasons, e.to_string());
        }

        let changed_files = files.for_event(ctx).await;
        let peers = registry.discover(&resolved, &self.config.agent_discovery);
        let context =
            crate::prompt::build_context(&resolved, ctx, &changed_files, &reasons, &peers);
        let prompt = crate::prompt::assemble_prompt(&self.loader, &resolved, &context).await;

        orchestrator
            .run_agent(&resolved, &prompt, reasons, &changed_files, &self.cancel)
            .await
    }

    /// Actor authorization: descriptor whitelist, then global whitelist,
    /// then the repo collaborator list (plus org members for org owners).
    ///
    /// Events without an interactive actor (scheduled ticks) pass.
    async fn authorized(
        &self,
        descriptor: &Descriptor,
        ctx: &EventContext,
        collaborators: &mut Option<Vec<String>>,
    ) -> bool {
        if ctx.actor.is_empty() {
            return true;
        }
        let whitelist: &[String] = if !descriptor.user_whitelist.is_empty() {
            &descriptor.user_whitelist
        } else if !self.config.defaults.user_whitelist.is_empty() {
            &self.config.defaults.user_whitelist
        } else {
            if collaborators.is_none() {
                *collaborators = Some(self.fetch_collaborators(ctx).await);
            }
            collaborators.as_deref().unwrap_or_default()
        };
        whitelist.iter().any(|user| user == &ctx.actor)
    }

    async fn fetch_collaborators(&self, ctx: &EventContext) -> Vec<String> {
        let mut users = match self.host.collaborators(&ctx.repo_full_name).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "collaborator lookup failed");
                Vec::new()
            }
        };
        if ctx.owner_is_org() {
            match self.host.org_members(ctx.owner()).await {
                Ok(members) => {
                    for member in members {
                        if !users.contains(&member) {
                            users.push(member);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "org member lookup failed");
                }
            }
        }
        users
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
