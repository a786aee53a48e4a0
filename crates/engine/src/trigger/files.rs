// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Changed-file derivation.
//!
//! Push events carry their files in the payload; PR events and PR-merge
//! pushes ask the host. PR listings are cached for five minutes. A rate
//! limited PR-files fetch falls back to the commit-derived list instead of
//! failing the matcher.

use parking_lot::Mutex;
use regex::Regex;
use relay_core::{Clock, EventContext, EventKind};
use relay_github::{HostApi, HostError};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// How long a PR file listing stays fresh.
pub const PR_FILES_TTL: Duration = Duration::from_secs(5 * 60);

/// PR-merge commit-message patterns, case-insensitive, first match wins.
#[allow(clippy::expect_used)]
static MERGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)merge pull request #(\d+)",
        r"(?i)merged pull request #(\d+)",
        r"(?i)merge pr #(\d+)",
        r"(?i)squash and merge pull request #(\d+)",
        r"(?i)rebase and merge pull request #(\d+)",
        r"(?i)#(\d+) from \S+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("constant regex pattern is valid"))
    .collect()
});

/// Extract the PR number from a merge-style commit message.
pub fn merged_pr_number(message: &str) -> Option<u64> {
    for pattern in MERGE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(message) {
            if let Some(number) = captures.get(1) {
                return number.as_str().parse().ok();
            }
        }
    }
    None
}

/// Lazy changed-file provider shared across one dispatch.
#[derive(Clone)]
pub struct ChangedFiles<C: Clock> {
    host: Arc<dyn HostApi>,
    clock: C,
    pr_cache: Arc<Mutex<HashMap<u64, (u64, Vec<String>)>>>,
    event_files: Arc<Mutex<Option<Vec<String>>>>,
}

impl<C: Clock> ChangedFiles<C> {
    pub fn new(host: Arc<dyn HostApi>, clock: C) -> Self {
        Self {
            host,
            clock,
            pr_cache: Arc::new(Mutex::new(HashMap::new())),
            event_files: Arc::new(Mutex::new(None)),
        }
    }

    /// Changed files for the event, computed once per dispatch.
    pub async fn for_event(&self, ctx: &EventContext) -> Vec<String> {
        if let Some(files) = self.event_files.lock().clone() {
            return files;
        }
        let files = self.derive(ctx).await;
        *self.event_files.lock() = Some(files.clone());
        files
    }

    async fn derive(&self, ctx: &EventContext) -> Vec<String> {
        match ctx.kind {
            EventKind::Push => self.derive_push(ctx).await,
            EventKind::PullRequest => match ctx.item_number() {
                Some(number) => self.pr_files(&ctx.repo_full_name, number, &[]).await,
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    async fn derive_push(&self, ctx: &EventContext) -> Vec<String> {
        let commit_files: Vec<String> = {
            let mut files = Vec::new();
            for commit in ctx.commits() {
                for file in commit.touched_files() {
                    if !files.contains(&file) {
                        files.push(file);
                    }
                }
            }
            files
        };

        if let Some(head) = ctx.head_commit() {
            if let Some(number) = merged_pr_number(&head.message) {
                return self
                    .pr_files(&ctx.repo_full_name, number, &commit_files)
                    .await;
            }
        }
        commit_files
    }

    /// PR file listing with TTL cache and commit-derived fallback.
    async fn pr_files(&self, repo: &str, number: u64, fallback: &[String]) -> Vec<String> {
        let now = self.clock.epoch_ms();
        if let Some((at, files)) = self.pr_cache.lock().get(&number) {
            if now < at + PR_FILES_TTL.as_millis() as u64 {
                return files.clone();
            }
        }

        match self.host.pr_files(repo, number).await {
            Ok(files) => {
                let names: Vec<String> = files.into_iter().map(|f| f.filename).collect();
                self.pr_cache.lock().insert(number, (now, names.clone()));
                names
            }
            Err(HostError::RateLimited(host)) => {
                tracing::warn!(
                    repo,
                    number,
                    host,
                    "pr file listing rate limited, using commit files"
                );
                fallback.to_vec()
            }
            Err(e) => {
                tracing::warn!(repo, number, error = %e, "pr file listing failed");
                fallback.to_vec()
            }
        }
    }
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
