// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fake host for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{CommitDetail, PrFile, TreeEntry, User};
use crate::{HostApi, HostError};

#[derive(Default)]
struct FakeState {
    ref_shas: HashMap<(String, String), String>,
    trees: HashMap<(String, String), Vec<TreeEntry>>,
    pr_files: HashMap<(String, u64), Vec<PrFile>>,
    commits: HashMap<(String, String), CommitDetail>,
    tags: HashMap<String, Vec<String>>,
    org_members: HashMap<String, Vec<String>>,
    collaborators: HashMap<String, Vec<String>>,
    users: HashMap<String, User>,
    pr_files_rate_limited: bool,
    calls: Vec<String>,
}

/// In-memory [`HostApi`] with canned responses and call recording.
#[derive(Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ref_sha(&self, repo: &str, branch: &str, sha: &str) {
        self.state
            .lock()
            .ref_shas
            .insert((repo.to_string(), branch.to_string()), sha.to_string());
    }

    pub fn set_tree(&self, repo: &str, sha: &str, entries: Vec<TreeEntry>) {
        self.state
            .lock()
            .trees
            .insert((repo.to_string(), sha.to_string()), entries);
    }

    pub fn set_pr_files(&self, repo: &str, number: u64, files: Vec<&str>) {
        let files = files
            .into_iter()
            .map(|f| PrFile {
                filename: f.to_string(),
                status: "modified".to_string(),
                patch: None,
            })
            .collect();
        self.state
            .lock()
            .pr_files
            .insert((repo.to_string(), number), files);
    }

    pub fn set_commit(&self, repo: &str, sha: &str, detail: CommitDetail) {
        self.state
            .lock()
            .commits
            .insert((repo.to_string(), sha.to_string()), detail);
    }

    pub fn set_tags(&self, repo: &str, tags: Vec<&str>) {
        self.state
            .lock()
            .tags
            .insert(repo.to_string(), tags.into_iter().map(str::to_string).collect());
    }

    pub fn set_org_members(&self, org: &str, members: Vec<&str>) {
        self.state.lock().org_members.insert(
            org.to_string(),
            members.into_iter().map(str::to_string).collect(),
        );
    }

    pub fn set_collaborators(&self, repo: &str, users: Vec<&str>) {
        self.state.lock().collaborators.insert(
            repo.to_string(),
            users.into_iter().map(str::to_string).collect(),
        );
    }

    pub fn set_user(&self, login: &str, kind: &str) {
        self.state.lock().users.insert(
            login.to_string(),
            User {
                login: login.to_string(),
                kind: kind.to_string(),
            },
        );
    }

    /// Make every `pr_files` call fail as rate limited.
    pub fn rate_limit_pr_files(&self) {
        self.state.lock().pr_files_rate_limited = true;
    }

    /// All calls made so far, formatted `method repo extra`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl HostApi for FakeHost {
    async fn ref_sha(&self, repo: &str, branch: &str) -> Result<String, HostError> {
        self.record(format!("ref_sha {repo} {branch}"));
        self.state
            .lock()
            .ref_shas
            .get(&(repo.to_string(), branch.to_string()))
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("{repo}@{branch}")))
    }

    async fn tree_recursive(&self, repo: &str, sha: &str) -> Result<Vec<TreeEntry>, HostError> {
        self.record(format!("tree_recursive {repo} {sha}"));
        self.state
            .lock()
            .trees
            .get(&(repo.to_string(), sha.to_string()))
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("{repo}@{sha}")))
    }

    async fn pr_files(&self, repo: &str, number: u64) -> Result<Vec<PrFile>, HostError> {
        self.record(format!("pr_files {repo} {number}"));
        let state = self.state.lock();
        if state.pr_files_rate_limited {
            return Err(HostError::RateLimited("api.github.com".to_string()));
        }
        state
            .pr_files
            .get(&(repo.to_string(), number))
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("{repo}#{number}")))
    }

    async fn commit(&self, repo: &str, sha: &str) -> Result<CommitDetail, HostError> {
        self.record(format!("commit {repo} {sha}"));
        self.state
            .lock()
            .commits
            .get(&(repo.to_string(), sha.to_string()))
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("{repo}@{sha}")))
    }

    async fn tags(&self, repo: &str) -> Result<Vec<String>, HostError> {
        self.record(format!("tags {repo}"));
        Ok(self.state.lock().tags.get(repo).cloned().unwrap_or_default())
    }

    async fn org_members(&self, org: &str) -> Result<Vec<String>, HostError> {
        self.record(format!("org_members {org}"));
        Ok(self
            .state
            .lock()
            .org_members
            .get(org)
            .cloned()
            .unwrap_or_default())
    }

    async fn collaborators(&self, repo: &str) -> Result<Vec<String>, HostError> {
        self.record(format!("collaborators {repo}"));
        Ok(self
            .state
            .lock()
            .collaborators
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn user(&self, login: &str) -> Result<Option<User>, HostError> {
        self.record(format!("user {login}"));
        Ok(self.state.lock().users.get(login).cloned())
    }
}
