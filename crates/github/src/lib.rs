// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-github: repository-host API surface
//!
//! The dispatcher never talks to the host directly; everything goes through
//! the [`HostApi`] trait so tests and other forges can inject their own
//! implementation. [`GithubClient`] is the production implementation.

pub mod client;
pub mod types;

pub use client::GithubClient;
pub use types::{CommitDetail, PrFile, TreeEntry, User};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHost;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from repository-host calls.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("host api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    /// Per-host request budget exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),
}

impl From<relay_resource::ResourceError> for HostError {
    fn from(err: relay_resource::ResourceError) -> Self {
        match err {
            relay_resource::ResourceError::RateLimited { host } => Self::RateLimited(host),
            other => Self::Network(other.to_string()),
        }
    }
}

/// Injected repository-host interface.
///
/// `repo` arguments are `owner/name` pairs as they appear in event payloads.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// SHA the given branch ref currently points at.
    async fn ref_sha(&self, repo: &str, branch: &str) -> Result<String, HostError>;

    /// Recursive tree listing for a commit SHA.
    async fn tree_recursive(&self, repo: &str, sha: &str) -> Result<Vec<TreeEntry>, HostError>;

    /// Files touched by a pull request.
    async fn pr_files(&self, repo: &str, number: u64) -> Result<Vec<PrFile>, HostError>;

    /// A single commit with files and patches.
    async fn commit(&self, repo: &str, sha: &str) -> Result<CommitDetail, HostError>;

    /// Tag names of a repository, newest first as the host returns them.
    async fn tags(&self, repo: &str) -> Result<Vec<String>, HostError>;

    /// Public and private members of an organization.
    async fn org_members(&self, org: &str) -> Result<Vec<String>, HostError>;

    /// Collaborators of a repository.
    async fn collaborators(&self, repo: &str) -> Result<Vec<String>, HostError>;

    /// Look up a user; `None` when the login does not exist.
    async fn user(&self, login: &str) -> Result<Option<User>, HostError>;
}
