// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub REST client.

use async_trait::async_trait;
use relay_core::Clock;
use relay_resource::RateLimiter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::types::{CommitDetail, PrFile, TreeEntry, User};
use crate::{HostApi, HostError};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("relay/", env!("CARGO_PKG_VERSION"));

/// Production [`HostApi`] implementation over the GitHub REST API.
#[derive(Clone)]
pub struct GithubClient<C: Clock> {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
    limiter: RateLimiter<C>,
}

impl<C: Clock> GithubClient<C> {
    pub fn new(token: Option<String>, limiter: RateLimiter<C>) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token, limiter)
    }

    /// Point the client at a non-default API base (GHES, test server).
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: Option<String>,
        limiter: RateLimiter<C>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_base: api_base.into(),
            token,
            limiter,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HostError> {
        let url = format!("{}{}", self.api_base, path);
        self.limiter.acquire(&host_of(&url))?;

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| HostError::Network(e.to_string()))?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(HostError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HostError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| HostError::Network(e.to_string()))
    }
}

#[async_trait]
impl<C: Clock + 'static> HostApi for GithubClient<C> {
    async fn ref_sha(&self, repo: &str, branch: &str) -> Result<String, HostError> {
        let value: Value = self
            .get_json(&format!("/repos/{repo}/git/ref/heads/{branch}"))
            .await?;
        value
            .pointer("/object/sha")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| HostError::Network("ref response missing object.sha".to_string()))
    }

    async fn tree_recursive(&self, repo: &str, sha: &str) -> Result<Vec<TreeEntry>, HostError> {
        #[derive(serde::Deserialize)]
        struct TreeResponse {
            #[serde(default)]
            tree: Vec<TreeEntry>,
        }
        let response: TreeResponse = self
            .get_json(&format!("/repos/{repo}/git/trees/{sha}?recursive=1"))
            .await?;
        Ok(response.tree)
    }

    async fn pr_files(&self, repo: &str, number: u64) -> Result<Vec<PrFile>, HostError> {
        self.get_json(&format!("/repos/{repo}/pulls/{number}/files?per_page=100"))
            .await
    }

    async fn commit(&self, repo: &str, sha: &str) -> Result<CommitDetail, HostError> {
        let value: Value = self.get_json(&format!("/repos/{repo}/commits/{sha}")).await?;
        let message = value
            .pointer("/commit/message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let files = value
            .get("files")
            .cloned()
            .map(|f| serde_json::from_value(f).unwrap_or_default())
            .unwrap_or_default();
        Ok(CommitDetail {
            sha: sha.to_string(),
            message,
            files,
        })
    }

    async fn tags(&self, repo: &str) -> Result<Vec<String>, HostError> {
        #[derive(serde::Deserialize)]
        struct Tag {
            name: String,
        }
        let tags: Vec<Tag> = self
            .get_json(&format!("/repos/{repo}/tags?per_page=100"))
            .await?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    async fn org_members(&self, org: &str) -> Result<Vec<String>, HostError> {
        let members: Vec<User> = self
            .get_json(&format!("/orgs/{org}/members?per_page=100"))
            .await?;
        Ok(members.into_iter().map(|u| u.login).collect())
    }

    async fn collaborators(&self, repo: &str) -> Result<Vec<String>, HostError> {
        let users: Vec<User> = self
            .get_json(&format!("/repos/{repo}/collaborators?per_page=100"))
            .await?;
        Ok(users.into_iter().map(|u| u.login).collect())
    }

    async fn user(&self, login: &str) -> Result<Option<User>, HostError> {
        match self.get_json::<User>(&format!("/users/{login}")).await {
            Ok(user) => Ok(Some(user)),
            Err(HostError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Hostname of a URL, for rate-limiter keying.
fn host_of(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
        .to_string()
}
