// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource loader: files and HTTP(S) with caching and retry.
//!
//! `load` returns `Ok(None)` for missing resources (404 or absent file) so
//! callers can distinguish absence from failure; absence is never cached.

use relay_core::{Clock, FetchPolicy};
use std::time::Duration;

use crate::cache::ResourceCache;
use crate::error::ResourceError;
use crate::rate_limit::RateLimiter;
use crate::uri::{Target, UriPolicy};

const ACCEPT_HEADER: &str = "text/plain, text/markdown, application/json, */*";

/// Hosts that receive the configured GitHub token.
fn is_github_host(host: &str) -> bool {
    host == "github.com"
        || host == "api.github.com"
        || host == "raw.githubusercontent.com"
        || host.ends_with(".github.com")
}

/// Fetches bytes from files and allow-listed HTTP hosts.
#[derive(Clone)]
pub struct ResourceLoader<C: Clock> {
    policy: UriPolicy,
    cache: ResourceCache<C>,
    limiter: RateLimiter<C>,
    client: reqwest::Client,
    github_token: Option<String>,
    retry: FetchPolicy,
}

impl<C: Clock> ResourceLoader<C> {
    pub fn new(
        policy: UriPolicy,
        cache: ResourceCache<C>,
        limiter: RateLimiter<C>,
        github_token: Option<String>,
        retry: FetchPolicy,
        request_timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            policy,
            cache,
            limiter,
            client,
            github_token,
            retry,
        }
    }

    /// Same loader with a different retry policy; cache and limiter are
    /// shared with the original.
    pub fn with_retry(&self, retry: FetchPolicy) -> Self {
        let mut loader = self.clone();
        loader.retry = retry;
        loader
    }

    pub fn policy(&self) -> &UriPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &ResourceCache<C> {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter<C> {
        &self.limiter
    }

    /// Load a resource, consulting the cache first.
    pub async fn load(&self, uri: &str) -> Result<Option<Vec<u8>>, ResourceError> {
        let target = self.policy.resolve(uri)?;
        let key = target.cache_key();
        if let Some(bytes) = self.cache.get(&key) {
            tracing::debug!(uri = %key, "resource cache hit");
            return Ok(Some(bytes));
        }

        let fetched = match &target {
            Target::File(path) => match tokio::fs::read(path).await {
                Ok(bytes) => Some(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    return Err(ResourceError::FetchFailed {
                        uri: key,
                        reason: e.to_string(),
                    })
                }
            },
            Target::Http(url) => self.fetch_http(url.as_str(), &key).await?,
        };

        match fetched {
            Some(bytes) => {
                self.cache.insert(key, bytes.clone());
                Ok(Some(bytes))
            }
            // 404 / absent file: surfaced as absence, never cached
            None => Ok(None),
        }
    }

    /// Load a resource and decode it as UTF-8.
    pub async fn load_utf8(&self, uri: &str) -> Result<Option<String>, ResourceError> {
        match self.load(uri).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| ResourceError::FetchFailed {
                    uri: uri.to_string(),
                    reason: format!("invalid utf-8: {e}"),
                }),
            None => Ok(None),
        }
    }

    /// GET with fixed-delay retry. 404 and policy errors abort immediately.
    async fn fetch_http(&self, url: &str, key: &str) -> Result<Option<Vec<u8>>, ResourceError> {
        let attempts = self.retry.retry_attempts.max(1);
        let delay = Duration::from_millis(self.retry.retry_delay_ms);
        let mut last_err = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(delay).await;
            }
            match self.fetch_http_once(url, key).await {
                Ok(outcome) => return Ok(outcome),
                // over-budget fails fast: waiting out the window would
                // serialize the whole dispatch behind one host
                Err(e @ ResourceError::RateLimited { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(uri = %key, attempt, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| ResourceError::FetchFailed {
            uri: key.to_string(),
            reason: "no attempts made".to_string(),
        }))
    }

    async fn fetch_http_once(
        &self,
        url: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, ResourceError> {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        self.limiter.acquire(&host)?;

        let mut request = self.client.get(url).header("Accept", ACCEPT_HEADER);
        if is_github_host(&host) {
            if let Some(token) = &self.github_token {
                request = request.header("Authorization", format!("token {token}"));
            }
        }

        let response = request.send().await.map_err(|e| ResourceError::FetchFailed {
            uri: key.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ResourceError::HttpStatus {
                code: status.as_u16(),
                uri: key.to_string(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| ResourceError::FetchFailed {
            uri: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(bytes.to_vec()))
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
