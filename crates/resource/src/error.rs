// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource loading errors.

use thiserror::Error;

/// Errors from resource fetching and URI policy enforcement.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Hostname not in the configured allow-list. Never retried.
    #[error("uri not allowed: {uri}")]
    UriNotAllowed { uri: String },

    /// Path escapes the working directory or touches a forbidden location.
    /// Never retried.
    #[error("path not allowed: {path}")]
    PathTraversal { path: String },

    #[error("invalid uri {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Non-2xx, non-404 HTTP response.
    #[error("http status {code} for {uri}")]
    HttpStatus { code: u16, uri: String },

    /// Network or IO failure that survived all retry attempts.
    #[error("fetch failed for {uri}: {reason}")]
    FetchFailed { uri: String, reason: String },

    /// Per-host request budget exhausted; the caller decides how to degrade.
    #[error("rate limited: {host}")]
    RateLimited { host: String },
}

impl ResourceError {
    /// Policy violations must not be retried with the same input.
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Self::UriNotAllowed { .. } | Self::PathTraversal { .. } | Self::InvalidUri { .. }
        )
    }
}
