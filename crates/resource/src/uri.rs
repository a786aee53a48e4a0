// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! URI classification and security policy.
//!
//! Every fetch target resolves to either a sandboxed filesystem path or an
//! allow-listed HTTP(S) URL before any IO happens. Policy violations are
//! terminal for the fetch and are never retried.

use std::path::{Component, Path, PathBuf};
use url::Url;

use crate::error::ResourceError;

/// Absolute prefixes no file access may touch.
const FORBIDDEN_PREFIXES: &[&str] = &["/etc", "/proc", "/sys"];

/// Path segments that always denote secrets or VCS internals.
const FORBIDDEN_SEGMENTS: &[&str] = &[".git", ".env", ".ssh", ".aws"];

/// A fetch target after policy checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Absolute path inside the working directory.
    File(PathBuf),
    Http(Url),
}

impl Target {
    /// Canonical cache key for this target.
    pub fn cache_key(&self) -> String {
        match self {
            Target::File(path) => format!("file://{}", path.display()),
            Target::Http(url) => url.to_string(),
        }
    }

    /// Hostname for rate limiting; files have none.
    pub fn host(&self) -> Option<&str> {
        match self {
            Target::File(_) => None,
            Target::Http(url) => url.host_str(),
        }
    }
}

/// URI policy: host allow-list plus working-directory sandbox.
#[derive(Debug, Clone)]
pub struct UriPolicy {
    allowed_hosts: Vec<String>,
    working_dir: PathBuf,
}

impl UriPolicy {
    pub fn new(allowed_hosts: Vec<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            allowed_hosts,
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve a URI string to a checked fetch target.
    ///
    /// Accepts `http(s)://`, `file://`, and bare filesystem paths (absolute
    /// or relative to the working directory).
    pub fn resolve(&self, uri: &str) -> Result<Target, ResourceError> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            let url = Url::parse(uri).map_err(|e| ResourceError::InvalidUri {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
            self.check_host(&url)?;
            return Ok(Target::Http(url));
        }

        let path = uri.strip_prefix("file://").unwrap_or(uri);
        self.resolve_path(path)
    }

    /// Resolve a filesystem path against the sandbox.
    pub fn resolve_path(&self, path: &str) -> Result<Target, ResourceError> {
        check_path_segments(path)?;

        let candidate = Path::new(path);
        let resolved = if candidate.is_absolute() {
            normalize(candidate)
        } else {
            normalize(&self.working_dir.join(candidate))
        };

        for prefix in FORBIDDEN_PREFIXES {
            if resolved.starts_with(prefix) {
                return Err(ResourceError::PathTraversal {
                    path: path.to_string(),
                });
            }
        }
        if !resolved.starts_with(&self.working_dir) {
            return Err(ResourceError::PathTraversal {
                path: path.to_string(),
            });
        }
        Ok(Target::File(resolved))
    }

    fn check_host(&self, url: &Url) -> Result<(), ResourceError> {
        let host = url.host_str().unwrap_or_default();
        if self.allowed_hosts.iter().any(|allowed| allowed == host) {
            Ok(())
        } else {
            Err(ResourceError::UriNotAllowed {
                uri: url.to_string(),
            })
        }
    }
}

/// Resolve `uri` relative to the resource it was referenced from.
///
/// Absolute URIs (scheme or rooted path) pass through unchanged; relative
/// ones join onto the parent of `base`.
pub fn resolve_relative(uri: &str, base: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    if base.starts_with("http://") || base.starts_with("https://") {
        if let Ok(base_url) = Url::parse(base) {
            if let Ok(joined) = base_url.join(uri) {
                return joined.to_string();
            }
        }
        return uri.to_string();
    }
    let base_path = base.strip_prefix("file://").unwrap_or(base);
    let parent = Path::new(base_path).parent().unwrap_or_else(|| Path::new(""));
    // fold `..` here so the joined path reaches the policy check clean
    normalize_fold(&parent.join(uri)).display().to_string()
}

/// Reject `..` segments and forbidden segment names before normalization.
fn check_path_segments(path: &str) -> Result<(), ResourceError> {
    for segment in Path::new(path).components() {
        match segment {
            Component::ParentDir => {
                return Err(ResourceError::PathTraversal {
                    path: path.to_string(),
                })
            }
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                if FORBIDDEN_SEGMENTS.iter().any(|s| *s == name) {
                    return Err(ResourceError::PathTraversal {
                        path: path.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Lexical normalization: drop `.` segments. `..` is rejected upstream so
/// no component folding is needed.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Lexical normalization that also folds `..` segments.
fn normalize_fold(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other.as_os_str()),
        }
    }
    folded
}

#[cfg(test)]
#[path = "uri_tests.rs"]
mod tests;
