// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inheritance resolution
//!
//! Resolves a descriptor's `from` chain: each hop may load a base from the
//! filesystem, an HTTP URI, the conventional locations, or a version-ranged
//! registry reference. The chain is carried explicitly through the
//! recursion both for cycle detection and for error reporting.

mod merge;
mod reference;
mod version;

pub use merge::{merge, BASE_PROMPT_TOKEN};
pub use reference::FromRef;
pub use version::highest_matching;

use relay_core::Clock;
use relay_github::HostApi;
use relay_resource::{resolve_relative, ResourceLoader};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::error::DescriptorError;
use crate::parse;
use crate::types::{Descriptor, DescriptorSource, DESCRIPTOR_SUFFIX};
use crate::validate::validate;

/// Resolves `from` chains against local files, remote URIs, and the host
/// registry.
pub struct InheritanceResolver<'a, C: Clock> {
    loader: &'a ResourceLoader<C>,
    host: &'a dyn HostApi,
}

impl<'a, C: Clock> InheritanceResolver<'a, C> {
    pub fn new(loader: &'a ResourceLoader<C>, host: &'a dyn HostApi) -> Self {
        Self { loader, host }
    }

    /// Fully resolve a descriptor: load its body, then fold in every base
    /// along the `from` chain. The result has `from = None`.
    pub async fn resolve(&self, descriptor: Descriptor) -> Result<Descriptor, DescriptorError> {
        let mut chain = Vec::new();
        self.resolve_chain(descriptor, &mut chain).await
    }

    fn resolve_chain<'b>(
        &'b self,
        descriptor: Descriptor,
        chain: &'b mut Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Descriptor, DescriptorError>> + Send + 'b>> {
        Box::pin(async move {
            let mut descriptor = descriptor;

            // Body loading: a descriptor without an inline body may point
            // at its prompt with a URI.
            if descriptor.prompt_body.is_empty() {
                if let Some(uri) = descriptor.prompt_uri.clone() {
                    let uri = resolve_relative(&uri, &descriptor.source.base_uri());
                    if let Some(text) = self.loader.load_utf8(&uri).await? {
                        descriptor.prompt_body = text;
                    }
                }
            }

            let Some(reference) = descriptor.from.clone() else {
                return Ok(descriptor);
            };

            if chain.iter().any(|id| id == descriptor.id.as_str()) {
                chain.push(descriptor.id.to_string());
                return Err(DescriptorError::CircularInheritance {
                    chain: chain.clone(),
                });
            }
            chain.push(descriptor.id.to_string());

            let base = self.load_base(&reference, &descriptor).await?;
            validate(&base)?;
            let base = self.resolve_chain(base, chain).await?;
            Ok(merge(base, descriptor))
        })
    }

    async fn load_base(
        &self,
        reference: &str,
        child: &Descriptor,
    ) -> Result<Descriptor, DescriptorError> {
        match FromRef::parse(reference) {
            FromRef::Uri(uri) => self.load_base_at(&uri, reference).await,
            FromRef::Path(path) => {
                let uri = resolve_relative(&path, &child.source.base_uri());
                self.load_base_at(&uri, reference).await
            }
            FromRef::Bare(id) => {
                for location in FromRef::conventional_locations(&id) {
                    if let Some(content) = self.loader.load_utf8(&location).await? {
                        return self.parse_base(&content, &location);
                    }
                }
                Err(DescriptorError::BaseNotFound {
                    reference: reference.to_string(),
                })
            }
            FromRef::Registry {
                org,
                repo,
                path,
                range,
            } => {
                let repo_full = format!("{org}/{repo}");
                let tags = self.host.tags(&repo_full).await?;
                let tag = highest_matching(&tags, &range).ok_or_else(|| {
                    DescriptorError::NoMatchingVersion {
                        reference: reference.to_string(),
                        range: range.clone(),
                    }
                })?;
                tracing::debug!(reference, tag = %tag, "resolved registry version");
                let uri =
                    format!("https://raw.githubusercontent.com/{org}/{repo}/{tag}/{path}");
                self.load_base_at(&uri, reference).await
            }
        }
    }

    async fn load_base_at(
        &self,
        uri: &str,
        reference: &str,
    ) -> Result<Descriptor, DescriptorError> {
        match self.loader.load_utf8(uri).await? {
            Some(content) => self.parse_base(&content, uri),
            None => Err(DescriptorError::BaseNotFound {
                reference: reference.to_string(),
            }),
        }
    }

    fn parse_base(&self, content: &str, uri: &str) -> Result<Descriptor, DescriptorError> {
        let source = if uri.starts_with("http://") || uri.starts_with("https://") {
            DescriptorSource::Remote {
                uri: uri.to_string(),
            }
        } else {
            DescriptorSource::Local {
                path: PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri)),
            }
        };
        parse::parse(content, &stem_of(uri), source)
    }
}

/// Identifier stem of a descriptor URI: final segment minus the suffix.
pub fn stem_of(uri: &str) -> String {
    let name = uri.rsplit('/').next().unwrap_or(uri);
    name.strip_suffix(DESCRIPTOR_SUFFIX)
        .unwrap_or(name)
        .to_lowercase()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
