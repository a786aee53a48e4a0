// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor parsing, validation, and inheritance errors.

use std::fmt;
use thiserror::Error;

/// One schema violation; validation reports all of them, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Structurally not a descriptor (missing or unparsable front matter).
    #[error("invalid descriptor: {reason}")]
    Invalid { reason: String },

    #[error("validation failed: {}", format_violations(.violations))]
    Validation { violations: Vec<Violation> },

    #[error("circular inheritance: {}", .chain.join(" -> "))]
    CircularInheritance { chain: Vec<String> },

    #[error("base descriptor not found: {reference}")]
    BaseNotFound { reference: String },

    #[error("no tag of {reference} satisfies '{range}'")]
    NoMatchingVersion { reference: String, range: String },

    #[error(transparent)]
    Resource(#[from] relay_resource::ResourceError),

    #[error("host api: {0}")]
    Host(#[from] relay_github::HostError),
}

impl DescriptorError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
