// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor schema validation.
//!
//! Collects every violation before failing so authors fix a file in one
//! pass. Dangerous-pattern checks guard the strings that eventually reach a
//! shell: command substitution and backticks are rejected in `cli_command`
//! only, since prompt bodies are markdown and legitimately full of
//! backticks; the command denylist and system-path redirections apply to
//! both.

use regex::Regex;
use std::sync::LazyLock;

use crate::cron::validate_cron;
use crate::error::{DescriptorError, Violation};
use crate::types::Descriptor;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[a-zA-Z0-9_-]+$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static A5C_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^a5c://[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+/.+@.+$")
        .expect("constant regex pattern is valid")
});

/// Redirections or pipes that touch system paths.
#[allow(clippy::expect_used)]
static SYSTEM_SINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[|>]\s*/(etc|proc|sys)(/|\s|$)").expect("constant regex pattern is valid")
});

/// Download piped or redirected into execution or files.
#[allow(clippy::expect_used)]
static FETCH_PIPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(curl|wget)[^\n|>]*[|>]").expect("constant regex pattern is valid")
});

/// Commands that never belong in an agent invocation.
const COMMAND_DENYLIST: &[&str] = &[
    "rm -rf",
    "sudo ",
    "mkfs",
    "dd if=",
    "chmod 777",
    "nc -l",
];

const FROM_SCHEMES: &[&str] = &["file://", "http://", "https://", "a5c://", "agent://"];

/// Validate a parsed descriptor, reporting every violation.
pub fn validate(descriptor: &Descriptor) -> Result<(), DescriptorError> {
    let mut violations = Vec::new();
    let mut push = |field: &str, reason: String| {
        violations.push(Violation {
            field: field.to_string(),
            reason,
        });
    };

    if !ID_PATTERN.is_match(descriptor.id.as_str()) {
        push("id", format!("'{}' is not a lowercase slug", descriptor.id));
    }

    if descriptor.name.is_empty() || descriptor.name.len() > 100 {
        push("name", "length must be 1-100".to_string());
    } else if !NAME_PATTERN.is_match(&descriptor.name) {
        push(
            "name",
            format!("'{}' contains characters outside [a-zA-Z0-9_-]", descriptor.name),
        );
    }

    if let Some(version) = &descriptor.version {
        if !VERSION_PATTERN.is_match(version) {
            push("version", format!("'{version}' is not MAJOR.MINOR.PATCH"));
        }
    }

    for mention in &descriptor.mentions {
        if !MENTION_PATTERN.is_match(mention) {
            push("mentions", format!("'{mention}' is not an @-token"));
        }
    }

    if let Some(schedule) = &descriptor.schedule {
        if let Err(reason) = validate_cron(schedule) {
            push("schedule", reason);
        }
    }

    if let Some(priority) = descriptor.priority {
        if !(0..=100).contains(&priority) {
            push("priority", format!("{priority} outside 0-100"));
        }
    }

    if let Some(from) = &descriptor.from {
        check_from(from, &mut push);
    }

    if let Some(command) = &descriptor.cli_command {
        check_dangerous(command, true, "cli_command", &mut push);
    }
    check_dangerous(&descriptor.prompt_body, false, "prompt_body", &mut push);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DescriptorError::Validation { violations })
    }
}

fn check_from(from: &str, push: &mut impl FnMut(&str, String)) {
    if from.contains("..") {
        push("from", format!("'{from}' contains a traversal pattern"));
        return;
    }
    if from.contains("://") {
        if !FROM_SCHEMES.iter().any(|scheme| from.starts_with(scheme)) {
            push("from", format!("'{from}' uses a disallowed scheme"));
        } else if from.starts_with("a5c://") && !A5C_PATTERN.is_match(from) {
            push(
                "from",
                format!("'{from}' is not a5c://<org>/<repo>/<path>@<version-range>"),
            );
        }
    }
}

/// Reject shell-dangerous content. `is_command` additionally rejects
/// substitution syntax that is harmless in markdown prose.
fn check_dangerous(text: &str, is_command: bool, field: &str, push: &mut impl FnMut(&str, String)) {
    let lowered = text.to_lowercase();

    if lowered.contains("<script") {
        push(field, "script tag".to_string());
    }
    if lowered.contains("javascript:") {
        push(field, "javascript: scheme".to_string());
    }
    for denied in COMMAND_DENYLIST {
        if lowered.contains(denied) {
            push(field, format!("denylisted command '{}'", denied.trim_end()));
        }
    }
    if SYSTEM_SINK_PATTERN.is_match(&lowered) {
        push(field, "redirection into a system path".to_string());
    }
    if FETCH_PIPE_PATTERN.is_match(&lowered) {
        push(field, "download piped into execution".to_string());
    }
    if is_command {
        if text.contains("$(") {
            push(field, "command substitution".to_string());
        }
        if text.contains('`') {
            push(field, "backtick substitution".to_string());
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
