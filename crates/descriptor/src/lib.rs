// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-descriptor: agent descriptor parsing, validation, inheritance,
//! and prompt templating

pub mod cron;
pub mod error;
pub mod inherit;
pub mod list;
pub mod parse;
pub mod template;
pub mod types;
pub mod validate;

pub use cron::validate_cron;
pub use error::{DescriptorError, Violation};
pub use inherit::{highest_matching, merge, stem_of, FromRef, InheritanceResolver, BASE_PROMPT_TOKEN};
pub use parse::{parse, parse_file, serialize};
pub use template::{render_vars, TemplateEngine, MAX_INCLUDE_DEPTH};
pub use types::{
    AgentDiscovery, AgentSummary, Descriptor, DescriptorSource, DEFAULT_PRIORITY,
    DESCRIPTOR_SUFFIX,
};
pub use validate::validate;
