// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine errors.
//!
//! Failures scoped to one agent (command selection, subprocess exit,
//! timeout) never abort the dispatch; the dispatcher converts them into
//! failed run results and moves on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No CLI command could be selected for the agent.
    #[error("no cli configured for agent '{agent}'")]
    NoCliConfigured { agent: String },

    /// The subprocess outlived its window and was terminated.
    #[error("agent '{agent}' exceeded its {minutes} minute timeout")]
    TimeoutExceeded { agent: String, minutes: u64 },

    /// Non-zero subprocess exit.
    #[error("subprocess exited with code {code}: {stderr}")]
    SubprocessExit { code: i32, stderr: String },

    /// The dispatch was cancelled while this agent was pending or running.
    #[error("dispatch cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Descriptor(#[from] relay_descriptor::DescriptorError),

    #[error(transparent)]
    Resource(#[from] relay_resource::ResourceError),

    #[error("host api: {0}")]
    Host(#[from] relay_github::HostError),
}
