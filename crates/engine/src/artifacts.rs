// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run artifact directories.
//!
//! Every run gets a fresh directory under the artifact root holding the
//! prompt, the rendered command, the auxiliary-tool configuration, and the
//! captured outputs.

use relay_core::RunId;
use serde_json::json;
use std::path::{Path, PathBuf};

pub const PROMPT_FILE: &str = "prompt.md";
pub const COMMAND_FILE: &str = "command.txt";
pub const STDOUT_FILE: &str = "stdout.log";
pub const STDERR_FILE: &str = "stderr.log";
pub const MCP_CONFIG_FILE: &str = "mcp-config.json";

/// One run's artifact directory.
#[derive(Debug, Clone)]
pub struct RunDir {
    path: PathBuf,
    files: Vec<PathBuf>,
}

impl RunDir {
    /// Create a fresh directory for this run under `root`.
    pub fn create(root: &Path, run_id: &RunId) -> std::io::Result<Self> {
        let path = root.join(run_id.as_str());
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            path,
            files: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one artifact file and record it in the bundle.
    pub fn write(&mut self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.path.join(name);
        std::fs::write(&path, contents)?;
        if !self.files.contains(&path) {
            self.files.push(path.clone());
        }
        Ok(path)
    }

    /// Write the auxiliary-tool configuration consumed by the CLI.
    ///
    /// The content is opaque to the dispatcher; it only references the
    /// configured servers and the shared config path.
    pub fn write_mcp_config(
        &mut self,
        servers: &[String],
        shared_config: Option<&Path>,
    ) -> std::io::Result<Option<PathBuf>> {
        if servers.is_empty() && shared_config.is_none() {
            return Ok(None);
        }
        let config = json!({
            "servers": servers,
            "shared_config": shared_config.map(|p| p.display().to_string()),
        });
        let rendered = serde_json::to_string_pretty(&config).unwrap_or_else(|_| "{}".to_string());
        self.write(MCP_CONFIG_FILE, &rendered).map(Some)
    }

    /// Published artifact paths, in write order.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.files.clone()
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
