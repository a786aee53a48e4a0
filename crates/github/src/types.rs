// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the repository-host API.

use serde::{Deserialize, Serialize};

/// A file entry from a pull-request file listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub patch: Option<String>,
}

/// A blob or tree entry from a recursive tree listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sha: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// A commit with its touched files and patches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    pub message: String,
    pub files: Vec<PrFile>,
}

/// A host user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}
