// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-range resolution against host tags.

use semver::{Version, VersionReq};

/// Pick the highest tag satisfying `range`.
///
/// Tags that are not valid semver (with or without a leading `v`) are
/// ignored. Returns the original tag name so the caller can fetch by it.
pub fn highest_matching(tags: &[String], range: &str) -> Option<String> {
    let req = VersionReq::parse(range.trim()).ok()?;
    tags.iter()
        .filter_map(|tag| {
            let version = Version::parse(tag.trim_start_matches('v')).ok()?;
            req.matches(&version).then_some((version, tag.clone()))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| tag)
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
