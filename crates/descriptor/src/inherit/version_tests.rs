// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn caret_range_picks_highest_compatible() {
    let tags = tags(&["v1.0.0", "v1.2.0", "v1.9.3", "v2.0.0"]);
    assert_eq!(highest_matching(&tags, "^1.0"), Some("v1.9.3".to_string()));
}

#[test]
fn tilde_range_stays_within_minor() {
    let tags = tags(&["1.2.0", "1.2.9", "1.3.0"]);
    assert_eq!(highest_matching(&tags, "~1.2.0"), Some("1.2.9".to_string()));
}

#[test]
fn gte_range() {
    let tags = tags(&["0.9.0", "1.0.0", "2.1.0"]);
    assert_eq!(highest_matching(&tags, ">=1.0.0"), Some("2.1.0".to_string()));
}

#[test]
fn exact_pin() {
    let tags = tags(&["1.0.0", "1.0.1"]);
    assert_eq!(highest_matching(&tags, "=1.0.0"), Some("1.0.0".to_string()));
}

#[test]
fn non_semver_tags_are_skipped() {
    let tags = tags(&["nightly", "release-candidate", "1.1.0"]);
    assert_eq!(highest_matching(&tags, "^1.0"), Some("1.1.0".to_string()));
}

#[test]
fn no_match_is_none() {
    let tags = tags(&["1.0.0"]);
    assert_eq!(highest_matching(&tags, "^2.0"), None);
}

#[test]
fn invalid_range_is_none() {
    let tags = tags(&["1.0.0"]);
    assert_eq!(highest_matching(&tags, "not-a-range"), None);
}
