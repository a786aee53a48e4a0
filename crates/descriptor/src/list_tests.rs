// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::Deserialize;
use yare::parameterized;

#[derive(Deserialize)]
struct Doc {
    #[serde(default, deserialize_with = "string_or_seq")]
    items: Vec<String>,
}

fn parse(yaml: &str) -> Vec<String> {
    serde_yaml::from_str::<Doc>(yaml).unwrap().items
}

#[test]
fn yaml_sequence() {
    assert_eq!(parse("items: [push, pull_request]"), vec!["push", "pull_request"]);
}

#[test]
fn yaml_block_sequence() {
    assert_eq!(parse("items:\n  - push\n  - issues"), vec!["push", "issues"]);
}

#[parameterized(
    plain = { "items: \"push, pull_request\"" },
    bracketed = { "items: \"[push, pull_request]\"" },
    double_quoted_items = { "items: '[\"push\", \"pull_request\"]'" },
    single_quoted_items = { "items: \"'push', 'pull_request'\"" },
)]
fn comma_string_forms(yaml: &str) {
    assert_eq!(parse(yaml), vec!["push", "pull_request"]);
}

#[test]
fn empty_items_dropped() {
    assert_eq!(split_list("a,,b, "), vec!["a", "b"]);
}

#[test]
fn missing_field_defaults_empty() {
    let doc: Doc = serde_yaml::from_str("{}").unwrap();
    assert!(doc.items.is_empty());
}

#[test]
fn whitespace_trimmed_in_sequences() {
    assert_eq!(parse("items: [\" @reviewer \", \"@tester\"]"), vec!["@reviewer", "@tester"]);
}
