// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn local(path: &str) -> DescriptorSource {
    DescriptorSource::Local {
        path: std::path::PathBuf::from(path),
    }
}

const REVIEWER: &str = "\
---
name: reviewer
description: Reviews pull requests
events: [pull_request, issue_comment]
mentions: \"@reviewer\"
labels: \"bug, urgent\"
priority: 80
envs:
  REVIEW_MODE: strict
---
Review the change carefully.

Focus on correctness.
";

#[test]
fn parses_header_and_body() {
    let d = parse(REVIEWER, "reviewer", local("a.agent.md")).unwrap();
    assert_eq!(d.id, "reviewer");
    assert_eq!(d.name, "reviewer");
    assert_eq!(d.events, vec!["pull_request", "issue_comment"]);
    assert_eq!(d.mentions, vec!["@reviewer"]);
    assert_eq!(d.labels, vec!["bug", "urgent"]);
    assert_eq!(d.priority, Some(80));
    assert_eq!(d.envs.get("REVIEW_MODE").map(String::as_str), Some("strict"));
    assert!(d.prompt_body.starts_with("Review the change carefully."));
    assert!(d.prompt_body.contains("Focus on correctness."));
    assert!(d.is_resolved());
}

#[test]
fn missing_front_matter_is_invalid() {
    let err = parse("Just a prompt body", "x", local("x.agent.md")).unwrap_err();
    assert!(matches!(err, DescriptorError::Invalid { .. }));
}

#[test]
fn unterminated_front_matter_is_invalid() {
    let err = parse("---\nname: x\nno closing", "x", local("x.agent.md")).unwrap_err();
    assert!(matches!(err, DescriptorError::Invalid { .. }));
}

#[test]
fn id_falls_back_to_lowercased_name() {
    let d = parse("---\nname: Fixer\n---\nbody", "ignored", local("f.agent.md")).unwrap();
    assert_eq!(d.id, "fixer");
    assert_eq!(d.name, "Fixer");
}

#[test]
fn id_falls_back_to_file_stem() {
    let d = parse_file(
        std::path::Path::new("/repo/.a5c/agents/security-scan.agent.md"),
        "---\npriority: 10\n---\nbody",
    )
    .unwrap();
    assert_eq!(d.id, "security-scan");
    assert_eq!(d.name, "security-scan");
}

#[test]
fn explicit_id_wins_over_fallbacks() {
    let d = parse("---\nid: custom\nname: Other\n---\n", "stem", local("o.agent.md")).unwrap();
    assert_eq!(d.id, "custom");
}

#[test]
fn from_field_survives_parsing() {
    let d = parse("---\nname: child\nfrom: base\n---\n{{base-prompt}}\nEXTRA", "child", local("c.agent.md")).unwrap();
    assert_eq!(d.from.as_deref(), Some("base"));
    assert!(!d.is_resolved());
}

#[test]
fn empty_body_is_allowed() {
    let d = parse("---\nname: minimal\n---\n", "minimal", local("m.agent.md")).unwrap();
    assert_eq!(d.prompt_body, "");
}

#[test]
fn crlf_front_matter_is_accepted() {
    let d = parse("---\r\nname: win\r\n---\r\nbody\r\n", "win", local("w.agent.md")).unwrap();
    assert_eq!(d.name, "win");
}

#[test]
fn serialize_then_parse_round_trips() {
    let original = parse(REVIEWER, "reviewer", local("a.agent.md")).unwrap();
    let rendered = serialize(&original);
    let reparsed = parse(&rendered, "reviewer", local("a.agent.md")).unwrap();
    assert_eq!(reparsed, original);
}

#[test]
fn serialize_round_trips_discovery_and_from() {
    let content = "\
---
name: child
from: \"a5c://acme/agents/base.agent.md@^1.0\"
schedule: \"0 3 * * *\"
agent_discovery:
  enabled: true
  include_external: [helper]
  max_in_context: 3
---
{{base-prompt}}
EXTRA";
    let original = parse(content, "child", local("c.agent.md")).unwrap();
    let reparsed = parse(&serialize(&original), "child", local("c.agent.md")).unwrap();
    assert_eq!(reparsed, original);
}
