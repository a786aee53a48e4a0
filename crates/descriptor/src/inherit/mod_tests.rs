// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use relay_core::{FakeClock, FetchPolicy};
use relay_github::FakeHost;
use relay_resource::{RateLimiter, ResourceCache, UriPolicy};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn loader_for(dir: &Path) -> ResourceLoader<FakeClock> {
    let clock = FakeClock::new();
    ResourceLoader::new(
        UriPolicy::new(vec!["raw.githubusercontent.com".to_string()], dir),
        ResourceCache::new(Duration::from_secs(3600), clock.clone()),
        RateLimiter::new(clock),
        None,
        FetchPolicy::default(),
        Duration::from_secs(5),
    )
}

fn write_agent(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn parse_at(dir: &Path, rel: &str) -> Descriptor {
    let path = dir.join(rel);
    let content = fs::read_to_string(&path).unwrap();
    parse::parse_file(&path, &content).unwrap()
}

#[tokio::test]
async fn no_from_returns_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(dir.path(), "solo.agent.md", "---\nname: solo\n---\nJust work.");
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let resolved = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), "solo.agent.md"))
        .await
        .unwrap();
    assert_eq!(resolved.prompt_body, "Just work.");
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn prompt_uri_loads_body() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(dir.path(), "prompts/review.md", "Fetched prompt.");
    write_agent(
        dir.path(),
        "agents/linked.agent.md",
        "---\nname: linked\nprompt_uri: ../prompts/review.md\n---\n",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let resolved = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), "agents/linked.agent.md"))
        .await
        .unwrap();
    assert_eq!(resolved.prompt_body, "Fetched prompt.");
}

#[tokio::test]
async fn bare_from_resolves_conventional_location_with_substitution() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        ".a5c/agents/base.agent.md",
        "---\nname: base\npriority: 10\n---\nBASE RULES",
    );
    write_agent(
        dir.path(),
        ".a5c/agents/child.agent.md",
        "---\nname: child\nfrom: base\npriority: 90\n---\n{{base-prompt}}\nEXTRA",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let resolved = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), ".a5c/agents/child.agent.md"))
        .await
        .unwrap();
    assert_eq!(resolved.prompt_body, "BASE RULES\nEXTRA");
    assert_eq!(resolved.priority, Some(90));
    assert!(resolved.from.is_none());
}

#[tokio::test]
async fn relative_path_from_resolves_against_child_source() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "team/shared/base.agent.md",
        "---\nname: base\nmodel: haiku\n---\nBASE",
    );
    write_agent(
        dir.path(),
        "team/child.agent.md",
        "---\nname: child\nfrom: shared/base.agent.md\n---\n",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let resolved = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), "team/child.agent.md"))
        .await
        .unwrap();
    assert_eq!(resolved.model.as_deref(), Some("haiku"));
    assert_eq!(resolved.prompt_body, "BASE");
}

#[tokio::test]
async fn missing_base_is_base_not_found() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "child.agent.md",
        "---\nname: child\nfrom: nowhere\n---\n",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let err = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), "child.agent.md"))
        .await
        .unwrap_err();
    assert!(matches!(err, DescriptorError::BaseNotFound { .. }));
}

#[tokio::test]
async fn two_node_cycle_fails_with_chain() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        ".a5c/agents/a.agent.md",
        "---\nname: a\nfrom: b\n---\nA",
    );
    write_agent(
        dir.path(),
        ".a5c/agents/b.agent.md",
        "---\nname: b\nfrom: a\n---\nB",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let err = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), ".a5c/agents/a.agent.md"))
        .await
        .unwrap_err();
    match err {
        DescriptorError::CircularInheritance { chain } => {
            assert_eq!(chain, vec!["a", "b", "a"]);
        }
        other => panic!("expected cycle error, got {other}"),
    }
}

#[tokio::test]
async fn self_cycle_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        ".a5c/agents/narcissus.agent.md",
        "---\nname: narcissus\nfrom: narcissus\n---\nSELF",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let err = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), ".a5c/agents/narcissus.agent.md"))
        .await
        .unwrap_err();
    assert!(matches!(err, DescriptorError::CircularInheritance { .. }));
}

#[tokio::test]
async fn registry_reference_with_no_matching_tag_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "child.agent.md",
        "---\nname: child\nfrom: \"a5c://acme/agents/base.agent.md@^2.0\"\n---\n",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();
    host.set_tags("acme/agents", vec!["1.0.0", "1.5.0"]);

    let err = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), "child.agent.md"))
        .await
        .unwrap_err();
    assert!(matches!(err, DescriptorError::NoMatchingVersion { .. }));
    assert_eq!(host.calls(), vec!["tags acme/agents"]);
}

#[tokio::test]
async fn three_level_chain_unions_lists() {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        ".a5c/agents/root.agent.md",
        "---\nname: root\nevents: [push]\n---\nROOT",
    );
    write_agent(
        dir.path(),
        ".a5c/agents/mid.agent.md",
        "---\nname: mid\nfrom: root\nevents: [issues]\n---\n{{base-prompt}} MID",
    );
    write_agent(
        dir.path(),
        ".a5c/agents/leaf.agent.md",
        "---\nname: leaf\nfrom: mid\nevents: [pull_request]\n---\n{{base-prompt}} LEAF",
    );
    let loader = loader_for(dir.path());
    let host = FakeHost::new();

    let resolved = InheritanceResolver::new(&loader, &host)
        .resolve(parse_at(dir.path(), ".a5c/agents/leaf.agent.md"))
        .await
        .unwrap();
    assert_eq!(resolved.events, vec!["push", "issues", "pull_request"]);
    assert_eq!(resolved.prompt_body, "ROOT MID LEAF");
}
