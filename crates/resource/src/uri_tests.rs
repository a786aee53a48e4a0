// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn policy() -> UriPolicy {
    UriPolicy::new(
        vec![
            "github.com".to_string(),
            "raw.githubusercontent.com".to_string(),
            "api.github.com".to_string(),
        ],
        "/work/repo",
    )
}

#[test]
fn allows_listed_host() {
    let target = policy()
        .resolve("https://raw.githubusercontent.com/acme/agents/main/base.agent.md")
        .unwrap();
    assert_eq!(target.host(), Some("raw.githubusercontent.com"));
}

#[test]
fn rejects_unlisted_host() {
    let err = policy().resolve("https://evil.example.com/x").unwrap_err();
    assert!(matches!(err, ResourceError::UriNotAllowed { .. }));
    assert!(err.is_policy_violation());
}

#[test]
fn relative_path_resolves_inside_working_dir() {
    let target = policy().resolve(".a5c/agents/reviewer.agent.md").unwrap();
    assert_eq!(
        target,
        Target::File(PathBuf::from("/work/repo/.a5c/agents/reviewer.agent.md"))
    );
}

#[test]
fn file_scheme_is_stripped() {
    let target = policy().resolve("file:///work/repo/prompts/base.md").unwrap();
    assert_eq!(target, Target::File(PathBuf::from("/work/repo/prompts/base.md")));
}

#[parameterized(
    parent_dir = { "../outside.md" },
    sneaky_parent = { "prompts/../../outside.md" },
    etc = { "/etc/passwd" },
    proc_fs = { "/proc/self/environ" },
    sys_fs = { "/sys/kernel" },
    git_dir = { ".git/config" },
    env_file = { "config/.env" },
    ssh_dir = { ".ssh/id_rsa" },
    aws_dir = { ".aws/credentials" },
)]
fn rejects_traversal(path: &str) {
    let err = policy().resolve(path).unwrap_err();
    assert!(matches!(err, ResourceError::PathTraversal { .. }), "{path}");
}

#[test]
fn github_directory_is_not_git() {
    // `.github` must not trip the `.git` segment check
    assert!(policy().resolve(".github/workflows/ci.yml").is_ok());
}

#[test]
fn absolute_path_outside_working_dir_rejected() {
    let err = policy().resolve("/other/repo/file.md").unwrap_err();
    assert!(matches!(err, ResourceError::PathTraversal { .. }));
}

#[test]
fn dot_segments_are_normalized() {
    let target = policy().resolve("./prompts/./base.md").unwrap();
    assert_eq!(target, Target::File(PathBuf::from("/work/repo/prompts/base.md")));
}

#[test]
fn resolve_relative_http() {
    assert_eq!(
        resolve_relative("frame.md", "https://github.com/acme/agents/prompts/base.md"),
        "https://github.com/acme/agents/prompts/frame.md"
    );
}

#[test]
fn resolve_relative_path() {
    assert_eq!(
        resolve_relative("frame.md", "/work/repo/prompts/base.md"),
        "/work/repo/prompts/frame.md"
    );
}

#[test]
fn resolve_relative_folds_parent_segments() {
    assert_eq!(
        resolve_relative("../prompts/frame.md", "/work/repo/agents/base.agent.md"),
        "/work/repo/prompts/frame.md"
    );
}

#[test]
fn resolve_relative_passes_absolute_through() {
    assert_eq!(
        resolve_relative("https://github.com/x", "/work/repo/base.md"),
        "https://github.com/x"
    );
    assert_eq!(resolve_relative("/abs/path.md", "/work/repo/base.md"), "/abs/path.md");
}

#[test]
fn cache_key_distinguishes_schemes() {
    let file = policy().resolve("prompts/base.md").unwrap();
    assert_eq!(file.cache_key(), "file:///work/repo/prompts/base.md");
}
