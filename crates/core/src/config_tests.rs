// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_carry_allow_list() {
    let config = Config::default();
    assert_eq!(
        config.allowed_hosts,
        vec!["github.com", "raw.githubusercontent.com", "api.github.com"]
    );
    assert!(!config.remote_agents.enabled);
    assert_eq!(config.default_timeout_minutes(), 30);
}

#[test]
fn local_layer_overrides_scalars_keeps_rest() {
    let config = Config::from_toml(
        r#"
        [defaults]
        model = "sonnet"
        timeout_minutes = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.defaults.model.as_deref(), Some("sonnet"));
    assert_eq!(config.default_timeout_minutes(), 5);
    // untouched sections keep embedded defaults
    assert_eq!(config.remote_agents.retry_attempts, 3);
    assert_eq!(config.agents_dir, PathBuf::from(".a5c/agents"));
}

#[test]
fn remote_layer_wins_over_local() {
    let local = r#"
        [defaults]
        model = "local-model"
        verbose = true
    "#;
    let remote = r#"
        [defaults]
        model = "remote-model"
    "#;
    let config = Config::from_layers(Some(local), Some(remote)).unwrap();
    assert_eq!(config.defaults.model.as_deref(), Some("remote-model"));
    // keys the remote layer does not mention survive from the local layer
    assert!(config.defaults.verbose);
}

#[test]
fn arrays_replace_rather_than_append() {
    let local = r#"allowed_hosts = ["github.com", "example.com"]"#;
    let remote = r#"allowed_hosts = ["internal.example.com"]"#;
    let config = Config::from_layers(Some(local), Some(remote)).unwrap();
    assert_eq!(config.allowed_hosts, vec!["internal.example.com"]);
}

#[test]
fn cli_agents_parse_with_envs() {
    let config = Config::from_toml(
        r#"
        [cli_agents.claude]
        cli_command = "claude -p {{prompt_path}} --model {{model}}"
        inject_prompt_to_stdin = true

        [cli_agents.claude.envs]
        ANTHROPIC_LOG = "debug"
        "#,
    )
    .unwrap();
    let tpl = &config.cli_agents["claude"];
    assert!(tpl.inject_prompt_to_stdin);
    assert_eq!(tpl.envs.get("ANTHROPIC_LOG").map(String::as_str), Some("debug"));
}

#[test]
fn remote_sources_parse() {
    let config = Config::from_toml(
        r#"
        [remote_agents]
        enabled = true

        [[remote_agents.sources.individual]]
        uri = "https://raw.githubusercontent.com/acme/agents/main/reviewer.agent.md"
        alias = "reviewer"

        [[remote_agents.sources.repositories]]
        uri = "https://github.com/acme/agents"
        pattern = "prod/**"
        branch = "main"
        "#,
    )
    .unwrap();
    assert!(config.remote_agents.enabled);
    assert_eq!(config.remote_agents.sources.individual.len(), 1);
    assert_eq!(
        config.remote_agents.sources.repositories[0].pattern.as_deref(),
        Some("prod/**")
    );
}

#[test]
fn invalid_toml_is_an_error() {
    assert!(Config::from_toml("defaults = 3").is_err());
}
