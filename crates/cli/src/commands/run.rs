// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay run`: dispatch one repository event.

use anyhow::{Context, Result};
use clap::Args;
use relay_core::{EventContext, EventKind, SystemClock};
use relay_engine::Dispatcher;
use relay_github::GithubClient;
use relay_resource::RateLimiter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use super::Globals;

#[derive(Args)]
pub struct RunArgs {
    /// Event name (push, pull_request, issue_comment, schedule, ...)
    #[arg(long)]
    pub event: String,

    /// Path to the JSON event payload
    #[arg(long)]
    pub payload: PathBuf,

    /// Print the dispatch summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub async fn run(globals: &Globals, args: RunArgs) -> Result<ExitCode> {
    let config = globals.load_config().await?;
    let working_dir = globals.working_dir()?;

    let payload_raw = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("reading payload {}", args.payload.display()))?;
    let payload =
        serde_json::from_str(&payload_raw).context("payload is not valid JSON")?;
    let ctx = EventContext::from_payload(EventKind::parse(&args.event), payload);

    let loader = super::make_loader(&config, &working_dir);
    let host = GithubClient::new(super::github_token(), RateLimiter::new(SystemClock));
    let dispatcher = Dispatcher::new(config, loader, Arc::new(host), SystemClock);

    // ctrl-c cancels in-flight subprocesses and skips pending candidates
    let cancel = dispatcher.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling dispatch");
            cancel.cancel();
        }
    });

    let summary = dispatcher.dispatch(&ctx).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.summary_text);
        for result in &summary.agent_results {
            let status = if result.success { "ok" } else { "failed" };
            println!(
                "  {} [{}] {} ({} ms)",
                result.agent_id,
                status,
                result.triggered_by.join(", "),
                result.duration_ms,
            );
            if let Some(error) = &result.error {
                println!("    error: {error}");
            }
        }
    }

    Ok(if summary.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
