// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay: event-driven agent dispatcher CLI

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "relay", about = "Event-driven agent dispatcher", version)]
struct Cli {
    /// Path to the configuration file (default: .a5c/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Remote configuration override URI
    #[arg(long, global = true)]
    config_url: Option<String>,

    /// Working directory (default: current directory)
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one repository event
    Run(commands::run::RunArgs),
    /// Inspect and validate agent descriptors
    #[command(subcommand)]
    Agents(commands::agents::AgentsCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let globals = commands::Globals {
        config: cli.config,
        config_url: cli.config_url,
        working_dir: cli.working_dir,
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(&globals, args).await,
        Commands::Agents(command) => commands::agents::run(&globals, command).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
