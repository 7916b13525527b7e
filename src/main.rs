// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! flatscript - lowers structured scripts into label-and-jump assembler
//!
//! This is the main entry point for the flatscript CLI.
//!
//! ## Features
//!
//! - Async program loading with tokio
//! - Parallel emission of script statements
//! - Chunk graph inspection

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use config::Config;

/// Main entry point - uses tokio runtime for async operations.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &cli.loglevel {
        config.set("loglevel", level);
    }
    if cli.verbose {
        config.set("loglevel", "debug");
    }

    init_tracing(&config.loglevel);

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, mut config: Config) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Emit(args) => {
            config.apply_emit_args(args);
            commands::emit::run(args, &config).await
        }
        Commands::Chunks(args) => commands::chunks::run(args, &config).await,
        Commands::Config => commands::config::run(&config).await,
    }
}

/// Installs the log subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(loglevel: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn report(err: &anyhow::Error) {
    eprintln!("{}: {}", "Error".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }
}
