//
//  apigee-cli
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use apigee_cli::cli::{Cli, Commands};
use apigee_cli::{exit_codes, APP_NAME, VERSION};

#[tokio::main]
async fn main() {
    init_logging();

    // Help and --version come back as errors too, without use_stderr()
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::USAGE
            } else {
                exit_codes::SUCCESS
            };
            // Stderr may already be closed; the exit code still reports the outcome
            e.print().ok();
            process::exit(code);
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(exit_codes::for_error(&e));
    }
}

/// Installs the stderr subscriber, filtered by `APIGEE_LOG` (default `info`).
///
/// Logs stay off stdout so `--json` output can be piped.
fn init_logging() {
    let filter = EnvFilter::try_from_env("APIGEE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = &cli.global;
    match &cli.command {
        Commands::Proxy(cmd) => cmd.run(global).await,
        Commands::Kvm(cmd) => cmd.run(global).await,
        Commands::Auth(cmd) => cmd.run(global).await,
        Commands::Config(cmd) => cmd.run(global).await,
        Commands::Version => {
            println!("{} version {}", APP_NAME, VERSION);
            Ok(())
        }
    }
}
