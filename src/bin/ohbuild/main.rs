//! ohbuild CLI - CI build orchestrator

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use ohbuild::ops::pipeline::{PipelineError, SETUP_FAILURE_EXIT_CODE};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "OHBUILD_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        let code = e
            .downcast_ref::<PipelineError>()
            .map_or(SETUP_FAILURE_EXIT_CODE, PipelineError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("ohbuild=debug")
        } else {
            EnvFilter::new("ohbuild=info")
        }
    });

    // stdout is reserved for --plan and --list-platforms output.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if cli.list_platforms {
        return commands::platforms::execute();
    }

    commands::build::execute(&cli)
}
