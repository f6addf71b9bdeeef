//! delivery-example - binary entry point.
//!
//! Resolves configuration (preset, defaults file, flags), issues one delivery
//! call through the HTTP client, and prints the response to stdout. Logs go to
//! stderr so stdout only ever carries the response dump.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use delivery_client::ClientOptions;
use delivery_example::{Cli, RunError, exit_code, run};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn try_main(cli: &Cli) -> Result<()> {
    let config = cli
        .resolve_config()
        .map_err(RunError::from)
        .context("failed to load defaults")?;
    tracing::debug!(?config, "Resolved configuration");

    let stdout = io::stdout();
    run(&config, ClientOptions::build, &mut stdout.lock())?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match try_main(&cli) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(err) => {
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<RunError>())
                .map_or(exit_code::GENERAL_ERROR, RunError::exit_code);
            eprintln!("error: {err:#}");
            ExitCode::from(code)
        }
    }
}
