//! Modgate CLI application
//!
//! Inspect and exercise a modgate permission configuration from the shell.
//!
//! - `modgate validate perms.json`: check a configuration parses
//! - `modgate check perms.json com.target.app --module-path /data/app/m-1/base.apk`
//! - `modgate resolve /data/app/m-1/base.apk`: show the identity a path maps to
//! - `modgate serve --file perms.json`: answer tab-separated queries from stdin
//!
//! Set RUST_LOG (or pass `--verbose`) for library logging on stderr.

mod args;
mod commands;
mod console;
mod router;

use args::Cli;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries command output, so logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    router::route(cli).await
}
