//! CLI entrypoint for zia
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod cli;
mod commands;
mod image;
mod logging;
mod progress;
mod runtime;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting zia");

    match &cli.command {
        Command::Run(args) => commands::run(&cli, args).await,
        Command::Chat(args) => commands::chat(&cli, args).await,
        Command::Servers => commands::servers(&cli).await,
        Command::Config => commands::show_config(&cli),
    }
}
