//! rusty-safe-verify: hash and verify off-chain Safe{Wallet} messages

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hash(args) => commands::hash::run(args, cli.json),
        Commands::Verify(args) => commands::verify::run(args, cli.json).await,
        Commands::Chains => commands::chains::run(cli.json),
    }
}
