use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod commands;
mod connector;
mod context;
mod output;

use commands::Command;
use context::Context;

#[derive(Parser)]
#[command(name = "retrieval-cli")]
#[command(about = "Document indexing/retrieval CLI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (toml/yaml/json); falls back to conventional
    /// locations, then defaults
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index documents from a directory
    Index(commands::index::IndexCommand),

    /// Search indexed documents
    Search(commands::search::SearchCommand),

    /// Show engine health
    Status(commands::status::StatusCommand),

    /// Inspect configuration
    Config(commands::config::ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    retrieval_observability::init_tracing(log_level)
        .map_err(|e| anyhow::anyhow!("initializing logging: {e}"))?;

    let context = Context::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Index(cmd) => cmd.execute(&context).await,
        Commands::Search(cmd) => cmd.execute(&context).await,
        Commands::Status(cmd) => cmd.execute(&context).await,
        Commands::Config(cmd) => cmd.execute(&context).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if e.to_string().contains("network") || e.to_string().contains("Connection refused") {
            eprintln!(
                "{} is the engine reachable at the configured host/port?",
                "hint:".yellow()
            );
        }
        std::process::exit(1);
    }

    Ok(())
}
