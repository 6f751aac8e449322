use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rehearse")]
#[command(about = "Rehearse CLI - inspect and maintain stored interview sessions", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored session (upgraded in memory) and its stats as JSON
    Inspect {
        /// Identity whose session to inspect; the unscoped session otherwise
        #[arg(long)]
        identity: Option<String>,
    },
    /// Rewrite the stored session in the current schema
    Upgrade {
        #[arg(long)]
        identity: Option<String>,
    },
    /// Delete every session stored for an identity and forget it
    Purge {
        #[arg(long)]
        identity: String,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::CommandContext::load(cli.config)?;

    match cli.command {
        Commands::Inspect { identity } => commands::inspect::run(&ctx, identity).await?,
        Commands::Upgrade { identity } => commands::upgrade::run(&ctx, identity).await?,
        Commands::Purge { identity } => commands::purge::run(&ctx, identity).await,
        Commands::Config => commands::config::run(&ctx)?,
    }

    Ok(())
}
