mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use keepsake::config::KeepsakeConfig;
use keepsake::server;

#[derive(Parser)]
#[command(name = "keepsake", version, about = "Memory stories from your photo library")]
struct Cli {
    /// Config file (default: ~/.keepsake/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Generate one memory story and print it
    Generate {
        /// Seed the random source for a reproducible story
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List generated stories
    Stories,
    /// Check storage, assets and service settings
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => KeepsakeConfig::load_from(path)?,
        None => KeepsakeConfig::load()?,
    };

    // Log to stderr so `generate` output stays clean JSON on stdout.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve_http(config).await?,
        Command::Generate { seed } => cli::generate(&config, seed).await?,
        Command::Stories => cli::stories(&config)?,
        Command::Doctor => cli::doctor(&config)?,
    }

    Ok(())
}
