mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealfinder-cli")]
#[command(about = "Search shopping listings by text or product photo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a text search and print the result envelope as JSON
    Search {
        /// Product query, e.g. "wireless headphones"
        query: String,
        /// Ask the relevance judge to drop unrelated listings
        #[arg(long)]
        exact: bool,
        /// Region code (US, UK, CA, AU, global, or a configured override)
        #[arg(long)]
        region: Option<String>,
    },
    /// Identify the product in 1-3 photos and search for it
    Scan {
        #[arg(required = true, num_args = 1..=commands::MAX_IMAGES)]
        files: Vec<PathBuf>,
        #[arg(long)]
        region: Option<String>,
    },
    /// List the effective region table
    Regions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = dealfinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            query,
            exact,
            region,
        } => commands::run_search(&config, &query, exact, region.as_deref()).await,
        Commands::Scan { files, region } => {
            commands::run_scan(&config, &files, region.as_deref()).await
        }
        Commands::Regions => commands::run_regions(&config),
    }
}
