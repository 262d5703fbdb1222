mod harvest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::harvest::{load_known_brands_or_empty, run_job, Job};

#[derive(Debug, Parser)]
#[command(name = "tabak-cli")]
#[command(about = "Harvest tobacco brands and flavors from the review catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest brands and their tobaccos, writing a JSON report
    Harvest {
        /// Restrict the run to one brand slug
        #[arg(long)]
        brand: Option<String>,
        /// Maximum tobaccos per brand
        #[arg(long)]
        limit: Option<usize>,
        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Fetch pages over plain HTTP instead of a headless browser
        #[arg(long = "static")]
        static_pages: bool,
    },
    /// List catalog brands only
    Brands {
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long = "static")]
        static_pages: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = tabak_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let known = load_known_brands_or_empty(&config.known_brands_path)?;

    match cli.command {
        Commands::Harvest {
            brand,
            limit,
            output,
            static_pages,
        } => {
            let job = Job::Harvest {
                brand: brand.as_deref(),
                limit,
            };
            run_job(&config, known, &job, static_pages, output.as_deref()).await
        }
        Commands::Brands {
            output,
            static_pages,
        } => run_job(&config, known, &Job::Brands, static_pages, output.as_deref()).await,
    }
}

#[cfg(test)]
mod tests;
