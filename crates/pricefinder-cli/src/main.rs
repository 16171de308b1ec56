mod models;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricefinder-cli")]
#[command(about = "PriceFinder command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every configured retailer and print the ranked result as JSON.
    Search {
        /// Product to search for.
        product: String,
        #[arg(long, env = "SCRAPER_API_KEY", hide_env_values = true)]
        scraper_key: String,
        /// Omit to rank by price alone.
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        gemini_key: Option<String>,
        /// Skip the model and rank by price alone.
        #[arg(long)]
        heuristic: bool,
        /// Overrides `PRICEFINDER_MAX_RESULTS_PER_SITE`.
        #[arg(long)]
        max_per_site: Option<usize>,
    },
    /// List the models available to a key that support content generation.
    Models {
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        gemini_key: String,
    },
    /// Check each configured candidate model and report which are usable.
    Check {
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        gemini_key: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before parsing so `.env` keys feed the `env = ...` arguments.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = pricefinder_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            product,
            scraper_key,
            gemini_key,
            heuristic,
            max_per_site,
        } => {
            search::run_search(
                &config,
                &product,
                &scraper_key,
                gemini_key.as_deref(),
                heuristic,
                max_per_site,
            )
            .await?;
        }
        Commands::Models { gemini_key } => models::run_models(&config, &gemini_key).await?,
        Commands::Check { gemini_key } => models::run_check(&config, &gemini_key).await?,
    }

    Ok(())
}
