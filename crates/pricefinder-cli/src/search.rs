use anyhow::Context;
use pricefinder_analyzer::{Ranker, RankerSettings};
use pricefinder_core::{AppConfig, RankerMode};
use pricefinder_scraper::{Collector, CollectorConfig, ProxyClient};

/// Runs collection and ranking locally, printing the result as pretty JSON.
pub(crate) async fn run_search(
    config: &AppConfig,
    product: &str,
    scraper_key: &str,
    gemini_key: Option<&str>,
    heuristic: bool,
    max_per_site: Option<usize>,
) -> anyhow::Result<()> {
    let mut collector_config = CollectorConfig::from(config);
    if let Some(max) = max_per_site {
        collector_config.max_per_site = max;
    }

    let proxy = ProxyClient::with_base_url(
        scraper_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.scraper_base_url,
    )
    .context("failed to build scraping client")?;
    let listings = Collector::new(proxy, collector_config).collect(product).await;
    if listings.is_empty() {
        anyhow::bail!("no listings found for \"{product}\"");
    }

    let mut settings = RankerSettings::from(config);
    let gemini_key = gemini_key.filter(|_| !heuristic);
    if gemini_key.is_none() {
        if !heuristic {
            tracing::warn!("no Gemini key supplied, ranking by price alone");
        }
        settings.mode = RankerMode::Heuristic;
    }

    let ranker = Ranker::connect(&settings, gemini_key.unwrap_or_default())
        .await
        .context("failed to initialize ranker")?;
    let result = ranker
        .rank(&listings, product)
        .await
        .context("ranking failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
