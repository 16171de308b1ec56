//! Runs one search across every configured retailer.

use std::time::Duration;

use pricefinder_core::{AppConfig, RawListing, Store};

use crate::client::ProxyClient;
use crate::error::ScraperError;
use crate::extract::extract_listings;
use crate::sites::SiteProfile;

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Sites to search, in output order.
    pub sites: Vec<Store>,
    pub max_per_site: usize,
    /// Pause between consecutive site fetches.
    pub site_delay: Duration,
    /// Bodies shorter than this are treated as a failed fetch.
    pub min_body_bytes: usize,
}

impl From<&AppConfig> for CollectorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            sites: config.target_sites.clone(),
            max_per_site: config.max_results_per_site,
            site_delay: Duration::from_millis(config.site_delay_ms),
            min_body_bytes: config.min_body_bytes,
        }
    }
}

pub struct Collector {
    proxy: ProxyClient,
    config: CollectorConfig,
}

impl Collector {
    #[must_use]
    pub fn new(proxy: ProxyClient, config: CollectorConfig) -> Self {
        Self { proxy, config }
    }

    /// Searches every configured site for `query` and concatenates the results
    /// in site order.
    ///
    /// A site that fails in any way contributes nothing; the failure is logged
    /// and the remaining sites still run. An empty query makes no calls.
    pub async fn collect(&self, query: &str) -> Vec<RawListing> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let mut all = Vec::new();
        for (index, store) in self.config.sites.iter().copied().enumerate() {
            if index > 0 && !self.config.site_delay.is_zero() {
                tokio::time::sleep(self.config.site_delay).await;
            }

            let profile = SiteProfile::for_store(store);
            match self.collect_site(profile, query).await {
                Ok(listings) => {
                    tracing::info!(site = %store, count = listings.len(), "site search complete");
                    all.extend(listings);
                }
                Err(e) => {
                    tracing::warn!(site = %store, error = %e, "site search failed, skipping");
                }
            }
        }

        tracing::info!(query, total = all.len(), "collection complete");
        all
    }

    async fn collect_site(
        &self,
        profile: &SiteProfile,
        query: &str,
    ) -> Result<Vec<RawListing>, ScraperError> {
        let target = profile.search_url(query);
        let body = self
            .proxy
            .fetch_with_render_fallback(&target, profile.render_js)
            .await?;

        if body.trim().len() < self.config.min_body_bytes {
            return Err(ScraperError::UndersizedBody {
                url: target,
                len: body.len(),
                min: self.config.min_body_bytes,
            });
        }

        Ok(extract_listings(profile, &body, self.config.max_per_site))
    }
}
