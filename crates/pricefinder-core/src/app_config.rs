use std::net::SocketAddr;

use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which ranking implementation the process serves requests with.
///
/// Chosen once at start-up. `Model` still degrades to the heuristic ranker
/// per request when none of the candidate models is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankerMode {
    Model,
    Heuristic,
}

impl std::fmt::Display for RankerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankerMode::Model => write!(f, "model"),
            RankerMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Process-wide settings, loaded once from the environment.
///
/// API keys for the scraping proxy and Gemini are supplied per request by
/// clients and never live here.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub target_sites: Vec<Store>,
    pub max_results_per_site: usize,
    pub request_timeout_secs: u64,
    pub site_delay_ms: u64,
    pub min_body_bytes: usize,
    pub scraper_base_url: String,
    pub user_agent: String,
    pub ranker_mode: RankerMode,
    pub gemini_base_url: String,
    pub gemini_models: Vec<String>,
    pub gemini_timeout_secs: u64,
    pub gemini_max_output_tokens: u32,
    pub gemini_max_retries: u32,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "target_sites",
                &self
                    .target_sites
                    .iter()
                    .map(|s| s.id())
                    .collect::<Vec<_>>(),
            )
            .field("max_results_per_site", &self.max_results_per_site)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("site_delay_ms", &self.site_delay_ms)
            .field("min_body_bytes", &self.min_body_bytes)
            .field("scraper_base_url", &self.scraper_base_url)
            .field("user_agent", &self.user_agent)
            .field("ranker_mode", &self.ranker_mode)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_models", &self.gemini_models)
            .field("gemini_timeout_secs", &self.gemini_timeout_secs)
            .field("gemini_max_output_tokens", &self.gemini_max_output_tokens)
            .field("gemini_max_retries", &self.gemini_max_retries)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
