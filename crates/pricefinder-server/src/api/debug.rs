use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

/// Effective configuration. Carries no credentials; keys are per request.
#[derive(Debug, Serialize)]
pub(super) struct DebugInfo {
    version: &'static str,
    environment: String,
    ranker_mode: String,
    gemini_models: Vec<String>,
    target_sites: Vec<&'static str>,
    max_results_per_site: usize,
    request_timeout_secs: u64,
    gemini_timeout_secs: u64,
    site_delay_ms: u64,
    rate_limit_per_minute: usize,
}

pub(super) async fn debug_info(State(state): State<AppState>) -> Json<DebugInfo> {
    let config = &state.config;
    Json(DebugInfo {
        version: env!("CARGO_PKG_VERSION"),
        environment: config.env.to_string(),
        ranker_mode: config.ranker_mode.to_string(),
        gemini_models: config.gemini_models.clone(),
        target_sites: config.target_sites.iter().map(|s| s.domain()).collect(),
        max_results_per_site: config.max_results_per_site,
        request_timeout_secs: config.request_timeout_secs,
        gemini_timeout_secs: config.gemini_timeout_secs,
        site_delay_ms: config.site_delay_ms,
        rate_limit_per_minute: config.rate_limit_per_minute,
    })
}
