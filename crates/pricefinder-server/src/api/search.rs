use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use pricefinder_analyzer::{AnalyzerError, Ranker};
use pricefinder_core::AnalysisResult;
use pricefinder_scraper::{Collector, ProxyClient};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

const REQUIRED_FIELDS: &str =
    "All fields are required: gemini_api_key, scraper_api_key and product_name";

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    #[serde(default)]
    gemini_api_key: Option<String>,
    #[serde(default)]
    scraper_api_key: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    success: bool,
    data: AnalysisResult,
}

/// Trimmed value of a request field, `None` when absent or blank.
pub(super) fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(request_id = %req_id.0, error = %rejection, "rejected search body");
        ApiError::new("bad_request", REQUIRED_FIELDS)
    })?;

    let (Some(gemini_key), Some(scraper_key), Some(product)) = (
        non_blank(body.gemini_api_key.as_ref()),
        non_blank(body.scraper_api_key.as_ref()),
        non_blank(body.product_name.as_ref()),
    ) else {
        return Err(ApiError::new("bad_request", REQUIRED_FIELDS));
    };

    tracing::info!(request_id = %req_id.0, product, "search started");

    let config = &state.config;
    let proxy = ProxyClient::with_base_url(
        scraper_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.scraper_base_url,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to build scraping client");
        ApiError::new("internal_error", "failed to initialize the scraping client")
    })?;

    let listings = Collector::new(proxy, state.collector.clone())
        .collect(product)
        .await;
    if listings.is_empty() {
        tracing::info!(request_id = %req_id.0, product, "no listings found");
        return Err(ApiError::new(
            "not_found",
            "No listings found. Check the scraper API key or try another search term.",
        ));
    }

    let ranker = Ranker::connect(&state.ranker, gemini_key)
        .await
        .map_err(|e| map_ranker_error(&req_id, &e))?;
    let data = ranker
        .rank(&listings, product)
        .await
        .map_err(|e| map_ranker_error(&req_id, &e))?;

    tracing::info!(
        request_id = %req_id.0,
        products = data.products.len(),
        ranked_by = %data.ranked_by,
        "search complete"
    );
    Ok(Json(SearchResponse {
        success: true,
        data,
    }))
}

fn map_ranker_error(req_id: &RequestId, error: &AnalyzerError) -> ApiError {
    tracing::error!(request_id = %req_id.0, error = %error, "ranking failed");
    match error {
        AnalyzerError::InvalidCredential { .. } => {
            ApiError::new("invalid_credential", format!("Invalid Gemini API key: {error}"))
        }
        _ => ApiError::new("analysis_failed", format!("Analysis failed: {error}")),
    }
}
