//! Key check endpoint: validates client-supplied keys without running a search.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use pricefinder_analyzer::first_available_model;
use serde::{Deserialize, Serialize};

use super::search::non_blank;
use super::{ApiError, AppState};

/// Proxy keys are opaque; anything this short is certainly not one.
const MIN_SCRAPER_KEY_LEN: usize = 10;

#[derive(Debug, Deserialize)]
pub(super) struct TestKeysRequest {
    #[serde(default)]
    gemini_api_key: Option<String>,
    #[serde(default)]
    scraper_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct KeyResults {
    gemini: String,
    scraper: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    gemini_model: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TestKeysResponse {
    success: bool,
    results: KeyResults,
}

pub(super) async fn test_keys(
    State(state): State<AppState>,
    payload: Result<Json<TestKeysRequest>, JsonRejection>,
) -> Result<Json<TestKeysResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::new("bad_request", e.body_text()))?;

    let (gemini, gemini_model) = match non_blank(body.gemini_api_key.as_ref()) {
        Some(key) => check_gemini_key(&state, key).await,
        None => ("not_tested".to_owned(), None),
    };

    let scraper = match non_blank(body.scraper_api_key.as_ref()) {
        Some(key) if key.chars().count() > MIN_SCRAPER_KEY_LEN => "provided",
        Some(_) => "invalid_length",
        None => "not_tested",
    };

    Ok(Json(TestKeysResponse {
        success: true,
        results: KeyResults {
            gemini,
            scraper: scraper.to_owned(),
            gemini_model,
        },
    }))
}

async fn check_gemini_key(state: &AppState, key: &str) -> (String, Option<String>) {
    let found = match state.ranker.client(key) {
        Ok(client) => first_available_model(&client, &state.ranker.models).await,
        Err(e) => Err(e),
    };

    match found {
        Ok(Some(model)) => ("valid".to_owned(), Some(model)),
        Ok(None) => ("fallback".to_owned(), None),
        Err(e) => {
            tracing::warn!(error = %e, "gemini key check failed");
            (format!("error: {e}"), None)
        }
    }
}
