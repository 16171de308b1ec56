mod debug;
mod keys;
mod search;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use pricefinder_analyzer::RankerSettings;
use pricefinder_core::AppConfig;
use pricefinder_scraper::CollectorConfig;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub collector: CollectorConfig,
    pub ranker: RankerSettings,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            collector: CollectorConfig::from(config.as_ref()),
            ranker: RankerSettings::from(config.as_ref()),
            config,
        }
    }
}

/// Failure envelope: `{ "success": false, "code": ..., "error": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub code: String,
    pub error: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            error: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "bad_request" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    environment: String,
    timestamp: DateTime<Utc>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/search", post(search::search))
        .route("/api/test", post(keys::test_keys))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/debug", get(debug::debug_info));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "healthy",
        message: "PriceFinder API is running",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.env.to_string(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
