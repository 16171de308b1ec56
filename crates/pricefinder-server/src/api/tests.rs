use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use pricefinder_core::{Environment, RankerMode, RecommendationTag, Store};
use pricefinder_scraper::SiteProfile;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, ranker_mode: RankerMode, target_sites: Vec<Store>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("socket addr"),
        log_level: "debug".to_owned(),
        target_sites,
        max_results_per_site: 5,
        request_timeout_secs: 5,
        site_delay_ms: 0,
        min_body_bytes: 0,
        scraper_base_url: base_url.to_owned(),
        user_agent: "pricefinder-test/0.1".to_owned(),
        ranker_mode,
        gemini_base_url: base_url.to_owned(),
        gemini_models: vec!["gemini-1.5-flash".to_owned()],
        gemini_timeout_secs: 5,
        gemini_max_output_tokens: 1024,
        gemini_max_retries: 0,
        rate_limit_per_minute: 0,
    }
}

fn app_with(config: AppConfig, rate_limit: RateLimitState) -> Router {
    build_app(AppState::new(Arc::new(config)), rate_limit)
}

fn app(config: AppConfig) -> Router {
    app_with(config, RateLimitState::per_minute(0))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn search_body() -> Value {
    json!({
        "gemini_api_key": "gemini-test-key",
        "scraper_api_key": "scraper-test-key",
        "product_name": "airpods pro"
    })
}

async fn mount_page(server: &MockServer, store: Store, render: &str, body: &str) {
    let target = SiteProfile::for_store(store).search_url("airpods pro");
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("api_key", "scraper-test-key"))
        .and(query_param("url", target.as_str()))
        .and(query_param("render", render))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

const AMAZON_PAGE: &str = r#"<html><body>
    <div data-component-type="s-search-result">
      <h2><a href="/dp/B0CHWRXH8B?ref=sr_1_1"><span>Apple AirPods Pro 2</span></a></h2>
      <span class="a-price"><span class="a-offscreen">$189.99</span></span>
      <span class="a-icon-alt">4.7 out of 5 stars</span>
    </div>
  </body></html>"#;

const WALMART_PAGE: &str = r#"<html><body>
    <div data-item-id="123">
      <a href="/ip/AirPods-Pro/123"><span data-automation-id="product-title">AirPods Pro (2nd gen)</span></a>
      <div data-automation-id="product-price"><span>current price $169.00</span></div>
    </div>
  </body></html>"#;

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("bad_request", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("analysis_failed", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new(code, "message").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[tokio::test]
async fn health_reports_environment_and_echoes_request_id() {
    let app = app(test_config("http://127.0.0.1:9", RankerMode::Heuristic, vec![]));
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "test");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn search_rejects_missing_or_blank_fields() {
    let app = app(test_config("http://127.0.0.1:9", RankerMode::Heuristic, vec![Store::Amazon]));

    let (status, json) = send(
        app.clone(),
        post_json(
            "/api/search",
            &json!({"gemini_api_key": "g", "scraper_api_key": "s"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("product_name")));

    let (status, _) = send(
        app.clone(),
        post_json(
            "/api/search",
            &json!({"gemini_api_key": "g", "scraper_api_key": "s", "product_name": "   "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let (status, json) = send(app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "bad_request");
}

#[tokio::test]
async fn search_with_no_listings_is_not_found_and_skips_ranking() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let config = test_config(
        &server.uri(),
        RankerMode::Model,
        vec![Store::Amazon, Store::Ebay],
    );
    let (status, json) = send(app(config), post_json("/api/search", &search_body())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("No listings found")));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests
        .iter()
        .all(|r| !r.url.path().starts_with("/v1beta")));
}

#[tokio::test]
async fn search_ranks_collected_listings_with_heuristic() {
    let server = MockServer::start().await;
    mount_page(&server, Store::Amazon, "false", AMAZON_PAGE).await;
    mount_page(&server, Store::Walmart, "true", WALMART_PAGE).await;

    let config = test_config(
        &server.uri(),
        RankerMode::Heuristic,
        vec![Store::Amazon, Store::Walmart],
    );
    let (status, json) = send(app(config), post_json("/api/search", &search_body())).await;

    assert_eq!(status, StatusCode::OK, "body: {json}");
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert_eq!(data["ranked_by"], "heuristic");
    assert_eq!(data["products"].as_array().map(Vec::len), Some(2));
    assert_eq!(data["products"][0]["store"], "amazon.com");
    assert_eq!(data["products"][0]["recommendation_tag"], RecommendationTag::Consider.label());
    assert_eq!(data["products"][1]["store"], "walmart.com");
    assert_eq!(data["products"][1]["recommendation_tag"], RecommendationTag::BestOption.label());
    assert_eq!(data["statistics"]["total_count"], 2);
    assert_eq!(data["insights"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn search_reports_rejected_gemini_key() {
    let server = MockServer::start().await;
    mount_page(&server, Store::Amazon, "false", AMAZON_PAGE).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1beta/models/.+$"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), RankerMode::Model, vec![Store::Amazon]);
    let (status, json) = send(app(config), post_json("/api/search", &search_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.starts_with("Invalid Gemini API key")));
}

#[tokio::test]
async fn key_check_reports_each_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models/gemini-1.5-flash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/gemini-1.5-flash",
            "supportedGenerationMethods": ["generateContent"]
        })))
        .mount(&server)
        .await;
    let app = app(test_config(&server.uri(), RankerMode::Model, vec![]));

    let (status, json) = send(
        app.clone(),
        post_json(
            "/api/test",
            &json!({"gemini_api_key": "gemini-test-key", "scraper_api_key": "short"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["gemini"], "valid");
    assert_eq!(json["results"]["gemini_model"], "gemini-1.5-flash");
    assert_eq!(json["results"]["scraper"], "invalid_length");

    let (_, json) = send(
        app,
        post_json("/api/test", &json!({"scraper_api_key": "a-long-scraper-key"})),
    )
    .await;
    assert_eq!(json["results"]["gemini"], "not_tested");
    assert_eq!(json["results"]["scraper"], "provided");
    assert!(json["results"].get("gemini_model").is_none());
}

#[tokio::test]
async fn key_check_reports_fallback_when_no_model_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1beta/models/.+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let app = app(test_config(&server.uri(), RankerMode::Model, vec![]));

    let (_, json) = send(
        app,
        post_json("/api/test", &json!({"gemini_api_key": "gemini-test-key"})),
    )
    .await;
    assert_eq!(json["results"]["gemini"], "fallback");
    assert_eq!(json["results"]["scraper"], "not_tested");
}

#[tokio::test]
async fn limited_routes_return_429_once_window_is_full() {
    let app = app_with(
        test_config("http://127.0.0.1:9", RankerMode::Heuristic, vec![]),
        RateLimitState::per_minute(1),
    );

    let (status, _) = send(app.clone(), post_json("/api/test", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(app.clone(), post_json("/api/test", &json!({}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "rate_limited");

    let (status, _) = send(app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn debug_reports_configuration_without_secrets() {
    let app = app(test_config(
        "http://127.0.0.1:9",
        RankerMode::Heuristic,
        vec![Store::Amazon, Store::Target],
    ));
    let (status, json) = send(app, get("/api/debug")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ranker_mode"], "heuristic");
    assert_eq!(json["target_sites"], json!(["amazon.com", "target.com"]));
    assert_eq!(json["gemini_models"], json!(["gemini-1.5-flash"]));
    assert_eq!(json["max_results_per_site"], 5);
    assert!(!json.to_string().contains("api_key"));
}
