use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PRICEFINDER_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.target_sites,
        vec![
            Store::Amazon,
            Store::Walmart,
            Store::BestBuy,
            Store::Ebay,
            Store::Target
        ]
    );
    assert_eq!(cfg.max_results_per_site, 5);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.site_delay_ms, 1000);
    assert_eq!(cfg.min_body_bytes, 512);
    assert_eq!(cfg.scraper_base_url, "http://api.scraperapi.com");
    assert_eq!(cfg.ranker_mode, RankerMode::Model);
    assert_eq!(
        cfg.gemini_models,
        vec!["gemini-2.0-flash", "gemini-1.5-flash", "gemini-pro"]
    );
    assert_eq!(cfg.gemini_timeout_secs, 60);
    assert_eq!(cfg.gemini_max_output_tokens, 2048);
    assert_eq!(cfg.gemini_max_retries, 2);
    assert_eq!(cfg.rate_limit_per_minute, 30);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEFINDER_BIND_ADDR"),
        "expected InvalidEnvVar(PRICEFINDER_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn target_sites_override_keeps_order_and_dedupes() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_TARGET_SITES", "bestbuy.com, amazon ,bestbuy");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.target_sites, vec![Store::BestBuy, Store::Amazon]);
}

#[test]
fn target_sites_rejects_unknown_site() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_TARGET_SITES", "amazon,aliexpress");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEFINDER_TARGET_SITES"),
        "expected InvalidEnvVar(PRICEFINDER_TARGET_SITES), got: {result:?}"
    );
}

#[test]
fn target_sites_rejects_empty_list() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_TARGET_SITES", " , ");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn max_results_per_site_override() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_MAX_RESULTS_PER_SITE", "8");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_results_per_site, 8);
}

#[test]
fn max_results_per_site_zero_is_invalid() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_MAX_RESULTS_PER_SITE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEFINDER_MAX_RESULTS_PER_SITE"),
        "expected InvalidEnvVar(PRICEFINDER_MAX_RESULTS_PER_SITE), got: {result:?}"
    );
}

#[test]
fn request_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEFINDER_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(PRICEFINDER_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn site_delay_ms_override() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_SITE_DELAY_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.site_delay_ms, 0);
}

#[test]
fn ranker_mode_heuristic() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_RANKER", "Heuristic");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.ranker_mode, RankerMode::Heuristic);
}

#[test]
fn ranker_mode_unknown_fails() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_RANKER", "oracle");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEFINDER_RANKER"),
        "expected InvalidEnvVar(PRICEFINDER_RANKER), got: {result:?}"
    );
}

#[test]
fn gemini_models_strip_prefix_and_blanks() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_GEMINI_MODELS", "models/gemini-1.5-flash, ,gemini-pro");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.gemini_models, vec!["gemini-1.5-flash", "gemini-pro"]);
}

#[test]
fn gemini_max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("PRICEFINDER_GEMINI_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEFINDER_GEMINI_MAX_RETRIES"),
        "expected InvalidEnvVar(PRICEFINDER_GEMINI_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn debug_output_lists_site_ids() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(rendered.contains("\"amazon\""), "debug output: {rendered}");
}
