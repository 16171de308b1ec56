use crate::app_config::{AppConfig, Environment, RankerMode};
use crate::store::Store;
use crate::ConfigError;

pub const DEFAULT_TARGET_SITES: &str = "amazon,walmart,bestbuy,ebay,target";
pub const DEFAULT_GEMINI_MODELS: &str = "gemini-2.0-flash,gemini-1.5-flash,gemini-pro";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// development config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PRICEFINDER_ENV", "development"))?;

    let bind_addr = or_default("PRICEFINDER_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PRICEFINDER_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PRICEFINDER_LOG_LEVEL", "info");

    let target_sites = parse_sites(&or_default("PRICEFINDER_TARGET_SITES", DEFAULT_TARGET_SITES))?;
    let max_results_per_site = parse_usize("PRICEFINDER_MAX_RESULTS_PER_SITE", "5")?;
    if max_results_per_site == 0 {
        return Err(invalid(
            "PRICEFINDER_MAX_RESULTS_PER_SITE",
            "must be at least 1".to_string(),
        ));
    }
    let request_timeout_secs = parse_u64("PRICEFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let site_delay_ms = parse_u64("PRICEFINDER_SITE_DELAY_MS", "1000")?;
    let min_body_bytes = parse_usize("PRICEFINDER_MIN_BODY_BYTES", "512")?;
    let scraper_base_url = or_default("PRICEFINDER_SCRAPER_BASE_URL", "http://api.scraperapi.com");
    let user_agent = or_default(
        "PRICEFINDER_USER_AGENT",
        "pricefinder/0.1 (price-comparison)",
    );

    let ranker_mode = parse_ranker_mode(&or_default("PRICEFINDER_RANKER", "model"))?;
    let gemini_base_url = or_default(
        "PRICEFINDER_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let gemini_models = parse_model_list(&or_default(
        "PRICEFINDER_GEMINI_MODELS",
        DEFAULT_GEMINI_MODELS,
    ))?;
    let gemini_timeout_secs = parse_u64("PRICEFINDER_GEMINI_TIMEOUT_SECS", "60")?;
    let gemini_max_output_tokens = parse_u32("PRICEFINDER_GEMINI_MAX_OUTPUT_TOKENS", "2048")?;
    let gemini_max_retries = parse_u32("PRICEFINDER_GEMINI_MAX_RETRIES", "2")?;
    let rate_limit_per_minute = parse_usize("PRICEFINDER_RATE_LIMIT_PER_MINUTE", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        target_sites,
        max_results_per_site,
        request_timeout_secs,
        site_delay_ms,
        min_body_bytes,
        scraper_base_url,
        user_agent,
        ranker_mode,
        gemini_base_url,
        gemini_models,
        gemini_timeout_secs,
        gemini_max_output_tokens,
        gemini_max_retries,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEFINDER_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

fn parse_ranker_mode(s: &str) -> Result<RankerMode, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "model" | "gemini" => Ok(RankerMode::Model),
        "heuristic" | "fallback" => Ok(RankerMode::Heuristic),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEFINDER_RANKER".to_string(),
            reason: format!("expected model or heuristic; got \"{other}\""),
        }),
    }
}

/// Parses a comma-separated site list, keeping order and dropping duplicates.
fn parse_sites(raw: &str) -> Result<Vec<Store>, ConfigError> {
    let mut sites = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let store = item
            .parse::<Store>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "PRICEFINDER_TARGET_SITES".to_string(),
                reason: e.to_string(),
            })?;
        if !sites.contains(&store) {
            sites.push(store);
        }
    }

    if sites.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEFINDER_TARGET_SITES".to_string(),
            reason: "at least one site is required".to_string(),
        });
    }
    Ok(sites)
}

fn parse_model_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_start_matches("models/").to_string())
        .collect();

    if models.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEFINDER_GEMINI_MODELS".to_string(),
            reason: "at least one model id is required".to_string(),
        });
    }
    Ok(models)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
