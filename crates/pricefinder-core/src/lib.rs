pub mod amount;
pub mod app_config;
pub mod config;
pub mod listing;
pub mod recommendation;
pub mod store;

use thiserror::Error;

pub use amount::{parse_amount, parse_leading_number};
pub use app_config::{AppConfig, Environment, RankerMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{AnalysisResult, RankedListing, RawListing, Statistics, DEFAULT_RATING};
pub use recommendation::{Category, Condition, RecommendationTag};
pub use store::Store;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown store: {0}")]
    UnknownStore(String),

    #[error("unknown recommendation tag: {0}")]
    UnknownRecommendation(String),
}
