pub mod error;
pub mod gemini;
pub mod heuristic;
pub mod parse;
pub mod prompt;
pub mod ranker;
pub(crate) mod retry;
pub mod stats;
pub mod types;

pub use error::AnalyzerError;
pub use gemini::GeminiClient;
pub use heuristic::rank_by_price;
pub use parse::{parse_reply, ParsedReply};
pub use ranker::{first_available_model, GeminiRanker, Ranker, RankerSettings};
pub use stats::compute_statistics;
pub use types::{GenerationConfig, ModelInfo};
