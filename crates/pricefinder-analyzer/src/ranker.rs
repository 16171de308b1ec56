//! Chooses between the model-backed and the price-only ranker.

use pricefinder_core::{AnalysisResult, AppConfig, RankerMode, RawListing};

use crate::error::AnalyzerError;
use crate::gemini::GeminiClient;
use crate::heuristic::rank_by_price;
use crate::parse::parse_reply;
use crate::prompt::build_prompt;
use crate::stats::compute_statistics;
use crate::types::GenerationConfig;

/// Everything needed to build a [`Ranker`] except the per-request API key.
#[derive(Debug, Clone)]
pub struct RankerSettings {
    pub mode: RankerMode,
    pub base_url: String,
    /// Candidate model ids, most preferred first.
    pub models: Vec<String>,
    pub timeout_secs: u64,
    pub generation: GenerationConfig,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl From<&AppConfig> for RankerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            mode: config.ranker_mode,
            base_url: config.gemini_base_url.clone(),
            models: config.gemini_models.clone(),
            timeout_secs: config.gemini_timeout_secs,
            generation: GenerationConfig {
                max_output_tokens: config.gemini_max_output_tokens,
                ..GenerationConfig::default()
            },
            max_retries: config.gemini_max_retries,
            backoff_base_ms: 1_000,
        }
    }
}

impl RankerSettings {
    /// Builds a Gemini client for `api_key` using these settings.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::with_base_url`].
    pub fn client(&self, api_key: &str) -> Result<GeminiClient, AnalyzerError> {
        Ok(
            GeminiClient::with_base_url(api_key, self.timeout_secs, &self.base_url)?
                .with_retries(self.max_retries, self.backoff_base_ms),
        )
    }
}

/// Returns the first candidate model the key can reach, or `None` when no
/// candidate answers successfully. Missing models and transient failures move
/// on to the next candidate.
///
/// # Errors
///
/// [`AnalyzerError::InvalidCredential`] if the key is rejected. No further
/// candidates are tried.
pub async fn first_available_model(
    client: &GeminiClient,
    models: &[String],
) -> Result<Option<String>, AnalyzerError> {
    for model in models {
        match client.get_model(model).await {
            Ok(info) => {
                tracing::info!(model = %info.id(), "model available");
                return Ok(Some(info.id().to_owned()));
            }
            Err(AnalyzerError::ModelNotFound { .. }) => {
                tracing::debug!(model = %model, "model not available, trying next");
            }
            Err(e @ AnalyzerError::InvalidCredential { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "model check failed, trying next");
            }
        }
    }
    Ok(None)
}

/// Ranks listings with a Gemini model.
pub struct GeminiRanker {
    client: GeminiClient,
    model: String,
    generation: GenerationConfig,
}

impl GeminiRanker {
    #[must_use]
    pub fn new(client: GeminiClient, model: String, generation: GenerationConfig) -> Self {
        Self {
            client,
            model,
            generation,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// # Errors
    ///
    /// Any generation or reply-parsing error; see [`parse_reply`].
    pub async fn rank(
        &self,
        listings: &[RawListing],
        query: &str,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let prompt = build_prompt(query, listings)?;
        tracing::info!(model = %self.model, listings = listings.len(), "requesting ranking");

        let text = self
            .client
            .generate_content(&self.model, &prompt, &self.generation)
            .await?;
        let reply = parse_reply(&text)?;
        let statistics = compute_statistics(&reply.products);

        tracing::info!(
            model = %self.model,
            products = reply.products.len(),
            "ranking complete"
        );
        Ok(AnalysisResult {
            summary: reply.summary,
            insights: reply.insights,
            products: reply.products,
            statistics,
            ranked_by: format!("model:{}", self.model),
        })
    }
}

pub enum Ranker {
    Model(GeminiRanker),
    Heuristic,
}

impl Ranker {
    /// Builds the ranker for one request.
    ///
    /// In model mode the candidate models are tried in order; when none is
    /// reachable the price-only ranker is used instead.
    ///
    /// # Errors
    ///
    /// See [`first_available_model`].
    pub async fn connect(settings: &RankerSettings, api_key: &str) -> Result<Self, AnalyzerError> {
        if settings.mode == RankerMode::Heuristic {
            return Ok(Ranker::Heuristic);
        }

        let client = settings.client(api_key)?;
        match first_available_model(&client, &settings.models).await? {
            Some(model) => Ok(Ranker::Model(GeminiRanker::new(
                client,
                model,
                settings.generation,
            ))),
            None => {
                tracing::warn!(
                    candidates = ?settings.models,
                    "no candidate model reachable, using heuristic ranker"
                );
                Ok(Ranker::Heuristic)
            }
        }
    }

    /// `"model:<id>"` or `"heuristic"`.
    #[must_use]
    pub fn ranked_by(&self) -> String {
        match self {
            Ranker::Model(ranker) => format!("model:{}", ranker.model()),
            Ranker::Heuristic => crate::heuristic::RANKED_BY.to_owned(),
        }
    }

    /// # Errors
    ///
    /// [`AnalyzerError::NoListings`] for an empty batch, otherwise see
    /// [`GeminiRanker::rank`].
    pub async fn rank(
        &self,
        listings: &[RawListing],
        query: &str,
    ) -> Result<AnalysisResult, AnalyzerError> {
        if listings.is_empty() {
            return Err(AnalyzerError::NoListings);
        }
        match self {
            Ranker::Model(ranker) => ranker.rank(listings, query).await,
            Ranker::Heuristic => Ok(rank_by_price(listings, query)),
        }
    }
}
