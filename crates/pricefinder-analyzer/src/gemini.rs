//! HTTP client for the Gemini `v1beta` REST API.
//!
//! The API key travels in the `x-goog-api-key` header so it never appears in
//! a URL or in a logged error.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use crate::error::AnalyzerError;
use crate::retry::retry_with_backoff;
use crate::types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ListModelsResponse, ModelInfo,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Guard against a listing endpoint that keeps handing out page tokens.
const MAX_MODEL_PAGES: usize = 10;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeminiClient {
    /// Creates a client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AnalyzerError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`AnalyzerError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pricefinder/0.1 (price-comparison)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AnalyzerError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 2,
            backoff_base_ms: 1_000,
        })
    }

    /// Sets the retry policy for generation calls.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches metadata for one model. Used to check that a model id is
    /// reachable with this key.
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::ModelNotFound`] on 404.
    /// - [`AnalyzerError::InvalidCredential`] when the key is rejected.
    /// - [`AnalyzerError::Http`] on network failure.
    pub async fn get_model(&self, model: &str) -> Result<ModelInfo, AnalyzerError> {
        let url = self.endpoint(&format!("v1beta/models/{model}"))?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let response = check_status(response, model).await?;
        parse_body(response, &format!("get model {model}")).await
    }

    /// Lists every model visible to this key, following page tokens.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::get_model`].
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, AnalyzerError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut url = self.endpoint("v1beta/models")?;
            url.query_pairs_mut().append_pair("pageSize", "100");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self
                .client
                .get(url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;
            let response = check_status(response, "models").await?;
            let page: ListModelsResponse = parse_body(response, "list models").await?;

            models.extend(page.models);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }

    /// Sends `prompt` as a single user turn and returns the reply text.
    ///
    /// Transient failures are retried per [`GeminiClient::with_retries`].
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::EmptyResponse`] when no candidate carries text.
    /// - [`AnalyzerError::RateLimited`] / [`AnalyzerError::UnexpectedStatus`]
    ///   once retries are exhausted.
    /// - [`AnalyzerError::InvalidCredential`] when the key is rejected.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, AnalyzerError> {
        let url = self.endpoint(&format!("v1beta/models/{model}:generateContent"))?;
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: config,
        };

        let reply: GenerateContentResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                let url = url.clone();
                let request = &request;
                async move {
                    let response = self
                        .client
                        .post(url)
                        .header(API_KEY_HEADER, &self.api_key)
                        .json(request)
                        .send()
                        .await?;
                    let response = check_status(response, model).await?;
                    parse_body(response, &format!("generateContent({model})")).await
                }
            })
            .await?;

        reply.text().ok_or_else(|| {
            let finish_reason = reply
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            tracing::warn!(model, finish_reason, "generation returned no text");
            AnalyzerError::EmptyResponse
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AnalyzerError> {
        self.base_url
            .join(path)
            .map_err(|e| AnalyzerError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }
}

/// Maps non-2xx responses onto typed errors.
///
/// A 400 counts as a credential rejection only when the error body says the
/// key is at fault; any other 400 is a bad request.
async fn check_status(response: Response, model: &str) -> Result<Response, AnalyzerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());

    let body = response.text().await.unwrap_or_default();
    let (message, rejects_key) = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
        Ok(envelope) => {
            let rejects_key = envelope.error.rejects_key();
            (envelope.error.message, rejects_key)
        }
        Err(_) => (body, false),
    };

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnalyzerError::InvalidCredential {
            status: status.as_u16(),
            message,
        },
        StatusCode::BAD_REQUEST if rejects_key => AnalyzerError::InvalidCredential {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => AnalyzerError::ModelNotFound {
            model: model.to_owned(),
        },
        StatusCode::TOO_MANY_REQUESTS => AnalyzerError::RateLimited { retry_after_secs },
        _ => AnalyzerError::UnexpectedStatus {
            status: status.as_u16(),
            context: model.to_owned(),
            message,
        },
    })
}

async fn parse_body<T: serde::de::DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, AnalyzerError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| AnalyzerError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
