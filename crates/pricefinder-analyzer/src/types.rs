//! Wire types for the Gemini `v1beta` REST API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_owned()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

/// A content part. Only text parts are produced or consumed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    pub contents: Vec<Content>,
    pub generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` when there is no
    /// non-blank text.
    pub(crate) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Model metadata from `GET /v1beta/models[/{id}]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
    #[serde(default)]
    pub input_token_limit: Option<u32>,
    #[serde(default)]
    pub output_token_limit: Option<u32>,
}

impl ModelInfo {
    /// Model id without the `models/` prefix.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    #[must_use]
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    /// Canonical code such as `INVALID_ARGUMENT` or `PERMISSION_DENIED`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    /// Whether the error blames the API key rather than the request.
    pub fn rejects_key(&self) -> bool {
        matches!(self.status.as_str(), "UNAUTHENTICATED" | "PERMISSION_DENIED")
            || self
                .details
                .iter()
                .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
    }
}
