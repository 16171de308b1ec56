use thiserror::Error;

/// Errors returned while connecting to or ranking with the model.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The generation service rejected the API key (HTTP 401/403, or a 400
    /// whose error details name the key).
    #[error("Gemini API key rejected (HTTP {status}): {message}")]
    InvalidCredential { status: u16, message: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model {model} not found")]
    ModelNotFound { model: String },

    /// `retry_after_secs` carries the `Retry-After` header when the service sent one.
    #[error("rate limited by the generation service")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from {context}: {message}")]
    UnexpectedStatus {
        status: u16,
        context: String,
        message: String,
    },

    /// The reply carried no candidate text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The reply text did not contain parseable JSON.
    #[error("model response is not valid JSON: {0}")]
    MalformedResponse(String),

    /// The reply parsed but held no usable product record.
    #[error("model response contains no valid products")]
    NoProducts,

    #[error("no listings to rank")]
    NoListings,

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
