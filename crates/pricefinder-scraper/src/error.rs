use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from proxy for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response for {url} too small: {len} bytes (minimum {min})")]
    UndersizedBody { url: String, len: usize, min: usize },

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
