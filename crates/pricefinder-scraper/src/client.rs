//! HTTP client for the scraping proxy.
//!
//! The proxy fetches a target URL on our behalf:
//! `GET {base}?api_key=..&url=..&render=true|false`. `render=true` asks it to
//! run the page's scripts before returning the document.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;

const DEFAULT_BASE_URL: &str = "http://api.scraperapi.com";

/// Client for the scraping proxy.
///
/// Use [`ProxyClient::new`] for production or [`ProxyClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ProxyClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl ProxyClient {
    /// Creates a client pointed at the production proxy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom proxy base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Fetches `target` through the proxy and returns the document body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx proxy response.
    /// - [`ScraperError::Http`] on network failure or timeout.
    pub async fn fetch(&self, target: &str, render: bool) -> Result<String, ScraperError> {
        let url = self.proxy_url(target, render);

        // The proxy URL carries the API key; keep it out of error messages.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: target.to_owned(),
            });
        }

        Ok(response.text().await.map_err(reqwest::Error::without_url)?)
    }

    /// Like [`ProxyClient::fetch`], but after a non-2xx status makes one more
    /// attempt with `render` flipped.
    ///
    /// # Errors
    ///
    /// Returns the error of the second attempt, or the first error when it
    /// was not a status failure.
    pub async fn fetch_with_render_fallback(
        &self,
        target: &str,
        render: bool,
    ) -> Result<String, ScraperError> {
        match self.fetch(target, render).await {
            Err(ScraperError::UnexpectedStatus { status, .. }) => {
                tracing::warn!(
                    url = %target,
                    status,
                    render = !render,
                    "proxy rejected fetch, retrying with render toggled"
                );
                self.fetch(target, !render).await
            }
            other => other,
        }
    }

    fn proxy_url(&self, target: &str, render: bool) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("url", target)
            .append_pair("render", if render { "true" } else { "false" });
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_url_encodes_target_and_flags() {
        let client = ProxyClient::with_base_url("k3y", 5, "test", "http://proxy.local").unwrap();
        let url = client.proxy_url("https://www.amazon.com/s?k=airpods+pro", true);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("api_key".to_owned(), "k3y".to_owned()),
                (
                    "url".to_owned(),
                    "https://www.amazon.com/s?k=airpods+pro".to_owned()
                ),
                ("render".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ProxyClient::with_base_url("k", 5, "test", "not a url");
        assert!(matches!(result, Err(ScraperError::InvalidUrl { .. })));
    }
}
